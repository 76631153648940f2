use anyhow::Result;
use tracing::{debug, warn};

use super::access::{Access, access};
use super::paging::pageable_count;
use super::scope::{self, Item};
use super::{Ctx, ViewKind, texts};
use crate::model::{
    Command, CommandKind, Entry, EntryKind, GLOBAL_SHARE_TARGET, InputWait, Mode, NewEntry,
    NewShare, PartialUser, Session, User, child_path,
};
use crate::store::Store;
use crate::transport::Format;

/// Where the turn ended up and what to show there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub subject: Entry,
    pub parent: Entry,
    pub view: ViewKind,
}

pub fn dispatch(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    user: &User,
    command: &Command,
) -> Result<Outcome> {
    debug!(
        user_id = user.id,
        command = %command.kind,
        idx = ?command.element_idx,
        mode = ?session.mode,
        "dispatch"
    );

    // Any new command either answers the pending prompt or abandons it.
    session.reset_input_wait();

    let subject = load_subject(ctx.store, session)?;
    let parent = parent_of(ctx.store, session, &subject)?;

    let mut turn = Turn {
        ctx,
        session,
        user,
        subject,
        parent,
    };
    let view = turn.run(command)?;

    Ok(Outcome {
        subject: turn.subject,
        parent: turn.parent,
        view,
    })
}

fn root_of(store: &mut dyn Store, session: &mut Session) -> Result<Entry> {
    if let Some(root) = store.get(&session.root_id)? {
        return Ok(root);
    }
    let root = match store.find_root(session.user_id)? {
        Some(root) => root,
        None => store.create_root(session.user_id)?,
    };
    session.root_id = root.id.clone();
    Ok(root)
}

fn load_subject(store: &mut dyn Store, session: &mut Session) -> Result<Entry> {
    if let Some(entry) = store.get(&session.subject_id)?
        && access(store, &entry, session.user_id)?.can_read()
    {
        return Ok(entry);
    }

    warn!(
        user_id = session.user_id,
        subject = %session.subject_id,
        "subject unavailable, falling back to root"
    );
    session.reset_state();
    session.view_offset = 0;
    let root = root_of(store, session)?;
    session.navigate(&root.id);
    Ok(root)
}

/// The entry "up" leads to. Above a share mount the user cannot see the
/// owner's tree, so the way up leads to their own root.
fn parent_of(store: &dyn Store, session: &Session, entry: &Entry) -> Result<Entry> {
    let Some(pid) = &entry.parent_id else {
        return Ok(entry.clone());
    };
    if let Some(parent) = store.get(pid)?
        && access(store, &parent, session.user_id)?.can_read()
    {
        return Ok(parent);
    }
    Ok(store.get(&session.root_id)?.unwrap_or_else(|| entry.clone()))
}

fn valid_name(name: &str, kind: EntryKind) -> bool {
    !name.is_empty() && (kind == EntryKind::Label || !name.contains('/'))
}

struct Turn<'t, 'a> {
    ctx: &'t mut Ctx<'a>,
    session: &'t mut Session,
    user: &'t User,
    subject: Entry,
    parent: Entry,
}

impl Turn<'_, '_> {
    fn run(&mut self, cmd: &Command) -> Result<ViewKind> {
        match cmd.kind {
            CommandKind::BackToSearch => self.back_to_search(),
            CommandKind::CancelShare | CommandKind::CancelSearch => {
                self.session.reset_state();
                Ok(self.subject_view())
            }
            CommandKind::ChangeRo => self.change_ro(cmd),
            CommandKind::DoSearch => self.do_search(cmd),
            CommandKind::DropFile | CommandKind::DropDir | CommandKind::DropLabel => {
                self.drop_subject()
            }
            CommandKind::DropGlobLink => self.drop_glob_link(),
            CommandKind::DropShare => self.drop_share(cmd),
            CommandKind::EditLabel => self.rename(cmd, InputWait::LabelEdit, ViewKind::ViewLabel),
            CommandKind::RenameDir => self.rename(cmd, InputWait::RenameDir, ViewKind::ViewDir),
            CommandKind::RenameFile => self.rename(cmd, InputWait::RenameFile, ViewKind::ViewFile),
            CommandKind::Rewind => self.turn_page(false),
            CommandKind::Forward => self.turn_page(true),
            CommandKind::Gear => {
                self.session.set_gearing();
                Ok(ViewKind::GearSubject)
            }
            CommandKind::OpenParent => {
                self.session.reset_state();
                self.session.view_offset = 0;
                let parent = self.parent.clone();
                self.navigate(parent)?;
                Ok(ViewKind::ViewDir)
            }
            CommandKind::JoinPublicShare => self.join_public_share(cmd),
            CommandKind::MakeGlobLink => self.make_glob_link(),
            CommandKind::MkDir => self.make(cmd, EntryKind::Dir),
            CommandKind::MkLabel => self.make(cmd, EntryKind::Label),
            CommandKind::MkGrant => self.mk_grant(),
            CommandKind::GrantAccess => self.grant_access(cmd),
            CommandKind::OpenDir | CommandKind::OpenFile => self.open_child(cmd),
            CommandKind::OpenLabel => self.open_label(cmd),
            CommandKind::OpenSearchedDir
            | CommandKind::OpenSearchedFile
            | CommandKind::OpenSearchedLabel => self.open_searched(cmd),
            CommandKind::ResetToRoot => self.reset_to_root(),
            CommandKind::Share => self.share(),
            CommandKind::UploadFile => self.upload(cmd),
            CommandKind::ContextHelp => self.context_help(),
        }
    }

    // ---- helpers -----------------------------------------------------------

    fn subject_view(&self) -> ViewKind {
        match self.subject.kind {
            EntryKind::Dir => ViewKind::ViewDir,
            EntryKind::File => ViewKind::ViewFile,
            EntryKind::Label => ViewKind::ViewLabel,
        }
    }

    fn navigate(&mut self, entry: Entry) -> Result<()> {
        self.parent = parent_of(&*self.ctx.store, self.session, &entry)?;
        self.session.navigate(&entry.id);
        self.subject = entry;
        Ok(())
    }

    fn go_root(&mut self) -> Result<()> {
        let root = root_of(self.ctx.store, self.session)?;
        self.navigate(root)
    }

    fn access(&self) -> Result<Access> {
        access(&*self.ctx.store, &self.subject, self.user.id)
    }

    fn owns(&self) -> Result<bool> {
        Ok(self.access()?.is_owner())
    }

    /// Rename/delete also need write access to the containing directory,
    /// so a grantee cannot remove or rename the mount point itself.
    fn may_modify(&self) -> Result<bool> {
        if self.subject.is_root() || !self.access()?.can_write() {
            return Ok(false);
        }
        if self.subject.owner == self.user.id {
            return Ok(true);
        }
        let Some(pid) = &self.subject.parent_id else {
            return Ok(false);
        };
        Ok(match self.ctx.store.get(pid)? {
            Some(dir) => access(&*self.ctx.store, &dir, self.user.id)?.can_write(),
            None => false,
        })
    }

    fn select(&self, cmd: &Command) -> Result<Option<Item>> {
        let Some(idx) = cmd.element_idx else {
            return Ok(None);
        };
        scope::by_index(&*self.ctx.store, &self.subject, self.session, idx)
    }

    fn prompt(&mut self, text: &str, wait: InputWait) -> Result<ViewKind> {
        self.ctx
            .transport
            .dialog(self.user.id, text, Format::Plain, true)?;
        self.session.input_wait = wait;
        Ok(ViewKind::None)
    }

    fn rejected(&self, reason: &str) {
        debug!(
            user_id = self.user.id,
            subject = %self.subject.id,
            reason,
            "command rejected"
        );
    }

    /// Resolution gap: nothing sensible to act on, so start over at the root.
    fn fallback(&mut self, reason: &str) -> Result<ViewKind> {
        warn!(user_id = self.user.id, reason, "falling back to root");
        self.session.reset_state();
        self.session.view_offset = 0;
        self.go_root()?;
        Ok(ViewKind::ViewDir)
    }

    fn sync_shared_flag(&mut self) -> Result<()> {
        let any = self.ctx.store.any_exist_for(&self.subject.id)?;
        if self.subject.shared != any {
            self.subject.shared = any;
            self.ctx.store.update_meta(&self.subject)?;
        }
        Ok(())
    }

    /// Picks a free sibling name: `a.txt`, `a (1).txt`, `a (2).txt`, ...
    fn unique_name(&self, name: &str, dir: &Entry) -> Result<String> {
        if self.ctx.store.name_available(name, &dir.id)? {
            return Ok(name.to_string());
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
            _ => (name, ""),
        };
        let mut n = 1;
        loop {
            let candidate = format!("{} ({}){}", stem, n, ext);
            if self.ctx.store.name_available(&candidate, &dir.id)? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    // ---- navigation --------------------------------------------------------

    fn open_child(&mut self, cmd: &Command) -> Result<ViewKind> {
        // Listing buttons address the browsing scope.
        self.session.reset_state();
        let Some(entry) = self.select(cmd)?.and_then(Item::into_entry) else {
            return self.fallback("selection out of range");
        };
        self.session.view_offset = 0;
        self.navigate(entry)?;
        Ok(self.subject_view())
    }

    fn open_label(&mut self, cmd: &Command) -> Result<ViewKind> {
        // Label buttons come from the gearing scope, so resolve before leaving it.
        let Some(entry) = self.select(cmd)?.and_then(Item::into_entry) else {
            return self.fallback("selection out of range");
        };
        self.session.reset_state();
        self.navigate(entry)?;
        Ok(self.subject_view())
    }

    fn open_searched(&mut self, cmd: &Command) -> Result<ViewKind> {
        let Some(entry) = self.select(cmd)?.and_then(Item::into_entry) else {
            return self.fallback("selection out of range");
        };
        self.session.view_offset = 0;
        self.navigate(entry)?;
        Ok(match self.subject.kind {
            EntryKind::Dir => ViewKind::ViewSearchedDir,
            EntryKind::File => ViewKind::ViewSearchedFile,
            EntryKind::Label => ViewKind::ViewSearchedLabel,
        })
    }

    fn reset_to_root(&mut self) -> Result<ViewKind> {
        self.session.reset_state();
        self.session.reset_input_wait();
        self.session.view_offset = 0;
        self.go_root()?;
        Ok(ViewKind::ViewDir)
    }

    fn paged_view(&self) -> ViewKind {
        if !self.session.is_searching() {
            return self.subject_view();
        }
        let at_search_root = self.session.search_dir_id.as_ref() == Some(&self.subject.id);
        if self.subject.is_dir() && !at_search_root {
            ViewKind::ViewSearchedDir
        } else {
            ViewKind::SearchResults
        }
    }

    fn turn_page(&mut self, forward: bool) -> Result<ViewKind> {
        let page = self.ctx.config.page_size;
        let view = self.paged_view();
        if !forward {
            self.session.rewind(page);
            return Ok(view);
        }
        let total = match view {
            ViewKind::SearchResults => scope::search_results(&*self.ctx.store, self.session)?.len(),
            _ => pageable_count(&scope::listing(&*self.ctx.store, &self.subject)?, false),
        };
        self.session.forward(page, total);
        Ok(view)
    }

    // ---- search ------------------------------------------------------------

    fn do_search(&mut self, cmd: &Command) -> Result<ViewKind> {
        self.session.reset_state();
        let Some(query) = cmd.text() else {
            return Ok(self.subject_view());
        };
        if !self.subject.is_dir() {
            self.go_root()?;
        }
        let dir_id = self.subject.id.clone();
        self.session.enter_search(query, &dir_id);
        Ok(ViewKind::SearchResults)
    }

    fn back_to_search(&mut self) -> Result<ViewKind> {
        let dir = match &self.session.search_dir_id {
            Some(id) => self.ctx.store.get(id)?,
            None => None,
        };
        let Some(dir) = dir else {
            return self.fallback("search directory gone");
        };
        if !access(&*self.ctx.store, &dir, self.user.id)?.can_read() {
            return self.fallback("search directory unavailable");
        }
        self.session.mode = Mode::Searching;
        self.navigate(dir)?;
        Ok(ViewKind::SearchResults)
    }

    // ---- entries -----------------------------------------------------------

    fn make(&mut self, cmd: &Command, kind: EntryKind) -> Result<ViewKind> {
        self.session.reset_state();
        let Some(name) = cmd.text() else {
            return match kind {
                EntryKind::Dir => self.prompt(texts::type_folder(), InputWait::Dir),
                _ => self.prompt(texts::type_label(), InputWait::Label),
            };
        };

        if !self.subject.is_dir() || !valid_name(name, kind) || !self.access()?.can_write() {
            self.rejected("cannot create here");
            return Ok(self.subject_view());
        }
        if !self.ctx.store.name_available(name, &self.subject.id)? {
            self.rejected("name taken");
            return Ok(ViewKind::ViewDir);
        }

        let new = NewEntry {
            parent_id: self.subject.id.clone(),
            name: name.to_string(),
            owner: self.user.id,
            kind,
            file_ref: None,
        };
        let created = self.ctx.store.create(new)?;
        if created.is_dir() {
            self.session.view_offset = 0;
            self.navigate(created)?;
        }
        Ok(ViewKind::ViewDir)
    }

    fn rename(&mut self, cmd: &Command, wait: InputWait, view: ViewKind) -> Result<ViewKind> {
        let Some(name) = cmd.text() else {
            let text = match wait {
                InputWait::LabelEdit => texts::type_label_edit().to_string(),
                _ => texts::type_rename(&self.subject.name),
            };
            return self.prompt(&text, wait);
        };
        self.session.reset_state();

        if name == self.subject.name {
            return Ok(view);
        }
        if !valid_name(name, self.subject.kind) || !self.may_modify()? {
            self.rejected("rename not allowed");
            return Ok(view);
        }
        let Some(dir) = self
            .subject
            .parent_id
            .as_ref()
            .map(|pid| self.ctx.store.get(pid))
            .transpose()?
            .flatten()
        else {
            return self.fallback("parent directory gone");
        };
        if !self.ctx.store.name_available(name, &dir.id)? {
            self.rejected("name taken");
            return Ok(view);
        }

        self.subject.name = name.to_string();
        self.subject.path = child_path(&dir.path, name);
        self.ctx.store.update_meta(&self.subject)?;
        if self.parent.id == dir.id {
            self.parent = dir;
        }
        Ok(view)
    }

    fn drop_subject(&mut self) -> Result<ViewKind> {
        self.session.reset_state();
        self.session.view_offset = 0;
        if !self.may_modify()? {
            self.rejected("delete not allowed");
            return Ok(self.subject_view());
        }
        let doomed = self.subject.clone();
        let parent = self.parent.clone();
        self.ctx.store.delete(&doomed)?;
        self.navigate(parent)?;
        Ok(ViewKind::ViewDir)
    }

    fn upload(&mut self, cmd: &Command) -> Result<ViewKind> {
        self.session.reset_state();
        if !self.subject.is_dir() {
            let parent = self.parent.clone();
            self.navigate(parent)?;
        }
        let Some(file) = &cmd.file else {
            self.rejected("upload without content");
            return Ok(ViewKind::ViewDir);
        };
        let Some(file_ref) = &file.file_ref else {
            self.rejected("upload without content");
            return Ok(ViewKind::ViewDir);
        };
        if !valid_name(&file.name, EntryKind::File) || !self.access()?.can_write() {
            self.rejected("upload not allowed");
            return Ok(ViewKind::ViewDir);
        }

        let dir = self.subject.clone();
        let name = self.unique_name(&file.name, &dir)?;
        self.ctx
            .store
            .create(NewEntry::file(&name, file_ref, &dir.id, self.user.id))?;
        Ok(ViewKind::ViewDir)
    }

    // ---- sharing -----------------------------------------------------------

    fn share(&mut self) -> Result<ViewKind> {
        if !self.owns()? {
            self.rejected("only the owner can share");
            self.session.reset_state();
            return Ok(self.subject_view());
        }
        self.session.reset_state();
        self.session.set_sharing();
        Ok(ViewKind::SubjectShares)
    }

    fn make_glob_link(&mut self) -> Result<ViewKind> {
        self.session.set_sharing();
        if !self.owns()? {
            self.rejected("only the owner can share");
            return Ok(ViewKind::SubjectShares);
        }
        if self
            .ctx
            .store
            .exists_for(&self.subject.id, GLOBAL_SHARE_TARGET)?
        {
            self.rejected("global link exists");
        } else {
            self.ctx.store.create_share(NewShare {
                entry_id: self.subject.id.clone(),
                owner: self.user.id,
                shared_to: GLOBAL_SHARE_TARGET,
                name: self.subject.name.clone(),
                from_name: self.user.name.clone(),
                lang: None,
            })?;
        }
        self.sync_shared_flag()?;
        Ok(ViewKind::SubjectShares)
    }

    fn drop_glob_link(&mut self) -> Result<ViewKind> {
        self.session.set_sharing();
        if !self.owns()? {
            self.rejected("only the owner can share");
            return Ok(ViewKind::SubjectShares);
        }
        let glob = self
            .ctx
            .store
            .list_for_entry(&self.subject.id)?
            .into_iter()
            .find(|s| s.is_global());
        if let Some(glob) = glob {
            self.ctx.store.delete_share(&glob.id)?;
        }
        self.sync_shared_flag()?;
        Ok(ViewKind::SubjectShares)
    }

    fn drop_share(&mut self, cmd: &Command) -> Result<ViewKind> {
        let Some(share) = self.select(cmd)?.and_then(Item::into_share) else {
            return self.fallback("share selection out of range");
        };
        self.session.set_sharing();
        if !self.owns()? {
            self.rejected("only the owner can share");
            return Ok(ViewKind::SubjectShares);
        }
        self.ctx.store.delete_share(&share.id)?;
        self.sync_shared_flag()?;
        Ok(ViewKind::SubjectShares)
    }

    fn change_ro(&mut self, cmd: &Command) -> Result<ViewKind> {
        let Some(share) = self.select(cmd)?.and_then(Item::into_share) else {
            return self.fallback("share selection out of range");
        };
        self.session.set_sharing();
        if share.is_global() || !self.owns()? {
            self.rejected("read/write flag not applicable");
            return Ok(ViewKind::SubjectShares);
        }
        self.ctx.store.change_read_write(&share.id)?;
        Ok(ViewKind::SubjectShares)
    }

    fn mk_grant(&mut self) -> Result<ViewKind> {
        if !self.owns()? {
            self.rejected("only the owner can share");
            self.session.set_sharing();
            return Ok(ViewKind::SubjectShares);
        }
        let text = texts::send_contact(&self.subject);
        self.prompt(&text, InputWait::FileGrant)
    }

    fn grant_access(&mut self, cmd: &Command) -> Result<ViewKind> {
        self.session.set_sharing();
        let Some(contact) = &cmd.file else {
            self.rejected("grant without contact");
            return Ok(ViewKind::SubjectShares);
        };
        if contact.owner == self.user.id || !self.owns()? {
            self.rejected("self-share or not owner");
            return Ok(ViewKind::SubjectShares);
        }

        let target = self.ctx.store.resolve(&PartialUser {
            id: contact.owner,
            name: contact.name.clone(),
            lang: None,
        })?;

        if self.ctx.store.exists_for(&self.subject.id, target.id)? {
            self.rejected("already shared to this user");
        } else {
            let lang = target
                .lang
                .clone()
                .unwrap_or_else(|| crate::model::DEFAULT_LANG.to_string());
            self.ctx.store.create_share(NewShare {
                entry_id: self.subject.id.clone(),
                owner: self.user.id,
                shared_to: target.id,
                name: contact.name.clone(),
                from_name: self.user.name.clone(),
                lang: Some(lang),
            })?;
        }
        self.sync_shared_flag()?;
        Ok(ViewKind::SubjectShares)
    }

    fn join_public_share(&mut self, cmd: &Command) -> Result<ViewKind> {
        self.session.reset_state();
        let share = match cmd.text() {
            Some(token) => self.ctx.store.get_by_token(token)?,
            None => None,
        };
        let Some(share) = share.filter(|s| s.owner != self.user.id) else {
            return self.fallback("unknown or own link");
        };
        let Some(entry) = self.ctx.store.get(&share.entry_id)? else {
            return self.fallback("link target gone");
        };

        if entry.owner != self.user.id && !self.ctx.store.exists_for(&entry.id, self.user.id)? {
            self.ctx.store.create_share(NewShare {
                entry_id: entry.id.clone(),
                owner: share.owner,
                shared_to: self.user.id,
                name: self.user.name.clone(),
                from_name: share.from_name.clone(),
                lang: Some(self.session.lang.clone()),
            })?;
        }

        self.session.view_offset = 0;
        self.navigate(entry)?;
        Ok(self.subject_view())
    }

    // ---- help --------------------------------------------------------------

    fn context_help(&mut self) -> Result<ViewKind> {
        use texts::HelpTopic;

        let topic = if self.session.is_searching() {
            HelpTopic::Searched
        } else if self.session.is_sharing() {
            if self.subject.is_dir() {
                HelpTopic::ShareDir
            } else {
                HelpTopic::ShareFile
            }
        } else if self.session.is_gearing() && !self.session.is_on_top() {
            HelpTopic::Gear
        } else if self.subject.is_label() {
            HelpTopic::Label
        } else if self.subject.is_file() {
            HelpTopic::File
        } else if self.session.is_on_top() {
            HelpTopic::Root
        } else {
            HelpTopic::Listing
        };

        self.ctx
            .transport
            .dialog(self.user.id, texts::help(topic), Format::Plain, false)?;
        Ok(ViewKind::None)
    }
}

#[cfg(test)]
#[path = "../tests/engine/dispatch_tests.rs"]
mod tests;
