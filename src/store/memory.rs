use std::collections::{BTreeMap, VecDeque};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::{EntryStore, ShareStore, UserDirectory};
use crate::model::{
    Entry, EntryId, EntryKind, GLOBAL_SHARE_TARGET, NewEntry, NewShare, PartialUser, ROOT_PATH,
    Session, Share, ShareId, User, UserId, child_path, generate_id, now_ts,
};

/// In-memory state of the whole bot. Maps are ordered so listings are
/// stable between the turn that renders a keyboard and the turn that acts on it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Db {
    pub version: u32,

    #[serde(default)]
    entries: BTreeMap<EntryId, Entry>,

    #[serde(default)]
    shares: BTreeMap<ShareId, Share>,

    #[serde(default)]
    users: BTreeMap<UserId, User>,

    #[serde(default)]
    sessions: BTreeMap<UserId, Session>,
}

impl Db {
    pub fn new() -> Self {
        Self {
            version: 1,
            ..Self::default()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn share_count(&self) -> usize {
        self.shares.len()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    fn children(&self, parent_id: &EntryId) -> impl Iterator<Item = &Entry> {
        self.entries
            .values()
            .filter(move |e| e.parent_id.as_ref() == Some(parent_id))
    }

    /// Ids of every entry strictly below `root_id`, breadth-first.
    fn descendants(&self, root_id: &EntryId) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([root_id.clone()]);
        while let Some(id) = queue.pop_front() {
            for child in self.children(&id) {
                out.push(child.id.clone());
                queue.push_back(child.id.clone());
            }
        }
        out
    }

    fn fresh_entry_id(&self) -> Result<EntryId> {
        loop {
            let id = EntryId(generate_id()?);
            if !self.entries.contains_key(&id) {
                return Ok(id);
            }
        }
    }

    fn fresh_share_id(&self) -> Result<ShareId> {
        loop {
            let id = ShareId(generate_id()?);
            if !self.shares.contains_key(&id) {
                return Ok(id);
            }
        }
    }
}

impl EntryStore for Db {
    fn get(&self, id: &EntryId) -> Result<Option<Entry>> {
        Ok(self.entries.get(id).cloned())
    }

    fn list(&self, parent_id: &EntryId) -> Result<Vec<Entry>> {
        Ok(self.children(parent_id).cloned().collect())
    }

    fn list_of_kind(&self, parent_id: &EntryId, kind: EntryKind) -> Result<Vec<Entry>> {
        Ok(self
            .children(parent_id)
            .filter(|e| e.kind == kind)
            .cloned()
            .collect())
    }

    fn search(&self, query: &str, root_id: &EntryId) -> Result<Vec<Entry>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for id in self.descendants(root_id) {
            if let Some(e) = self.entries.get(&id)
                && e.name.to_lowercase().contains(&needle)
            {
                out.push(e.clone());
            }
        }
        Ok(out)
    }

    fn create(&mut self, entry: NewEntry) -> Result<Entry> {
        let parent = self
            .entries
            .get(&entry.parent_id)
            .with_context(|| format!("parent entry {} not found", entry.parent_id))?;
        if !parent.is_dir() {
            anyhow::bail!("parent entry {} is not a directory", entry.parent_id);
        }
        let path = child_path(&parent.path, &entry.name);
        let created = Entry {
            id: self.fresh_entry_id()?,
            parent_id: Some(entry.parent_id),
            name: entry.name,
            path,
            owner: entry.owner,
            kind: entry.kind,
            shared: false,
            file_ref: entry.file_ref,
        };
        self.entries.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    fn update_meta(&mut self, entry: &Entry) -> Result<()> {
        let old_path = self
            .entries
            .get(&entry.id)
            .map(|e| e.path.clone())
            .ok_or_else(|| anyhow!("entry {} not found", entry.id))?;

        if old_path != entry.path {
            for id in self.descendants(&entry.id) {
                if let Some(d) = self.entries.get_mut(&id)
                    && let Some(rest) = d.path.strip_prefix(&old_path)
                {
                    d.path = format!("{}{}", entry.path, rest);
                }
            }
        }

        self.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn delete(&mut self, entry: &Entry) -> Result<()> {
        if !self.entries.contains_key(&entry.id) {
            return Err(anyhow!("entry {} not found", entry.id));
        }
        let mut doomed = self.descendants(&entry.id);
        doomed.push(entry.id.clone());
        for id in &doomed {
            self.entries.remove(id);
        }
        self.shares.retain(|_, s| !doomed.contains(&s.entry_id));
        Ok(())
    }

    fn name_available(&self, name: &str, parent_id: &EntryId) -> Result<bool> {
        Ok(!self.children(parent_id).any(|e| e.name == name))
    }

    fn find_root(&self, user_id: UserId) -> Result<Option<Entry>> {
        Ok(self
            .entries
            .values()
            .find(|e| e.owner == user_id && e.is_root())
            .cloned())
    }

    fn create_root(&mut self, user_id: UserId) -> Result<Entry> {
        if let Some(existing) = self.find_root(user_id)? {
            return Ok(existing);
        }
        let root = Entry {
            id: self.fresh_entry_id()?,
            parent_id: None,
            name: String::new(),
            path: ROOT_PATH.to_string(),
            owner: user_id,
            kind: EntryKind::Dir,
            shared: false,
            file_ref: None,
        };
        self.entries.insert(root.id.clone(), root.clone());
        Ok(root)
    }
}

impl ShareStore for Db {
    fn create_share(&mut self, share: NewShare) -> Result<Share> {
        if !self.entries.contains_key(&share.entry_id) {
            anyhow::bail!("entry {} not found", share.entry_id);
        }
        if self.exists_for(&share.entry_id, share.shared_to)? {
            anyhow::bail!(
                "entry {} is already shared to {}",
                share.entry_id,
                share.shared_to
            );
        }
        let created = Share {
            id: self.fresh_share_id()?,
            entry_id: share.entry_id,
            owner: share.owner,
            shared_to: share.shared_to,
            name: share.name,
            from_name: share.from_name,
            read_write: false,
            lang: share.lang,
            created_at: now_ts(),
        };
        self.shares.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    fn delete_share(&mut self, id: &ShareId) -> Result<()> {
        self.shares
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("share {} not found", id))
    }

    fn list_for_entry(&self, entry_id: &EntryId) -> Result<Vec<Share>> {
        Ok(self
            .shares
            .values()
            .filter(|s| &s.entry_id == entry_id)
            .cloned()
            .collect())
    }

    fn exists_for(&self, entry_id: &EntryId, target: UserId) -> Result<bool> {
        Ok(self
            .shares
            .values()
            .any(|s| &s.entry_id == entry_id && s.shared_to == target))
    }

    fn any_exist_for(&self, entry_id: &EntryId) -> Result<bool> {
        Ok(self.shares.values().any(|s| &s.entry_id == entry_id))
    }

    fn get_by_token(&self, token: &str) -> Result<Option<Share>> {
        Ok(self
            .shares
            .get(&ShareId(token.to_string()))
            .filter(|s| s.shared_to == GLOBAL_SHARE_TARGET)
            .cloned())
    }

    fn change_read_write(&mut self, id: &ShareId) -> Result<()> {
        let share = self
            .shares
            .get_mut(id)
            .ok_or_else(|| anyhow!("share {} not found", id))?;
        share.read_write = !share.read_write;
        Ok(())
    }
}

impl UserDirectory for Db {
    fn resolve(&mut self, partial: &PartialUser) -> Result<User> {
        let user = self.users.entry(partial.id).or_insert_with(|| User {
            id: partial.id,
            name: partial.name.clone(),
            lang: partial.lang.clone(),
            created_at: now_ts(),
        });
        if !partial.name.is_empty() {
            user.name = partial.name.clone();
        }
        if partial.lang.is_some() {
            user.lang = partial.lang.clone();
        }
        Ok(user.clone())
    }

    fn load_session(&self, user_id: UserId) -> Result<Option<Session>> {
        Ok(self.sessions.get(&user_id).cloned())
    }

    fn save_session(&mut self, session: &Session) -> Result<()> {
        self.sessions.insert(session.user_id, session.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/store/memory_tests.rs"]
mod tests;
