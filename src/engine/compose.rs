use anyhow::Result;

use super::dispatch::Outcome;
use super::markdown::{code_block, escape_md};
use super::paging::{Page, paginate};
use super::scope::{labels, listing, search_results, shares};
use super::{BotConfig, Ctx, ViewKind, texts};
use crate::model::{CommandKind, Entry, EntryKind, Session};
use crate::store::Store;
use crate::transport::{Format, Keyboard};

/// A composed content message, before it is handed to the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    pub keyboard: Keyboard,
    pub file_ref: Option<String>,
}

pub fn compose(ctx: &mut Ctx<'_>, outcome: &Outcome, session: &Session) -> Result<()> {
    let rendered = render(
        &*ctx.store,
        ctx.config,
        &outcome.subject,
        &outcome.parent,
        outcome.view,
        session,
    )?;
    ctx.transport.send_content(
        session.user_id,
        rendered.file_ref.as_deref(),
        &rendered.body,
        Format::MarkdownV2,
        rendered.keyboard,
    )
}

pub fn render(
    store: &dyn Store,
    config: &BotConfig,
    subject: &Entry,
    parent: &Entry,
    view: ViewKind,
    session: &Session,
) -> Result<Rendered> {
    let mut out = Rendered::default();
    match view {
        ViewKind::None => {}
        ViewKind::GearSubject => gear_subject(store, subject, session, &mut out)?,
        ViewKind::SearchResults => search_page(store, config, subject, session, &mut out)?,
        ViewKind::SubjectShares => subject_shares(store, config, subject, &mut out)?,
        ViewKind::ViewDir => {
            out.body.push_str(&escape_md(&subject.path));
            if !session.is_on_top() {
                command_button(&mut out.keyboard, CommandKind::OpenParent);
            }
            dir_listing(store, config, subject, session, &mut out)?;
        }
        ViewKind::ViewSearchedDir => {
            searched_header(session, parent, &mut out);
            out.body.push_str(&escape_md(&subject.name));
            command_button(&mut out.keyboard, CommandKind::BackToSearch);
            dir_listing(store, config, subject, session, &mut out)?;
        }
        ViewKind::ViewFile => {
            out.file_ref = subject.file_ref.clone();
            out.body.push_str(&escape_md(&subject.path));
            command_buttons(
                &mut out.keyboard,
                &[
                    CommandKind::OpenParent,
                    CommandKind::Share,
                    CommandKind::RenameFile,
                    CommandKind::DropFile,
                ],
            );
        }
        ViewKind::ViewSearchedFile => {
            out.file_ref = subject.file_ref.clone();
            searched_header(session, parent, &mut out);
            out.body.push_str(&escape_md(&subject.name));
            command_buttons(
                &mut out.keyboard,
                &[
                    CommandKind::BackToSearch,
                    CommandKind::Share,
                    CommandKind::RenameFile,
                    CommandKind::DropFile,
                ],
            );
        }
        ViewKind::ViewLabel => {
            out.body.push('*');
            out.body.push_str(&escape_md(&parent.path));
            out.body.push_str("*\n\n");
            out.body.push_str(&escape_md(&subject.name));
            command_buttons(
                &mut out.keyboard,
                &[
                    CommandKind::OpenParent,
                    CommandKind::EditLabel,
                    CommandKind::DropLabel,
                ],
            );
        }
        ViewKind::ViewSearchedLabel => {
            searched_header(session, parent, &mut out);
            out.body.push_str(&code_block(&subject.name));
            command_buttons(
                &mut out.keyboard,
                &[
                    CommandKind::BackToSearch,
                    CommandKind::EditLabel,
                    CommandKind::DropLabel,
                ],
            );
        }
    }
    Ok(out)
}

fn command_button(kbd: &mut Keyboard, kind: CommandKind) {
    kbd.button(texts::button_label(kind), kind.mnemonic());
}

fn command_buttons(kbd: &mut Keyboard, kinds: &[CommandKind]) {
    for kind in kinds {
        command_button(kbd, *kind);
    }
}

fn open_kind(entry: &Entry, searched: bool) -> CommandKind {
    match (entry.kind, searched) {
        (EntryKind::Dir, false) => CommandKind::OpenDir,
        (EntryKind::File, false) => CommandKind::OpenFile,
        (EntryKind::Label, false) => CommandKind::OpenLabel,
        (EntryKind::Dir, true) => CommandKind::OpenSearchedDir,
        (EntryKind::File, true) => CommandKind::OpenSearchedFile,
        (EntryKind::Label, true) => CommandKind::OpenSearchedLabel,
    }
}

fn paging_row(kbd: &mut Keyboard, page: &Page<'_>) {
    if !page.rewind && !page.forward {
        return;
    }
    kbd.new_line();
    if page.rewind {
        command_button(kbd, CommandKind::Rewind);
    }
    if page.forward {
        command_button(kbd, CommandKind::Forward);
    }
}

fn searched_header(session: &Session, parent: &Entry, out: &mut Rendered) {
    out.body.push('_');
    out.body
        .push_str(&escape_md(&texts::searched(&session.query, &parent.path)));
    out.body.push_str("_\n");
}

/// Labels go into the body; directories and files become paged buttons.
fn dir_listing(
    store: &dyn Store,
    config: &BotConfig,
    subject: &Entry,
    session: &Session,
    out: &mut Rendered,
) -> Result<()> {
    let scope = listing(store, subject)?;

    let mut notes: Vec<&Entry> = scope.iter().filter(|e| e.is_label()).collect();
    notes.sort_by(|a, b| a.name.cmp(&b.name));
    for label in &notes {
        out.body.push('\n');
        out.body.push_str(&code_block(&label.name));
    }
    if scope.is_empty() {
        out.body.push_str("\n_");
        out.body.push_str(&escape_md(texts::no_content()));
        out.body.push('_');
    }

    command_buttons(
        &mut out.keyboard,
        &[CommandKind::MkLabel, CommandKind::MkDir, CommandKind::Gear],
    );

    let page = paginate(&scope, session.view_offset, config.page_size, false);
    for (idx, entry) in &page.items {
        out.keyboard.new_line();
        out.keyboard.button(
            texts::entry_button(entry),
            open_kind(entry, false).mnemonic_with(idx),
        );
    }
    paging_row(&mut out.keyboard, &page);
    Ok(())
}

fn gear_subject(
    store: &dyn Store,
    subject: &Entry,
    session: &Session,
    out: &mut Rendered,
) -> Result<()> {
    out.body.push_str(&escape_md(&texts::gearing(&subject.path)));

    if !session.is_on_top() {
        command_buttons(
            &mut out.keyboard,
            &[CommandKind::Share, CommandKind::RenameDir, CommandKind::DropDir],
        );
    }
    command_button(&mut out.keyboard, CommandKind::CancelShare);

    for (idx, label) in labels(store, subject)?.iter().enumerate() {
        out.keyboard.new_line();
        out.keyboard.button(
            texts::entry_button(label),
            CommandKind::OpenLabel.mnemonic_with(idx),
        );
    }
    Ok(())
}

fn search_page(
    store: &dyn Store,
    config: &BotConfig,
    subject: &Entry,
    session: &Session,
    out: &mut Rendered,
) -> Result<()> {
    let search_dir = match &session.search_dir_id {
        Some(id) if *id != subject.id => store.get(id)?.unwrap_or_else(|| subject.clone()),
        _ => subject.clone(),
    };
    let found = search_results(store, session)?;

    out.body.push_str(&escape_md(&texts::searched(
        &session.query,
        &search_dir.path,
    )));
    command_button(&mut out.keyboard, CommandKind::CancelSearch);

    if found.is_empty() {
        out.body.push_str("\n_");
        out.body.push_str(&escape_md(texts::no_results()));
        out.body.push('_');
        return Ok(());
    }

    out.body.push_str("\n_");
    out.body
        .push_str(&escape_md(&texts::results_found(found.len())));
    out.body.push('_');

    let page = paginate(&found, session.view_offset, config.page_size, true);
    for (idx, entry) in &page.items {
        out.keyboard.new_line();
        out.keyboard.button(
            texts::searched_button(entry, &search_dir.path),
            open_kind(entry, true).mnemonic_with(idx),
        );
    }
    paging_row(&mut out.keyboard, &page);
    Ok(())
}

fn subject_shares(
    store: &dyn Store,
    config: &BotConfig,
    subject: &Entry,
    out: &mut Rendered,
) -> Result<()> {
    let scope = shares(store, subject)?;
    let glob = scope.iter().find(|s| s.is_global());
    let personal = scope.iter().filter(|s| !s.is_global()).count();

    out.body.push_str(&escape_md(texts::access_title(subject)));
    out.body.push_str(" *");
    out.body.push_str(&escape_md(&subject.path));
    out.body.push_str("*\n\n");

    let link = match glob {
        Some(share) => texts::global_link(&config.bot_nick, share.id.as_str()),
        None => texts::no_global_link().to_string(),
    };
    out.body.push_str(texts::LINK);
    out.body.push_str(": _");
    out.body.push_str(&escape_md(&link));
    out.body.push_str("_\n");

    if personal == 0 {
        out.body.push_str(texts::PEOPLE);
        out.body.push_str(": _");
        out.body.push_str(&escape_md(texts::no_personal_grants()));
        out.body.push('_');
    }

    let link_toggle = if glob.is_some() {
        CommandKind::DropGlobLink
    } else {
        CommandKind::MakeGlobLink
    };
    command_buttons(
        &mut out.keyboard,
        &[link_toggle, CommandKind::MkGrant, CommandKind::CancelShare],
    );

    // Rows carry the position in the full share scope, global link included.
    for (idx, share) in scope.iter().enumerate().filter(|(_, s)| !s.is_global()) {
        out.keyboard.new_line();
        out.keyboard.button(
            texts::share_mode_button(share),
            CommandKind::ChangeRo.mnemonic_with(idx),
        );
        out.keyboard.button(
            texts::drop_share_button(),
            CommandKind::DropShare.mnemonic_with(idx),
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/engine/compose_tests.rs"]
mod tests;
