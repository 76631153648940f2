//! User-facing strings. English only; translations live with the transport.

use crate::model::{CommandKind, Entry, EntryKind, Share};

pub const LINK: &str = "\u{1F517}";
pub const PEOPLE: &str = "\u{1F465}";

pub fn button_label(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::BackToSearch => "\u{2B05} Results",
        CommandKind::CancelShare | CommandKind::CancelSearch => "\u{2716} Close",
        CommandKind::DropFile | CommandKind::DropDir | CommandKind::DropLabel => {
            "\u{1F5D1} Delete"
        }
        CommandKind::DropGlobLink => "\u{1F517} Drop link",
        CommandKind::MakeGlobLink => "\u{1F517} Make link",
        CommandKind::EditLabel => "\u{270F} Edit",
        CommandKind::RenameDir | CommandKind::RenameFile => "\u{270F} Rename",
        CommandKind::Rewind => "\u{25C0}",
        CommandKind::Forward => "\u{25B6}",
        CommandKind::Gear => "\u{2699}",
        CommandKind::OpenParent => "\u{2B06} Up",
        CommandKind::MkDir => "\u{1F4C1}+",
        CommandKind::MkLabel => "\u{1F3F7}+",
        CommandKind::MkGrant => "\u{1F465} Grant",
        CommandKind::Share => "\u{1F91D} Share",
        _ => kind.name(),
    }
}

fn kind_icon(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Dir => "\u{1F4C1}",
        EntryKind::File => "\u{1F4C4}",
        EntryKind::Label => "\u{1F3F7}",
    }
}

pub fn entry_button(entry: &Entry) -> String {
    format!("{} {}", kind_icon(entry.kind), entry.name)
}

/// Search hits are labelled with their path below the searched directory.
pub fn searched_button(entry: &Entry, search_root_path: &str) -> String {
    let rel = entry
        .path
        .strip_prefix(search_root_path)
        .unwrap_or(&entry.path)
        .trim_start_matches('/');
    format!("{} {}", kind_icon(entry.kind), rel)
}

pub fn share_mode_button(share: &Share) -> String {
    if share.read_write {
        format!("\u{270F} rw: {}", share.name)
    } else {
        format!("\u{1F441} ro: {}", share.name)
    }
}

pub fn drop_share_button() -> &'static str {
    "\u{2716}"
}

pub fn gearing(path: &str) -> String {
    format!("Settings of {}", path)
}

pub fn searched(query: &str, path: &str) -> String {
    format!("Search for \"{}\" in {}", query, path)
}

pub fn no_results() -> &'static str {
    "Nothing found"
}

pub fn results_found(n: usize) -> String {
    format!("Found: {}", n)
}

pub fn access_title(entry: &Entry) -> &'static str {
    if entry.is_dir() {
        "Access to folder"
    } else {
        "Access to file"
    }
}

pub fn no_global_link() -> &'static str {
    "no public link"
}

pub fn no_personal_grants() -> &'static str {
    "no personal grants"
}

pub fn no_content() -> &'static str {
    "empty"
}

pub fn global_link(bot_nick: &str, share_id: &str) -> String {
    format!("https://t.me/{}?start=shared-{}", bot_nick, share_id)
}

pub fn type_folder() -> &'static str {
    "Send me a name for the new folder"
}

pub fn type_label() -> &'static str {
    "Send me the text of the new label"
}

pub fn type_rename(current: &str) -> String {
    format!("Send me a new name for \"{}\"", current)
}

pub fn type_label_edit() -> &'static str {
    "Send me the new text of the label"
}

pub fn send_contact(entry: &Entry) -> String {
    if entry.is_dir() {
        format!("Send me a contact to share the folder \"{}\" with", entry.name)
    } else {
        format!("Send me a contact to share the file \"{}\" with", entry.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelpTopic {
    Searched,
    ShareDir,
    ShareFile,
    Gear,
    Label,
    File,
    Root,
    Listing,
}

pub fn help(topic: HelpTopic) -> &'static str {
    match topic {
        HelpTopic::Searched => {
            "These are search results. Pick an entry to open it, or close the search to go back."
        }
        HelpTopic::ShareDir => {
            "Make a public link to the folder or grant access to a contact. Read-only grants can be switched to read-write."
        }
        HelpTopic::ShareFile => {
            "Make a public link to the file or grant access to a contact."
        }
        HelpTopic::Gear => "Share, rename or delete the folder. Pick a label to edit it.",
        HelpTopic::Label => "A label is a note attached to a folder. Edit or delete it here.",
        HelpTopic::File => "Share, rename or delete the file.",
        HelpTopic::Root => {
            "This is your root folder. Send a file to store it, create folders and labels, or type anything to search."
        }
        HelpTopic::Listing => {
            "Send a file to store it here, create folders and labels, or type anything to search."
        }
    }
}
