use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::ids::{EntryId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Label,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,

    /// `None` only for a user's root directory.
    #[serde(default)]
    pub parent_id: Option<EntryId>,

    pub name: String,
    pub path: String,
    pub owner: UserId,
    pub kind: EntryKind,

    /// True iff at least one share references this entry.
    #[serde(default)]
    pub shared: bool,

    /// Transport content reference (Telegram `file_id`) for uploaded files.
    #[serde(default)]
    pub file_ref: Option<String>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_label(&self) -> bool {
        self.kind == EntryKind::Label
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Fields of an entry before the store assigns an id and a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub parent_id: EntryId,
    pub name: String,
    pub owner: UserId,
    pub kind: EntryKind,
    pub file_ref: Option<String>,
}

impl NewEntry {
    pub fn dir(name: &str, parent_id: &EntryId, owner: UserId) -> Self {
        Self {
            parent_id: parent_id.clone(),
            name: name.to_string(),
            owner,
            kind: EntryKind::Dir,
            file_ref: None,
        }
    }

    pub fn label(text: &str, parent_id: &EntryId, owner: UserId) -> Self {
        Self {
            parent_id: parent_id.clone(),
            name: text.to_string(),
            owner,
            kind: EntryKind::Label,
            file_ref: None,
        }
    }

    pub fn file(name: &str, file_ref: &str, parent_id: &EntryId, owner: UserId) -> Self {
        Self {
            parent_id: parent_id.clone(),
            name: name.to_string(),
            owner,
            kind: EntryKind::File,
            file_ref: Some(file_ref.to_string()),
        }
    }
}

pub const ROOT_PATH: &str = "/";

pub fn child_path(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() || parent_path == ROOT_PATH {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent_path.trim_end_matches('/'), name)
    }
}

/// Directories first, then by name.
pub fn listing_order(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name.cmp(&b.name))
}
