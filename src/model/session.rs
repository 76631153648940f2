use serde::{Deserialize, Serialize};

use super::ids::{EntryId, UserId};

/// Exactly one mode is active at a time; `Browsing` is the resting state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Browsing,
    Searching,
    Sharing,
    Gearing,
}

/// Free-text reply the bot is waiting for after a prompt dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputWait {
    #[default]
    None,
    Dir,
    Label,
    FileGrant,
    RenameDir,
    RenameFile,
    LabelEdit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub root_id: EntryId,
    pub subject_id: EntryId,

    #[serde(default)]
    pub search_dir_id: Option<EntryId>,

    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub view_offset: usize,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub input_wait: InputWait,

    pub lang: String,
}

impl Session {
    pub fn new(user_id: UserId, root_id: EntryId, lang: &str) -> Self {
        Self {
            user_id,
            subject_id: root_id.clone(),
            root_id,
            search_dir_id: None,
            query: String::new(),
            view_offset: 0,
            mode: Mode::Browsing,
            input_wait: InputWait::None,
            lang: lang.to_string(),
        }
    }

    /// Leaves searching/sharing/gearing; navigation position is untouched.
    pub fn reset_state(&mut self) {
        self.mode = Mode::Browsing;
    }

    pub fn reset_input_wait(&mut self) {
        self.input_wait = InputWait::None;
    }

    pub fn enter_search(&mut self, query: &str, dir_id: &EntryId) {
        self.query = query.to_string();
        self.view_offset = 0;
        self.search_dir_id = Some(dir_id.clone());
        self.mode = Mode::Searching;
    }

    pub fn set_sharing(&mut self) {
        self.mode = Mode::Sharing;
    }

    pub fn set_gearing(&mut self) {
        self.mode = Mode::Gearing;
    }

    pub fn is_searching(&self) -> bool {
        self.mode == Mode::Searching
    }

    pub fn is_sharing(&self) -> bool {
        self.mode == Mode::Sharing
    }

    pub fn is_gearing(&self) -> bool {
        self.mode == Mode::Gearing
    }

    pub fn is_on_top(&self) -> bool {
        self.subject_id == self.root_id
    }

    pub fn navigate(&mut self, id: &EntryId) {
        self.subject_id = id.clone();
    }

    /// Moves one page back; never below zero.
    pub fn rewind(&mut self, page: usize) {
        self.view_offset = self.view_offset.saturating_sub(page);
    }

    /// Moves one page forward only while items remain past the current page.
    pub fn forward(&mut self, page: usize, total: usize) {
        if self.view_offset + page < total {
            self.view_offset += page;
        }
    }
}

#[cfg(test)]
#[path = "../tests/model/session_tests.rs"]
mod tests;
