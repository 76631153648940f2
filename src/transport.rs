//! The engine's only way out: one [`Reply`] per turn.

use anyhow::Result;
use serde::Serialize;

use crate::model::UserId;

mod telegram;
mod update;

pub use self::telegram::{
    CallbackQuery, Contact, Document, Message, PhotoSize, TelegramClient, TgUser, Update,
};
pub use self::update::{Inbound, InboundBody, parse_update, to_command};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Format {
    MarkdownV2,
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Action {
    pub label: String,
    pub payload: String,
}

/// Rows of selectable actions, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Action>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the current row, opening the first row if needed.
    pub fn button(&mut self, label: impl Into<String>, payload: impl Into<String>) {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.last_mut() {
            row.push(Action {
                label: label.into(),
                payload: payload.into(),
            });
        }
    }

    pub fn new_line(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.rows.iter().flatten()
    }

    pub fn find(&self, payload: &str) -> Option<&Action> {
        self.actions().find(|a| a.payload == payload)
    }

    /// Drops empty rows left behind by `new_line`.
    pub fn compact(mut self) -> Self {
        self.rows.retain(|r| !r.is_empty());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// A prompt; the user is expected to answer with text or a contact.
    Dialog {
        user_id: UserId,
        text: String,
        format: Format,
        force_reply: bool,
    },
    Content {
        user_id: UserId,
        file_ref: Option<String>,
        body: String,
        format: Format,
        keyboard: Keyboard,
    },
}

impl Reply {
    pub fn user_id(&self) -> UserId {
        match self {
            Reply::Dialog { user_id, .. } | Reply::Content { user_id, .. } => *user_id,
        }
    }
}

pub trait Transport {
    fn dialog(&mut self, user_id: UserId, text: &str, format: Format, force_reply: bool)
    -> Result<()>;

    fn send_content(
        &mut self,
        user_id: UserId,
        file_ref: Option<&str>,
        body: &str,
        format: Format,
        keyboard: Keyboard,
    ) -> Result<()>;
}

/// Buffers replies until the turn commits.
#[derive(Debug, Default)]
pub struct Outbox {
    replies: Vec<Reply>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn take(&mut self) -> Vec<Reply> {
        std::mem::take(&mut self.replies)
    }
}

impl Transport for Outbox {
    fn dialog(
        &mut self,
        user_id: UserId,
        text: &str,
        format: Format,
        force_reply: bool,
    ) -> Result<()> {
        self.replies.push(Reply::Dialog {
            user_id,
            text: text.to_string(),
            format,
            force_reply,
        });
        Ok(())
    }

    fn send_content(
        &mut self,
        user_id: UserId,
        file_ref: Option<&str>,
        body: &str,
        format: Format,
        keyboard: Keyboard,
    ) -> Result<()> {
        self.replies.push(Reply::Content {
            user_id,
            file_ref: file_ref.map(str::to_string),
            body: body.to_string(),
            format,
            keyboard: keyboard.compact(),
        });
        Ok(())
    }
}
