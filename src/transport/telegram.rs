use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Format, Keyboard, Reply};

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,

    #[serde(default)]
    pub message: Option<Message>,

    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub language_code: Option<String>,
}

impl TgUser {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ if !self.first_name.is_empty() => self.first_name.clone(),
            _ => self.username.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,

    #[serde(default)]
    pub from: Option<TgUser>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub caption: Option<String>,

    #[serde(default)]
    pub document: Option<Document>,

    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,

    #[serde(default)]
    pub contact: Option<Contact>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,

    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Document {
    pub file_id: String,

    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,
}

/// Bot API delivery. Blocking, like the rest of the turn it finishes.
pub struct TelegramClient {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("tfs")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn call(&self, method: &str, body: &Value) -> Result<()> {
        let resp = self
            .client
            .post(self.url(method))
            .json(body)
            .send()
            .with_context(|| format!("POST {}", method))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            anyhow::bail!("{} failed ({}): {}", method, status, text);
        }
        Ok(())
    }

    pub fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.call(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_id }),
        )
    }

    pub fn deliver(&self, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Dialog {
                user_id,
                text,
                format,
                force_reply,
            } => {
                let mut body = json!({ "chat_id": user_id, "text": text });
                apply_format(&mut body, *format);
                if *force_reply {
                    body["reply_markup"] = json!({ "force_reply": true });
                }
                self.call("sendMessage", &body)
            }
            Reply::Content {
                user_id,
                file_ref: Some(file_ref),
                body: caption,
                format,
                keyboard,
            } => {
                let mut body = json!({
                    "chat_id": user_id,
                    "document": file_ref,
                    "caption": caption,
                    "reply_markup": inline_keyboard(keyboard),
                });
                apply_format(&mut body, *format);
                self.call("sendDocument", &body)
            }
            Reply::Content {
                user_id,
                file_ref: None,
                body: text,
                format,
                keyboard,
            } => {
                let mut body = json!({
                    "chat_id": user_id,
                    "text": text,
                    "reply_markup": inline_keyboard(keyboard),
                });
                apply_format(&mut body, *format);
                self.call("sendMessage", &body)
            }
        }
    }
}

fn apply_format(body: &mut Value, format: Format) {
    if format == Format::MarkdownV2 {
        body["parse_mode"] = json!("MarkdownV2");
    }
}

pub(crate) fn inline_keyboard(keyboard: &Keyboard) -> Value {
    let rows: Vec<Value> = keyboard
        .rows
        .iter()
        .filter(|r| !r.is_empty())
        .map(|row| {
            Value::Array(
                row.iter()
                    .map(|a| json!({ "text": a.label, "callback_data": a.payload }))
                    .collect(),
            )
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

#[cfg(test)]
#[path = "../tests/transport/telegram_tests.rs"]
mod tests;
