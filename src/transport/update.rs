use crate::model::{Attachment, Command, CommandKind, InputWait, PartialUser};

use super::telegram::{Message, TgUser, Update};

const SHARED_LINK_PREFIX: &str = "shared-";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundBody {
    Callback(String),
    Text(String),
    Upload(Attachment),
    Contact(Attachment),
}

/// What arrived from whom, before session-dependent interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub user: PartialUser,
    pub callback_id: Option<String>,
    pub body: InboundBody,
}

pub fn parse_update(update: &Update) -> Option<Inbound> {
    if let Some(cb) = &update.callback_query {
        return Some(Inbound {
            user: partial_user(&cb.from),
            callback_id: Some(cb.id.clone()),
            body: InboundBody::Callback(cb.data.clone().unwrap_or_default()),
        });
    }

    let msg = update.message.as_ref()?;
    let from = msg.from.as_ref()?;
    Some(Inbound {
        user: partial_user(from),
        callback_id: None,
        body: message_body(msg, from.id)?,
    })
}

fn partial_user(u: &TgUser) -> PartialUser {
    PartialUser {
        id: u.id,
        name: u.display_name(),
        lang: u.language_code.clone(),
    }
}

fn message_body(msg: &Message, sender: i64) -> Option<InboundBody> {
    if let Some(contact) = &msg.contact {
        let name = match &contact.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", contact.first_name, last),
            _ => contact.first_name.clone(),
        };
        return Some(InboundBody::Contact(Attachment {
            owner: contact.user_id?,
            name,
            file_ref: None,
        }));
    }

    if let Some(doc) = &msg.document {
        let name = doc
            .file_name
            .clone()
            .or_else(|| msg.caption.clone())
            .unwrap_or_else(|| format!("file_{}", msg.message_id));
        return Some(InboundBody::Upload(Attachment {
            owner: sender,
            name,
            file_ref: Some(doc.file_id.clone()),
        }));
    }

    if let Some(photo) = msg
        .photo
        .as_ref()
        .and_then(|sizes| sizes.iter().max_by_key(|p| p.width * p.height))
    {
        let name = msg
            .caption
            .clone()
            .unwrap_or_else(|| format!("photo_{}.jpg", msg.message_id));
        return Some(InboundBody::Upload(Attachment {
            owner: sender,
            name,
            file_ref: Some(photo.file_id.clone()),
        }));
    }

    msg.text.clone().map(InboundBody::Text)
}

/// Interprets an inbound update against the prompt the user is answering.
/// `None` means there is nothing to do for this update.
pub fn to_command(inbound: &Inbound, wait: InputWait) -> Option<Command> {
    match &inbound.body {
        InboundBody::Callback(data) => {
            let (kind, param) = CommandKind::parse(data)?;
            if !kind.is_callback() {
                return None;
            }
            if kind.is_selection_op() {
                return param.parse::<usize>().ok().map(|i| Command::select(kind, i));
            }
            Some(Command::new(kind))
        }
        InboundBody::Text(text) => Some(text_command(text.trim(), wait)),
        InboundBody::Upload(file) => Some(Command::with_file(CommandKind::UploadFile, file.clone())),
        InboundBody::Contact(contact) if wait == InputWait::FileGrant => Some(Command::with_file(
            CommandKind::GrantAccess,
            contact.clone(),
        )),
        InboundBody::Contact(_) => None,
    }
}

fn text_command(text: &str, wait: InputWait) -> Command {
    let (head, rest) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    if head == "/start" {
        let rest = rest.trim();
        return match rest.strip_prefix(SHARED_LINK_PREFIX) {
            Some(token) => Command::with_input(CommandKind::JoinPublicShare, token),
            None => Command::new(CommandKind::ResetToRoot),
        };
    }
    if text == "/reset" {
        return Command::new(CommandKind::ResetToRoot);
    }
    if text.starts_with('/') {
        return Command::new(CommandKind::ContextHelp);
    }

    let kind = match wait {
        InputWait::Dir => CommandKind::MkDir,
        InputWait::Label => CommandKind::MkLabel,
        InputWait::RenameDir => CommandKind::RenameDir,
        InputWait::RenameFile => CommandKind::RenameFile,
        InputWait::LabelEdit => CommandKind::EditLabel,
        InputWait::None | InputWait::FileGrant => CommandKind::DoSearch,
    };
    Command::with_input(kind, text)
}

#[cfg(test)]
#[path = "../tests/transport/update_tests.rs"]
mod tests;
