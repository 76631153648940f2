use std::fmt;

use super::ids::UserId;

/// Every intent a user can express. Names are part of the callback wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    BackToSearch,
    CancelShare,
    CancelSearch,
    ChangeRo,
    DoSearch,
    DropFile,
    DropDir,
    DropLabel,
    DropGlobLink,
    DropShare,
    EditLabel,
    Rewind,
    Forward,
    Gear,
    OpenParent,
    JoinPublicShare,
    MakeGlobLink,
    MkDir,
    MkGrant,
    GrantAccess,
    MkLabel,
    OpenDir,
    OpenFile,
    OpenLabel,
    OpenSearchedDir,
    OpenSearchedFile,
    OpenSearchedLabel,
    RenameDir,
    RenameFile,
    ResetToRoot,
    Share,
    UploadFile,
    ContextHelp,
}

/// Static capabilities of a command kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Delivered by an action button.
    pub callback: bool,
    /// Consumes `element_idx`.
    pub selection: bool,
    /// Consumes free text.
    pub input: bool,
}

const BUTTON: Capabilities = Capabilities {
    callback: true,
    selection: false,
    input: false,
};

const SELECT: Capabilities = Capabilities {
    callback: true,
    selection: true,
    input: false,
};

const BUTTON_OR_TEXT: Capabilities = Capabilities {
    callback: true,
    selection: false,
    input: true,
};

const TEXT: Capabilities = Capabilities {
    callback: false,
    selection: false,
    input: true,
};

const MESSAGE: Capabilities = Capabilities {
    callback: false,
    selection: false,
    input: false,
};

impl CommandKind {
    pub const ALL: [CommandKind; 33] = [
        CommandKind::BackToSearch,
        CommandKind::CancelShare,
        CommandKind::CancelSearch,
        CommandKind::ChangeRo,
        CommandKind::DoSearch,
        CommandKind::DropFile,
        CommandKind::DropDir,
        CommandKind::DropLabel,
        CommandKind::DropGlobLink,
        CommandKind::DropShare,
        CommandKind::EditLabel,
        CommandKind::Rewind,
        CommandKind::Forward,
        CommandKind::Gear,
        CommandKind::OpenParent,
        CommandKind::JoinPublicShare,
        CommandKind::MakeGlobLink,
        CommandKind::MkDir,
        CommandKind::MkGrant,
        CommandKind::GrantAccess,
        CommandKind::MkLabel,
        CommandKind::OpenDir,
        CommandKind::OpenFile,
        CommandKind::OpenLabel,
        CommandKind::OpenSearchedDir,
        CommandKind::OpenSearchedFile,
        CommandKind::OpenSearchedLabel,
        CommandKind::RenameDir,
        CommandKind::RenameFile,
        CommandKind::ResetToRoot,
        CommandKind::Share,
        CommandKind::UploadFile,
        CommandKind::ContextHelp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::BackToSearch => "backToSearch",
            CommandKind::CancelShare => "cancelShare",
            CommandKind::CancelSearch => "cancelSearch",
            CommandKind::ChangeRo => "changeRo",
            CommandKind::DoSearch => "doSearch",
            CommandKind::DropFile => "dropFile",
            CommandKind::DropDir => "dropDir",
            CommandKind::DropLabel => "dropLabel",
            CommandKind::DropGlobLink => "dropGlobLink",
            CommandKind::DropShare => "dropShare",
            CommandKind::EditLabel => "editLabel",
            CommandKind::Rewind => "rewind",
            CommandKind::Forward => "forward",
            CommandKind::Gear => "gear",
            CommandKind::OpenParent => "openParent",
            CommandKind::JoinPublicShare => "joinPublicShare",
            CommandKind::MakeGlobLink => "makeGlobLink",
            CommandKind::MkDir => "mkDir",
            CommandKind::MkGrant => "mkGrant",
            CommandKind::GrantAccess => "grantAccess",
            CommandKind::MkLabel => "mkLabel",
            CommandKind::OpenDir => "openDir",
            CommandKind::OpenFile => "openFile",
            CommandKind::OpenLabel => "openLabel",
            CommandKind::OpenSearchedDir => "openSearchedDir",
            CommandKind::OpenSearchedFile => "openSearchedFile",
            CommandKind::OpenSearchedLabel => "openSearchedLabel",
            CommandKind::RenameDir => "renameDir",
            CommandKind::RenameFile => "renameFile",
            CommandKind::ResetToRoot => "resetToRoot",
            CommandKind::Share => "share",
            CommandKind::UploadFile => "uploadFile",
            CommandKind::ContextHelp => "contextHelp",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            CommandKind::ChangeRo
            | CommandKind::DropShare
            | CommandKind::OpenDir
            | CommandKind::OpenFile
            | CommandKind::OpenLabel
            | CommandKind::OpenSearchedDir
            | CommandKind::OpenSearchedFile
            | CommandKind::OpenSearchedLabel => SELECT,

            CommandKind::MkDir
            | CommandKind::MkLabel
            | CommandKind::RenameDir
            | CommandKind::RenameFile
            | CommandKind::EditLabel => BUTTON_OR_TEXT,

            CommandKind::DoSearch | CommandKind::JoinPublicShare => TEXT,

            CommandKind::GrantAccess
            | CommandKind::UploadFile
            | CommandKind::ContextHelp
            | CommandKind::ResetToRoot => MESSAGE,

            _ => BUTTON,
        }
    }

    pub fn is_callback(self) -> bool {
        self.capabilities().callback
    }

    pub fn is_selection_op(self) -> bool {
        self.capabilities().selection
    }

    pub fn takes_input(self) -> bool {
        self.capabilities().input
    }

    /// `"<name>."`, the prefix every payload of this kind starts with.
    pub fn mnemonic(self) -> String {
        format!("{}.", self.name())
    }

    pub fn mnemonic_with(self, param: impl fmt::Display) -> String {
        format!("{}{}", self.mnemonic(), param)
    }

    pub fn matches(self, payload: &str) -> bool {
        payload
            .strip_prefix(self.name())
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Maps a callback payload back to its kind and the parameter after the dot.
    pub fn parse(payload: &str) -> Option<(CommandKind, &str)> {
        let kind = Self::ALL.into_iter().find(|k| k.matches(payload))?;
        Some((kind, &payload[kind.name().len() + 1..]))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uploaded content or a shared contact, as described by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Uploader, or the user id of a shared contact.
    pub owner: UserId,
    pub name: String,
    pub file_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub element_idx: Option<usize>,
    pub input: Option<String>,
    pub file: Option<Attachment>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            element_idx: None,
            input: None,
            file: None,
        }
    }

    pub fn select(kind: CommandKind, idx: usize) -> Self {
        Self {
            element_idx: Some(idx),
            ..Self::new(kind)
        }
    }

    pub fn with_input(kind: CommandKind, input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_file(kind: CommandKind, file: Attachment) -> Self {
        Self {
            file: Some(file),
            ..Self::new(kind)
        }
    }

    /// Free text with surrounding whitespace removed; `None` when blank.
    pub fn text(&self) -> Option<&str> {
        self.input
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[path = "../tests/model/command_tests.rs"]
mod tests;
