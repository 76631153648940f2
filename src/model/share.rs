use serde::{Deserialize, Serialize};

use super::ids::{EntryId, GLOBAL_SHARE_TARGET, ShareId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub entry_id: EntryId,
    pub owner: UserId,

    /// `0` for a global link, otherwise the grantee.
    pub shared_to: UserId,

    /// Display name shown to the grantee.
    pub name: String,

    #[serde(default)]
    pub from_name: String,

    #[serde(default)]
    pub read_write: bool,

    #[serde(default)]
    pub lang: Option<String>,

    pub created_at: String,
}

impl Share {
    pub fn is_global(&self) -> bool {
        self.shared_to == GLOBAL_SHARE_TARGET
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewShare {
    pub entry_id: EntryId,
    pub owner: UserId,
    pub shared_to: UserId,
    pub name: String,
    pub from_name: String,
    pub lang: Option<String>,
}
