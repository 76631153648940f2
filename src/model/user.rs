use serde::{Deserialize, Serialize};

use super::ids::UserId;

pub const DEFAULT_LANG: &str = "en";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,

    #[serde(default)]
    pub lang: Option<String>,

    pub created_at: String,
}

/// What the transport knows about a user before the directory resolves it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialUser {
    pub id: UserId,
    pub name: String,
    pub lang: Option<String>,
}
