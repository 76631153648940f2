use anyhow::Result;

use crate::model::{Entry, UserId};
use crate::store::Store;

/// What a user may do with an entry, from the closest owner or grant upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Access {
    None,
    ReadOnly,
    ReadWrite,
    Owner,
}

impl Access {
    pub fn can_read(self) -> bool {
        self != Access::None
    }

    pub fn can_write(self) -> bool {
        self >= Access::ReadWrite
    }

    pub fn is_owner(self) -> bool {
        self == Access::Owner
    }
}

pub fn access(store: &dyn Store, entry: &Entry, user_id: UserId) -> Result<Access> {
    let mut cur = Some(entry.clone());
    while let Some(e) = cur {
        if e.owner == user_id {
            return Ok(Access::Owner);
        }
        if let Some(grant) = store
            .list_for_entry(&e.id)?
            .into_iter()
            .find(|s| s.shared_to == user_id)
        {
            return Ok(if grant.read_write {
                Access::ReadWrite
            } else {
                Access::ReadOnly
            });
        }
        cur = match &e.parent_id {
            Some(pid) => store.get(pid)?,
            None => None,
        };
    }
    Ok(Access::None)
}
