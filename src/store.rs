//! Collaborator interfaces the engine consumes, plus the bundled
//! in-memory implementation and its on-disk persistence.

use anyhow::Result;

use crate::model::{
    Entry, EntryId, EntryKind, NewEntry, NewShare, PartialUser, Session, Share, ShareId, User,
    UserId,
};

mod memory;
mod persist;

pub use self::memory::Db;
pub use self::persist::{Storage, write_atomic_overwrite};

pub trait EntryStore {
    fn get(&self, id: &EntryId) -> Result<Option<Entry>>;

    /// Children of `parent_id` in a stable, store-defined order.
    fn list(&self, parent_id: &EntryId) -> Result<Vec<Entry>>;

    fn list_of_kind(&self, parent_id: &EntryId, kind: EntryKind) -> Result<Vec<Entry>>;

    /// Case-insensitive name match over the subtree below `root_id` (exclusive).
    fn search(&self, query: &str, root_id: &EntryId) -> Result<Vec<Entry>>;

    fn create(&mut self, entry: NewEntry) -> Result<Entry>;

    /// Persists name/path/shared changes; descendant paths follow a renamed directory.
    fn update_meta(&mut self, entry: &Entry) -> Result<()>;

    /// Removes the entry, its subtree and every share that referenced them.
    fn delete(&mut self, entry: &Entry) -> Result<()>;

    fn name_available(&self, name: &str, parent_id: &EntryId) -> Result<bool>;

    fn find_root(&self, user_id: UserId) -> Result<Option<Entry>>;

    fn create_root(&mut self, user_id: UserId) -> Result<Entry>;
}

pub trait ShareStore {
    fn create_share(&mut self, share: NewShare) -> Result<Share>;

    fn delete_share(&mut self, id: &ShareId) -> Result<()>;

    fn list_for_entry(&self, entry_id: &EntryId) -> Result<Vec<Share>>;

    fn exists_for(&self, entry_id: &EntryId, target: UserId) -> Result<bool>;

    fn any_exist_for(&self, entry_id: &EntryId) -> Result<bool>;

    /// Global share addressed by its link token.
    fn get_by_token(&self, token: &str) -> Result<Option<Share>>;

    fn change_read_write(&mut self, id: &ShareId) -> Result<()>;
}

pub trait UserDirectory {
    /// Idempotent upsert keyed by the transport identity.
    fn resolve(&mut self, partial: &PartialUser) -> Result<User>;

    fn load_session(&self, user_id: UserId) -> Result<Option<Session>>;

    fn save_session(&mut self, session: &Session) -> Result<()>;
}

/// Everything a turn needs from persistence.
pub trait Store: EntryStore + ShareStore + UserDirectory {}

impl<T: EntryStore + ShareStore + UserDirectory> Store for T {}
