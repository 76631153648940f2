use super::*;

pub(crate) struct AppState {
    pub(crate) storage: Storage,
    pub(crate) config: BotConfig,
    pub(crate) courier: Courier,

    // Hash of the webhook secret; `None` accepts every request.
    pub(crate) webhook_secret_hash: Option<String>,

    pub(crate) user_locks: UserLocks,
}

/// One lock per chat so a user's turns (and replies) stay in order.
/// Entries only live while some request for that user holds or waits on them.
#[derive(Default)]
pub(crate) struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub(crate) async fn acquire(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Gives back a handle from `acquire`; the entry is dropped once no other
    /// request refers to it. Clones are only made under the map lock, so the
    /// count cannot grow between the check and the removal.
    pub(crate) async fn release(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(&user_id)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            locks.remove(&user_id);
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
#[path = "../../tests/bin/tfs_server/types_tests.rs"]
mod tests;
