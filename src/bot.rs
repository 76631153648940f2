//! Glue between the wire and the engine: one inbound update becomes one
//! committed storage transaction plus the replies it produced.

use anyhow::Result;
use tracing::debug;

use crate::engine::{BotConfig, Ctx, run_turn};
use crate::store::{Storage, UserDirectory};
use crate::transport::{Inbound, Outbox, Reply, to_command};

/// Result of a turn that was actually run.
#[derive(Clone, Debug, Default)]
pub struct Handled {
    /// Callback query to acknowledge, if the update was a button press.
    pub callback_id: Option<String>,
    pub replies: Vec<Reply>,
}

/// Runs the turn for `inbound`. Returns `Ok(None)` when the update does
/// not map to any command (e.g. a stray contact), in which case nothing
/// is mutated.
pub fn handle_inbound(
    storage: &Storage,
    config: &BotConfig,
    inbound: &Inbound,
) -> Result<Option<Handled>> {
    let wait = storage.read(|db| {
        Ok(db
            .load_session(inbound.user.id)?
            .map(|s| s.input_wait)
            .unwrap_or_default())
    })?;

    let Some(command) = to_command(inbound, wait) else {
        debug!(user_id = inbound.user.id, "update ignored");
        return Ok(None);
    };

    let replies = storage.transaction(|db| {
        let mut outbox = Outbox::new();
        let mut ctx = Ctx {
            store: db,
            transport: &mut outbox,
            config,
        };
        run_turn(&mut ctx, &inbound.user, &command)?;
        Ok(outbox.take())
    })?;

    Ok(Some(Handled {
        callback_id: inbound.callback_id.clone(),
        replies,
    }))
}
