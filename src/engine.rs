//! Command dispatch and view composition: one inbound command in, one
//! reply out, session and store mutated in between.

use anyhow::Result;
use tracing::debug;

use crate::model::{Command, PartialUser, Session, User};
use crate::store::Store;
use crate::transport::Transport;

mod access;
mod compose;
mod dispatch;
mod markdown;
mod paging;
mod scope;
pub mod texts;

pub use self::access::{Access, access};
pub use self::compose::{Rendered, compose, render};
pub use self::dispatch::{Outcome, dispatch};
pub use self::markdown::{code_block, escape_code, escape_md};
pub use self::paging::{Page, pageable, pageable_count, paginate};
pub use self::scope::{Item, by_index, labels, listing, scope, search_results, shares};

pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Bot username, used to build public share links.
    pub bot_nick: String,
    pub page_size: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_nick: "tfs_bot".to_string(),
            page_size: PAGE_SIZE,
        }
    }
}

/// Collaborators for one turn, passed explicitly instead of looked up.
pub struct Ctx<'a> {
    pub store: &'a mut dyn Store,
    pub transport: &'a mut dyn Transport,
    pub config: &'a BotConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    None,
    SubjectShares,
    GearSubject,
    ViewDir,
    ViewFile,
    ViewLabel,
    ViewSearchedDir,
    ViewSearchedFile,
    ViewSearchedLabel,
    SearchResults,
}

/// Loads the user's session, creating the root directory on first contact.
pub fn open_session(store: &mut dyn Store, user: &User) -> Result<Session> {
    if let Some(session) = store.load_session(user.id)? {
        return Ok(session);
    }
    let root = match store.find_root(user.id)? {
        Some(root) => root,
        None => store.create_root(user.id)?,
    };
    let lang = user
        .lang
        .clone()
        .unwrap_or_else(|| crate::model::DEFAULT_LANG.to_string());
    debug!(user_id = user.id, root = %root.id, "new session");
    Ok(Session::new(user.id, root.id, &lang))
}

/// Runs one command to completion. Exactly one transport call is made,
/// and the session is saved only when everything before it succeeded.
pub fn run_turn(ctx: &mut Ctx<'_>, from: &PartialUser, command: &Command) -> Result<Session> {
    let user = ctx.store.resolve(from)?;
    let mut session = open_session(ctx.store, &user)?;

    let outcome = dispatch(ctx, &mut session, &user, command)?;
    if outcome.view != ViewKind::None {
        compose(ctx, &outcome, &session)?;
    }

    ctx.store.save_session(&session)?;
    Ok(session)
}
