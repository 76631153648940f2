mod command;
mod entry;
mod ids;
mod session;
mod share;
mod user;

pub use self::command::{Attachment, Capabilities, Command, CommandKind};
pub use self::entry::{Entry, EntryKind, NewEntry, ROOT_PATH, child_path, listing_order};
pub use self::ids::{EntryId, GLOBAL_SHARE_TARGET, ShareId, UserId, generate_id, now_ts};
pub use self::session::{InputWait, Mode, Session};
pub use self::share::{NewShare, Share};
pub use self::user::{DEFAULT_LANG, PartialUser, User};
