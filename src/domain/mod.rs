//! Domain layer for the to-do list application.
//!
//! Value objects and entities only. Nothing in here performs I/O; identifier
//! generation and clock reads are the only impure helpers, and callers decide
//! when to invoke them.

pub mod email;
pub mod item;
pub mod list;
pub mod session;
pub mod timestamp;
pub mod token;
pub mod user;

pub use email::{Email, EmailError};
pub use item::{DUPLICATE_ITEM_ERROR, EMPTY_ITEM_ERROR, Item, ItemId, ItemText, ItemValidationError};
pub use list::{List, ListId};
pub use session::{FlashMessage, MessageLevel, Session, SessionKey};
pub use timestamp::Timestamp;
pub use token::{LoginToken, TokenId};
pub use user::User;
