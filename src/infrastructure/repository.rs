//! Repository traits for domain entities.
//!
//! Every operation returns a boxed `'static` future so the traits stay
//! object-safe and can be shared as `Arc<dyn ...>` in the application state.
//! Implementations clone what they need before building the future.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{
    Email, Item, ItemText, List, ListId, LoginToken, Session, SessionKey, Timestamp, TokenId,
    User,
};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A referenced entity does not exist.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Repository Traits
// =============================================================================

/// Storage for lists and their sharing relation.
pub trait ListRepository: Send + Sync {
    fn find_by_id(&self, id: &ListId) -> RepositoryFuture<Option<List>>;

    /// Persists `list` together with its first item, atomically.
    ///
    /// Either both records exist afterwards or neither does.
    fn create_with_first_item(&self, list: &List, text: &ItemText) -> RepositoryFuture<Item>;

    /// Adds `email` to the list's sharees. Adding an existing sharee is a
    /// no-op. Fails with `NotFound` when the list does not exist.
    fn add_sharee(&self, id: &ListId, email: &Email) -> RepositoryFuture<()>;

    /// Lists owned by `owner`, oldest first.
    fn find_owned_by(&self, owner: &Email) -> RepositoryFuture<Vec<List>>;

    /// Lists shared with `email`, oldest first.
    fn find_shared_with(&self, email: &Email) -> RepositoryFuture<Vec<List>>;
}

/// Storage for list items.
pub trait ItemRepository: Send + Sync {
    /// Items of a list in creation order.
    fn find_by_list(&self, list_id: &ListId) -> RepositoryFuture<Vec<Item>>;

    fn exists_in_list(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<bool>;

    /// Appends an item. Fails with `Conflict` when the list already holds the
    /// same text and with `NotFound` when the list does not exist.
    fn create(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<Item>;
}

pub trait UserRepository: Send + Sync {
    fn find_by_email(&self, email: &Email) -> RepositoryFuture<Option<User>>;

    /// Returns the user with this email, registering it first if needed.
    fn get_or_create(&self, email: &Email) -> RepositoryFuture<User>;
}

pub trait TokenRepository: Send + Sync {
    fn save(&self, token: &LoginToken) -> RepositoryFuture<()>;

    /// Removes and returns the token. A second call with the same id yields
    /// `None`.
    fn take(&self, uid: &TokenId) -> RepositoryFuture<Option<LoginToken>>;
}

pub trait SessionRepository: Send + Sync {
    fn find(&self, key: &SessionKey) -> RepositoryFuture<Option<Session>>;

    /// Inserts or replaces the session stored under `session.key`.
    fn save(&self, session: &Session) -> RepositoryFuture<()>;

    fn delete(&self, key: &SessionKey) -> RepositoryFuture<()>;

    /// Removes every session created before `cutoff` and returns how many
    /// were removed.
    fn delete_created_before(&self, cutoff: &Timestamp) -> RepositoryFuture<u64>;
}
