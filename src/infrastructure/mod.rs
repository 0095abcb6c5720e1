//! Infrastructure layer: storage backends, configuration and outgoing mail.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod mailer;
pub mod postgres;
pub mod repository;

pub use config::{AppConfig, ConfigError};
pub use factory::{FactoryError, Repositories, RepositoryConfig, RepositoryFactory, StorageMode};
pub use in_memory::{
    InMemoryDatabase, InMemoryItemRepository, InMemoryListRepository, InMemorySessionRepository,
    InMemoryTokenRepository, InMemoryUserRepository,
};
pub use mailer::{EmailMessage, LogMailer, Mailer, MailerError, OutboxMailer};
pub use postgres::{
    PostgresItemRepository, PostgresListRepository, PostgresSessionRepository,
    PostgresTokenRepository, PostgresUserRepository, ensure_schema,
};
pub use repository::{
    ItemRepository, ListRepository, RepositoryError, RepositoryFuture, SessionRepository,
    TokenRepository, UserRepository,
};
