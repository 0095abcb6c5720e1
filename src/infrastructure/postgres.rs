//! `PostgreSQL` repository implementations.
//!
//! Uses `sqlx` with a shared `PgPool`. The schema is created idempotently by
//! [`ensure_schema`] at start-up.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE users (email TEXT PRIMARY KEY);
//! CREATE TABLE lists (
//!     id UUID PRIMARY KEY,
//!     owner_email TEXT NULL REFERENCES users(email),
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE list_shares (
//!     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
//!     user_email TEXT NOT NULL REFERENCES users(email) ON DELETE CASCADE,
//!     PRIMARY KEY (list_id, user_email)
//! );
//! CREATE TABLE items (
//!     id BIGSERIAL PRIMARY KEY,
//!     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
//!     text TEXT NOT NULL,
//!     CONSTRAINT unique_list_item UNIQUE (list_id, text)
//! );
//! CREATE TABLE login_tokens (uid UUID PRIMARY KEY, email TEXT NOT NULL, created_at TIMESTAMPTZ NOT NULL);
//! CREATE TABLE sessions (
//!     session_key TEXT PRIMARY KEY,
//!     user_email TEXT NULL,
//!     messages JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{
    Email, FlashMessage, Item, ItemId, ItemText, List, ListId, LoginToken, Session, SessionKey,
    Timestamp, TokenId, User,
};
use crate::infrastructure::{
    ItemRepository, ListRepository, RepositoryError, RepositoryFuture, SessionRepository,
    TokenRepository, UserRepository,
};

// =============================================================================
// Schema
// =============================================================================

const SCHEMA_STATEMENTS: [&str; 8] = [
    "CREATE TABLE IF NOT EXISTS users (email TEXT PRIMARY KEY)",
    "CREATE TABLE IF NOT EXISTS lists (
        id UUID PRIMARY KEY,
        owner_email TEXT NULL REFERENCES users(email),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS list_shares (
        list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
        user_email TEXT NOT NULL REFERENCES users(email) ON DELETE CASCADE,
        PRIMARY KEY (list_id, user_email)
    )",
    "CREATE TABLE IF NOT EXISTS items (
        id BIGSERIAL PRIMARY KEY,
        list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        CONSTRAINT unique_list_item UNIQUE (list_id, text)
    )",
    "CREATE TABLE IF NOT EXISTS login_tokens (
        uid UUID PRIMARY KEY,
        email TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        session_key TEXT PRIMARY KEY,
        user_email TEXT NULL,
        messages JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_lists_owner_email ON lists(owner_email)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON sessions(created_at)",
];

/// Creates every table the repositories need, if missing.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(database_error)?;
    }
    Ok(())
}

// =============================================================================
// Error and row helpers
// =============================================================================

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

/// Maps constraint violations onto the repository error vocabulary.
fn write_error(error: sqlx::Error, subject: &str) -> RepositoryError {
    if let sqlx::Error::Database(database) = &error {
        if database.is_unique_violation() {
            return RepositoryError::Conflict(subject.to_string());
        }
        if database.is_foreign_key_violation() {
            return RepositoryError::NotFound(subject.to_string());
        }
    }
    database_error(error)
}

type ListRow = (Uuid, Option<String>, DateTime<Utc>, Vec<String>);

/// Lists with their sharees aggregated into one array column.
const SELECT_LISTS: &str = r#"SELECT l.id, l.owner_email, l.created_at,
        COALESCE(array_agg(s.user_email ORDER BY s.user_email COLLATE "C")
            FILTER (WHERE s.user_email IS NOT NULL), '{}') AS shared_with
    FROM lists l
    LEFT JOIN list_shares s ON s.list_id = l.id"#;

const GROUP_LISTS: &str = "GROUP BY l.id, l.owner_email, l.created_at ORDER BY l.created_at, l.id";

/// `List::shared_with` is kept in byte order, whatever the column collation.
fn list_from_row((id, owner_email, created_at, shared_with): ListRow) -> List {
    let mut shared_with: Vec<Email> = shared_with.into_iter().map(Email::from_stored).collect();
    shared_with.sort();
    shared_with.dedup();

    List {
        id: ListId::from_uuid(id),
        owner: owner_email.map(Email::from_stored),
        shared_with,
        created_at: Timestamp::from_datetime(created_at),
    }
}

// =============================================================================
// PostgreSQL List Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresListRepository {
    pool: PgPool,
}

impl PostgresListRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ListRepository for PostgresListRepository {
    fn find_by_id(&self, id: &ListId) -> RepositoryFuture<Option<List>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();

        Box::pin(async move {
            let query = format!("{SELECT_LISTS} WHERE l.id = $1 {GROUP_LISTS}");
            let row: Option<ListRow> = sqlx::query_as(&query)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;
            Ok(row.map(list_from_row))
        })
    }

    fn create_with_first_item(&self, list: &List, text: &ItemText) -> RepositoryFuture<Item> {
        let pool = self.pool.clone();
        let list = list.clone();
        let text = text.clone();

        Box::pin(async move {
            let mut transaction = pool.begin().await.map_err(database_error)?;

            sqlx::query("INSERT INTO lists (id, owner_email, created_at) VALUES ($1, $2, $3)")
                .bind(list.id.as_uuid())
                .bind(list.owner.as_ref().map(Email::as_str))
                .bind(list.created_at.as_datetime())
                .execute(&mut *transaction)
                .await
                .map_err(|error| write_error(error, &format!("list {}", list.id)))?;

            let (item_id,): (i64,) =
                sqlx::query_as("INSERT INTO items (list_id, text) VALUES ($1, $2) RETURNING id")
                    .bind(list.id.as_uuid())
                    .bind(text.as_str())
                    .fetch_one(&mut *transaction)
                    .await
                    .map_err(|error| write_error(error, &format!("item '{text}'")))?;

            transaction.commit().await.map_err(database_error)?;

            Ok(Item::new(ItemId::from_raw(item_id), list.id, text))
        })
    }

    fn add_sharee(&self, id: &ListId, email: &Email) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let id = *id;
        let email = email.clone();

        Box::pin(async move {
            sqlx::query(
                "INSERT INTO list_shares (list_id, user_email) VALUES ($1, $2)
                 ON CONFLICT (list_id, user_email) DO NOTHING",
            )
            .bind(id.as_uuid())
            .bind(email.as_str())
            .execute(&pool)
            .await
            .map_err(|error| write_error(error, &format!("list {id} or user {email}")))?;
            Ok(())
        })
    }

    fn find_owned_by(&self, owner: &Email) -> RepositoryFuture<Vec<List>> {
        let pool = self.pool.clone();
        let owner = owner.clone();

        Box::pin(async move {
            let query = format!("{SELECT_LISTS} WHERE l.owner_email = $1 {GROUP_LISTS}");
            let rows: Vec<ListRow> = sqlx::query_as(&query)
                .bind(owner.as_str())
                .fetch_all(&pool)
                .await
                .map_err(database_error)?;
            Ok(rows.into_iter().map(list_from_row).collect())
        })
    }

    fn find_shared_with(&self, email: &Email) -> RepositoryFuture<Vec<List>> {
        let pool = self.pool.clone();
        let email = email.clone();

        Box::pin(async move {
            let query = format!(
                "{SELECT_LISTS} WHERE l.id IN (SELECT list_id FROM list_shares WHERE user_email = $1) {GROUP_LISTS}"
            );
            let rows: Vec<ListRow> = sqlx::query_as(&query)
                .bind(email.as_str())
                .fetch_all(&pool)
                .await
                .map_err(database_error)?;
            Ok(rows.into_iter().map(list_from_row).collect())
        })
    }
}

// =============================================================================
// PostgreSQL Item Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ItemRepository for PostgresItemRepository {
    fn find_by_list(&self, list_id: &ListId) -> RepositoryFuture<Vec<Item>> {
        let pool = self.pool.clone();
        let list_id = *list_id;

        Box::pin(async move {
            let rows: Vec<(i64, String)> =
                sqlx::query_as("SELECT id, text FROM items WHERE list_id = $1 ORDER BY id")
                    .bind(list_id.as_uuid())
                    .fetch_all(&pool)
                    .await
                    .map_err(database_error)?;

            Ok(rows
                .into_iter()
                .map(|(id, text)| {
                    Item::new(ItemId::from_raw(id), list_id, ItemText::from_stored(text))
                })
                .collect())
        })
    }

    fn exists_in_list(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let list_id = *list_id;
        let text = text.clone();

        Box::pin(async move {
            let (exists,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (SELECT 1 FROM items WHERE list_id = $1 AND text = $2)",
            )
            .bind(list_id.as_uuid())
            .bind(text.as_str())
            .fetch_one(&pool)
            .await
            .map_err(database_error)?;
            Ok(exists)
        })
    }

    fn create(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<Item> {
        let pool = self.pool.clone();
        let list_id = *list_id;
        let text = text.clone();

        Box::pin(async move {
            let (item_id,): (i64,) =
                sqlx::query_as("INSERT INTO items (list_id, text) VALUES ($1, $2) RETURNING id")
                    .bind(list_id.as_uuid())
                    .bind(text.as_str())
                    .fetch_one(&pool)
                    .await
                    .map_err(|error| {
                        write_error(error, &format!("item '{text}' in list {list_id}"))
                    })?;

            Ok(Item::new(ItemId::from_raw(item_id), list_id, text))
        })
    }
}

// =============================================================================
// PostgreSQL User Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    fn find_by_email(&self, email: &Email) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        let email = email.clone();

        Box::pin(async move {
            let row: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;
            Ok(row.map(|(stored,)| User::new(Email::from_stored(stored))))
        })
    }

    fn get_or_create(&self, email: &Email) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        let email = email.clone();

        Box::pin(async move {
            sqlx::query("INSERT INTO users (email) VALUES ($1) ON CONFLICT (email) DO NOTHING")
                .bind(email.as_str())
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(User::new(email))
        })
    }
}

// =============================================================================
// PostgreSQL Token Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TokenRepository for PostgresTokenRepository {
    fn save(&self, token: &LoginToken) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let token = token.clone();

        Box::pin(async move {
            sqlx::query("INSERT INTO login_tokens (uid, email, created_at) VALUES ($1, $2, $3)")
                .bind(token.uid.as_uuid())
                .bind(token.email.as_str())
                .bind(token.created_at.as_datetime())
                .execute(&pool)
                .await
                .map_err(|error| write_error(error, &format!("token {}", token.uid)))?;
            Ok(())
        })
    }

    fn take(&self, uid: &TokenId) -> RepositoryFuture<Option<LoginToken>> {
        let pool = self.pool.clone();
        let uid = *uid;

        Box::pin(async move {
            let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
                "DELETE FROM login_tokens WHERE uid = $1 RETURNING email, created_at",
            )
            .bind(uid.as_uuid())
            .fetch_optional(&pool)
            .await
            .map_err(database_error)?;

            Ok(row.map(|(email, created_at)| {
                LoginToken::new(
                    uid,
                    Email::from_stored(email),
                    Timestamp::from_datetime(created_at),
                )
            }))
        })
    }
}

// =============================================================================
// PostgreSQL Session Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PostgresSessionRepository {
    fn find(&self, key: &SessionKey) -> RepositoryFuture<Option<Session>> {
        let pool = self.pool.clone();
        let key = key.clone();

        Box::pin(async move {
            let row: Option<(Option<String>, Json<Vec<FlashMessage>>, DateTime<Utc>)> =
                sqlx::query_as(
                    "SELECT user_email, messages, created_at FROM sessions WHERE session_key = $1",
                )
                .bind(key.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;

            Ok(row.map(|(user_email, Json(messages), created_at)| Session {
                key,
                user: user_email.map(Email::from_stored),
                messages,
                created_at: Timestamp::from_datetime(created_at),
            }))
        })
    }

    fn save(&self, session: &Session) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let session = session.clone();

        Box::pin(async move {
            let messages = serde_json::to_value(&session.messages)
                .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;

            sqlx::query(
                "INSERT INTO sessions (session_key, user_email, messages, created_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (session_key) DO UPDATE
                 SET user_email = EXCLUDED.user_email, messages = EXCLUDED.messages",
            )
            .bind(session.key.as_str())
            .bind(session.user.as_ref().map(Email::as_str))
            .bind(messages)
            .bind(session.created_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(database_error)?;
            Ok(())
        })
    }

    fn delete(&self, key: &SessionKey) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let key = key.clone();

        Box::pin(async move {
            sqlx::query("DELETE FROM sessions WHERE session_key = $1")
                .bind(key.as_str())
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(())
        })
    }

    fn delete_created_before(&self, cutoff: &Timestamp) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let cutoff = *cutoff;

        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE created_at < $1")
                .bind(cutoff.as_datetime())
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(result.rows_affected())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_list_from_row_maps_columns() {
        let id = Uuid::now_v7();
        let created_at = Utc::now();
        let row: ListRow = (
            id,
            Some("owner@example.com".to_string()),
            created_at,
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
        );

        let list = list_from_row(row);

        assert_eq!(list.id, ListId::from_uuid(id));
        assert_eq!(list.owner, Some(Email::from_stored("owner@example.com")));
        assert_eq!(list.shared_with.len(), 2);
        assert_eq!(list.created_at, Timestamp::from_datetime(created_at));
    }

    #[rstest]
    fn test_list_from_row_sorts_sharees_bytewise() {
        let row: ListRow = (
            Uuid::now_v7(),
            None,
            Utc::now(),
            vec![
                "bob@example.com".to_string(),
                "Zed@example.com".to_string(),
                "alice@example.com".to_string(),
                "bob@example.com".to_string(),
            ],
        );

        let list = list_from_row(row);

        assert_eq!(
            list.shared_with,
            vec![
                Email::from_stored("Zed@example.com"),
                Email::from_stored("alice@example.com"),
                Email::from_stored("bob@example.com"),
            ]
        );
        assert!(list.is_shared_with(&Email::from_stored("alice@example.com")));
        assert!(list.is_shared_with(&Email::from_stored("Zed@example.com")));
    }

    #[rstest]
    fn test_sharee_aggregation_uses_byte_collation() {
        assert!(SELECT_LISTS.contains(r#"ORDER BY s.user_email COLLATE "C""#));
    }

    #[rstest]
    fn test_list_from_row_without_owner() {
        let list = list_from_row((Uuid::now_v7(), None, Utc::now(), Vec::new()));
        assert!(list.owner.is_none());
        assert!(list.shared_with.is_empty());
    }

    #[rstest]
    fn test_write_error_passes_through_non_constraint_errors() {
        let error = write_error(sqlx::Error::RowNotFound, "list");
        assert!(matches!(error, RepositoryError::DatabaseError(_)));
    }

    #[rstest]
    fn test_schema_creates_every_table() {
        for table in ["users", "lists", "list_shares", "items", "login_tokens", "sessions"] {
            let prefix = format!("CREATE TABLE IF NOT EXISTS {table} ");
            assert!(
                SCHEMA_STATEMENTS.iter().any(|statement| statement.starts_with(&prefix)),
                "missing table {table}"
            );
        }
    }
}
