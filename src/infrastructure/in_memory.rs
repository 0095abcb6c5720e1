//! In-memory repository implementations.
//!
//! All repositories created from one [`InMemoryDatabase`] share the same
//! tables behind a single `tokio::sync::RwLock`, so multi-table writes such
//! as "list plus first item" happen under one write guard.
//!
//! Suitable for development and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{
    Email, Item, ItemId, ItemText, List, ListId, LoginToken, Session, SessionKey, Timestamp,
    TokenId, User,
};
use crate::infrastructure::{
    ItemRepository, ListRepository, RepositoryError, RepositoryFuture, SessionRepository,
    TokenRepository, UserRepository,
};

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Email, User>,
    lists: BTreeMap<ListId, List>,
    /// Keyed by id, so iteration follows creation order.
    items: BTreeMap<ItemId, Item>,
    last_item_id: i64,
    tokens: HashMap<TokenId, LoginToken>,
    sessions: HashMap<SessionKey, Session>,
}

impl Tables {
    fn has_item(&self, list_id: &ListId, text: &ItemText) -> bool {
        self.items
            .values()
            .any(|item| item.list_id == *list_id && item.text == *text)
    }

    fn insert_item(&mut self, list_id: ListId, text: ItemText) -> Item {
        self.last_item_id += 1;
        let item = Item::new(ItemId::from_raw(self.last_item_id), list_id, text);
        self.items.insert(item.id, item.clone());
        item
    }

    fn lists_matching(&self, predicate: impl Fn(&List) -> bool) -> Vec<List> {
        let mut lists: Vec<List> = self
            .lists
            .values()
            .filter(|list| predicate(list))
            .cloned()
            .collect();
        lists.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        lists
    }
}

// =============================================================================
// In-Memory Database
// =============================================================================

/// Shared handle to the in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn list_repository(&self) -> InMemoryListRepository {
        InMemoryListRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    #[must_use]
    pub fn item_repository(&self) -> InMemoryItemRepository {
        InMemoryItemRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    #[must_use]
    pub fn user_repository(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    #[must_use]
    pub fn token_repository(&self) -> InMemoryTokenRepository {
        InMemoryTokenRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    #[must_use]
    pub fn session_repository(&self) -> InMemorySessionRepository {
        InMemorySessionRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub async fn list_count(&self) -> usize {
        self.tables.read().await.lists.len()
    }

    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn token_count(&self) -> usize {
        self.tables.read().await.tokens.len()
    }

    /// Every list, oldest first.
    pub async fn all_lists(&self) -> Vec<List> {
        self.tables.read().await.lists_matching(|_| true)
    }
}

// =============================================================================
// Lists
// =============================================================================

#[derive(Debug, Clone)]
pub struct InMemoryListRepository {
    tables: Arc<RwLock<Tables>>,
}

impl ListRepository for InMemoryListRepository {
    fn find_by_id(&self, id: &ListId) -> RepositoryFuture<Option<List>> {
        let tables = Arc::clone(&self.tables);
        let id = *id;
        Box::pin(async move { Ok(tables.read().await.lists.get(&id).cloned()) })
    }

    fn create_with_first_item(&self, list: &List, text: &ItemText) -> RepositoryFuture<Item> {
        let tables = Arc::clone(&self.tables);
        let list = list.clone();
        let text = text.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard.lists.contains_key(&list.id) {
                return Err(RepositoryError::Conflict(format!("list {}", list.id)));
            }
            let list_id = list.id;
            guard.lists.insert(list_id, list);
            Ok(guard.insert_item(list_id, text))
        })
    }

    fn add_sharee(&self, id: &ListId, email: &Email) -> RepositoryFuture<()> {
        let tables = Arc::clone(&self.tables);
        let id = *id;
        let email = email.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let list = guard
                .lists
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::NotFound(format!("list {id}")))?;
            list.share_with(email);
            Ok(())
        })
    }

    fn find_owned_by(&self, owner: &Email) -> RepositoryFuture<Vec<List>> {
        let tables = Arc::clone(&self.tables);
        let owner = owner.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .lists_matching(|list| list.is_owned_by(&owner)))
        })
    }

    fn find_shared_with(&self, email: &Email) -> RepositoryFuture<Vec<List>> {
        let tables = Arc::clone(&self.tables);
        let email = email.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .lists_matching(|list| list.is_shared_with(&email)))
        })
    }
}

// =============================================================================
// Items
// =============================================================================

#[derive(Debug, Clone)]
pub struct InMemoryItemRepository {
    tables: Arc<RwLock<Tables>>,
}

impl ItemRepository for InMemoryItemRepository {
    fn find_by_list(&self, list_id: &ListId) -> RepositoryFuture<Vec<Item>> {
        let tables = Arc::clone(&self.tables);
        let list_id = *list_id;
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .items
                .values()
                .filter(|item| item.list_id == list_id)
                .cloned()
                .collect())
        })
    }

    fn exists_in_list(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<bool> {
        let tables = Arc::clone(&self.tables);
        let list_id = *list_id;
        let text = text.clone();
        Box::pin(async move { Ok(tables.read().await.has_item(&list_id, &text)) })
    }

    fn create(&self, list_id: &ListId, text: &ItemText) -> RepositoryFuture<Item> {
        let tables = Arc::clone(&self.tables);
        let list_id = *list_id;
        let text = text.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if !guard.lists.contains_key(&list_id) {
                return Err(RepositoryError::NotFound(format!("list {list_id}")));
            }
            if guard.has_item(&list_id, &text) {
                return Err(RepositoryError::Conflict(format!(
                    "item '{text}' in list {list_id}"
                )));
            }
            Ok(guard.insert_item(list_id, text))
        })
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_email(&self, email: &Email) -> RepositoryFuture<Option<User>> {
        let tables = Arc::clone(&self.tables);
        let email = email.clone();
        Box::pin(async move { Ok(tables.read().await.users.get(&email).cloned()) })
    }

    fn get_or_create(&self, email: &Email) -> RepositoryFuture<User> {
        let tables = Arc::clone(&self.tables);
        let email = email.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let user = guard
                .users
                .entry(email.clone())
                .or_insert_with(|| User::new(email));
            Ok(user.clone())
        })
    }
}

// =============================================================================
// Login tokens
// =============================================================================

#[derive(Debug, Clone)]
pub struct InMemoryTokenRepository {
    tables: Arc<RwLock<Tables>>,
}

impl TokenRepository for InMemoryTokenRepository {
    fn save(&self, token: &LoginToken) -> RepositoryFuture<()> {
        let tables = Arc::clone(&self.tables);
        let token = token.clone();
        Box::pin(async move {
            tables.write().await.tokens.insert(token.uid, token);
            Ok(())
        })
    }

    fn take(&self, uid: &TokenId) -> RepositoryFuture<Option<LoginToken>> {
        let tables = Arc::clone(&self.tables);
        let uid = *uid;
        Box::pin(async move { Ok(tables.write().await.tokens.remove(&uid)) })
    }
}

// =============================================================================
// Sessions
// =============================================================================

#[derive(Debug, Clone)]
pub struct InMemorySessionRepository {
    tables: Arc<RwLock<Tables>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn find(&self, key: &SessionKey) -> RepositoryFuture<Option<Session>> {
        let tables = Arc::clone(&self.tables);
        let key = key.clone();
        Box::pin(async move { Ok(tables.read().await.sessions.get(&key).cloned()) })
    }

    fn save(&self, session: &Session) -> RepositoryFuture<()> {
        let tables = Arc::clone(&self.tables);
        let session = session.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .sessions
                .insert(session.key.clone(), session);
            Ok(())
        })
    }

    fn delete(&self, key: &SessionKey) -> RepositoryFuture<()> {
        let tables = Arc::clone(&self.tables);
        let key = key.clone();
        Box::pin(async move {
            tables.write().await.sessions.remove(&key);
            Ok(())
        })
    }

    fn delete_created_before(&self, cutoff: &Timestamp) -> RepositoryFuture<u64> {
        let tables = Arc::clone(&self.tables);
        let cutoff = *cutoff;
        Box::pin(async move {
            let mut guard = tables.write().await;
            let before = guard.sessions.len();
            guard.sessions.retain(|_, session| session.created_at >= cutoff);
            Ok(u64::try_from(before - guard.sessions.len()).unwrap_or(u64::MAX))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
