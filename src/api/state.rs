//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::application::AccountSettings;
use crate::infrastructure::{
    ItemRepository, ListRepository, Mailer, Repositories, SessionRepository, TokenRepository,
    UserRepository,
};

use super::templates::Templates;

#[derive(Clone)]
pub struct AppState {
    pub list_repository: Arc<dyn ListRepository>,
    pub item_repository: Arc<dyn ItemRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub token_repository: Arc<dyn TokenRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub templates: Templates,
    pub accounts: AccountSettings,
    /// Adds `Secure` to the session cookie.
    pub secure_cookies: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        repositories: Repositories,
        mailer: Arc<dyn Mailer>,
        templates: Templates,
        accounts: AccountSettings,
    ) -> Self {
        Self {
            list_repository: repositories.list_repository,
            item_repository: repositories.item_repository,
            user_repository: repositories.user_repository,
            token_repository: repositories.token_repository,
            session_repository: repositories.session_repository,
            mailer,
            templates,
            accounts,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub const fn with_secure_cookies(mut self, secure_cookies: bool) -> Self {
        self.secure_cookies = secure_cookies;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("templates", &self.templates)
            .field("accounts", &self.accounts)
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}
