//! Request payloads and template contexts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{FormState, ListPage, ListSummary, UserLists};
use crate::domain::{Email, FlashMessage, ListId};

// =============================================================================
// Requests
// =============================================================================

/// `POST /lists/new` and `POST /lists/{id}/`. A missing field counts as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFormRequest {
    #[serde(default)]
    pub text: String,
}

/// `POST /lists/{id}/share`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareRequest {
    #[serde(default)]
    pub sharee: String,
}

/// `POST /accounts/send_login_email`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginEmailRequest {
    #[serde(default)]
    pub email: String,
}

/// `GET /accounts/login?token=...`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginQuery {
    pub token: Uuid,
}

// =============================================================================
// Template contexts
// =============================================================================

/// Header data shared by every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub user: Option<Email>,
    /// Percent-encoded link to the user's lists.
    pub my_lists_url: Option<String>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub page: PageContext,
    pub form: FormState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListDetail {
    pub id: ListId,
    pub url: String,
    pub owner: Option<Email>,
    pub shared_with: Vec<Email>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub page: PageContext,
    pub list: ListDetail,
    /// Item texts in display order.
    pub items: Vec<String>,
    pub form: FormState,
}

impl ListView {
    #[must_use]
    pub fn new(page: PageContext, list_page: ListPage, form: FormState) -> Self {
        let ListPage { list, items } = list_page;
        Self {
            page,
            list: ListDetail {
                url: list.absolute_url(),
                id: list.id,
                owner: list.owner,
                shared_with: list.shared_with,
            },
            items: items
                .into_iter()
                .map(|item| item.text.into_string())
                .collect(),
            form,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MyListsView {
    pub page: PageContext,
    pub owner: Email,
    pub owned: Vec<ListSummary>,
    pub shared: Vec<ListSummary>,
}

impl MyListsView {
    #[must_use]
    pub fn new(page: PageContext, user_lists: UserLists) -> Self {
        Self {
            page,
            owner: user_lists.user.email,
            owned: user_lists.owned,
            shared: user_lists.shared,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
