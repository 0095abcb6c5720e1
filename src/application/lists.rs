//! Read and sharing workflows for lists.

use serde::Serialize;

use super::error::ApplicationError;
use crate::domain::{Email, Item, List, ListId, User};
use crate::infrastructure::{ItemRepository, ListRepository, UserRepository};

/// A list with its items in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub list: List,
    pub items: Vec<Item>,
}

/// How a share request was handled. Every variant ends in a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared(Email),
    UnknownUser(Email),
    InvalidEmail,
}

/// One row on the "my lists" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub id: ListId,
    pub url: String,
    /// Text of the first item.
    pub name: String,
    pub owner: Option<Email>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLists {
    pub user: User,
    pub owned: Vec<ListSummary>,
    pub shared: Vec<ListSummary>,
}

/// Loads a list and its items.
///
/// # Errors
///
/// `ApplicationError::NotFound` when no such list exists.
pub async fn load_list(
    lists: &dyn ListRepository,
    items: &dyn ItemRepository,
    id: &ListId,
) -> Result<ListPage, ApplicationError> {
    let list = find_list(lists, id).await?;
    let items = items.find_by_list(id).await?;
    Ok(ListPage { list, items })
}

/// Loads a list or fails with `NotFound`.
///
/// # Errors
///
/// `ApplicationError::NotFound` when no such list exists.
pub async fn find_list(lists: &dyn ListRepository, id: &ListId) -> Result<List, ApplicationError> {
    lists
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("list", id))
}

/// Shares list `id` with the registered user whose address is `sharee`.
///
/// Unknown users and malformed addresses are reported in the outcome, not as
/// errors; the list itself must exist.
///
/// # Errors
///
/// `ApplicationError::NotFound` for an unknown list.
pub async fn share_list(
    lists: &dyn ListRepository,
    users: &dyn UserRepository,
    id: &ListId,
    sharee: &str,
) -> Result<ShareOutcome, ApplicationError> {
    find_list(lists, id).await?;

    let Ok(email) = Email::parse(sharee) else {
        return Ok(ShareOutcome::InvalidEmail);
    };
    if users.find_by_email(&email).await?.is_none() {
        return Ok(ShareOutcome::UnknownUser(email));
    }

    lists.add_sharee(id, &email).await?;
    Ok(ShareOutcome::Shared(email))
}

/// Lists owned by and shared with the user at `email`.
///
/// # Errors
///
/// `ApplicationError::NotFound` when the address is malformed or belongs to
/// no registered user.
pub async fn lists_for_user(
    lists: &dyn ListRepository,
    items: &dyn ItemRepository,
    users: &dyn UserRepository,
    email: &str,
) -> Result<UserLists, ApplicationError> {
    let email = Email::parse(email).map_err(|_| ApplicationError::not_found("user", email))?;
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApplicationError::not_found("user", &email))?;

    let owned = summarize(items, lists.find_owned_by(&email).await?).await?;
    let shared = summarize(items, lists.find_shared_with(&email).await?).await?;

    Ok(UserLists {
        user,
        owned,
        shared,
    })
}

async fn summarize(
    items: &dyn ItemRepository,
    lists: Vec<List>,
) -> Result<Vec<ListSummary>, ApplicationError> {
    let mut summaries = Vec::with_capacity(lists.len());
    for list in lists {
        let name = items
            .find_by_list(&list.id)
            .await?
            .into_iter()
            .next()
            .map(|item| item.text.into_string())
            .unwrap_or_default();
        summaries.push(ListSummary {
            url: list.absolute_url(),
            id: list.id,
            name,
            owner: list.owner,
        });
    }
    Ok(summaries)
}
