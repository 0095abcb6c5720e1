//! List pages: home, creation, viewing, appending, sharing and my-lists.

use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::api::dto::{HomeView, ItemFormRequest, ListView, MyListsView, ShareRequest};
use crate::api::error::PageError;
use crate::api::session::{CurrentSession, page_context};
use crate::api::state::AppState;
use crate::application::{
    self, ApplicationError, ExistingListItemForm, ItemForm, NewListForm, ShareOutcome,
};
use crate::domain::ListId;

fn parse_list_id(raw: &str) -> Result<ListId, PageError> {
    ListId::parse(raw).map_err(|_| PageError::not_found("No such list"))
}

// =============================================================================
// GET /
// =============================================================================

/// Home page with an empty item form.
///
/// # Errors
///
/// Returns a `PageError` if the session or the template fails.
pub async fn home_page(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Html<String>, PageError> {
    let page = page_context(&state, session).await?;
    let view = HomeView {
        page,
        form: ItemForm::blank_state(),
    };
    Ok(state.templates.render("home.html", &view)?)
}

// =============================================================================
// POST /lists/new
// =============================================================================

/// Creates a list from its first item and redirects to it.
///
/// Blank text re-renders the home page with the validation error.
///
/// # Errors
///
/// Returns a `PageError` for storage or template failures.
pub async fn new_list(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(request): Form<ItemFormRequest>,
) -> Result<Response, PageError> {
    let form = NewListForm::new(request.text);
    let owner = current.user().cloned();

    match form.save(state.list_repository.as_ref(), owner).await {
        Ok(list) => {
            tracing::info!(list_id = %list.id, owner = ?list.owner, "List created");
            Ok(Redirect::to(&list.absolute_url()).into_response())
        }
        Err(ApplicationError::Validation(error)) => {
            let page = page_context(&state, current.0).await?;
            let view = HomeView {
                page,
                form: form.form().error_state(error),
            };
            Ok(state.templates.render("home.html", &view)?.into_response())
        }
        Err(error) => Err(error.into()),
    }
}

// =============================================================================
// GET|POST /lists/{id}/
// =============================================================================

/// Shows a list, its sharees and the form for the next item.
///
/// # Errors
///
/// `404` for a malformed or unknown id.
pub async fn view_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentSession(session): CurrentSession,
) -> Result<Html<String>, PageError> {
    let id = parse_list_id(&id)?;
    let list_page = application::load_list(
        state.list_repository.as_ref(),
        state.item_repository.as_ref(),
        &id,
    )
    .await?;

    let page = page_context(&state, session).await?;
    let view = ListView::new(page, list_page, ItemForm::blank_state());
    Ok(state.templates.render("list.html", &view)?)
}

/// Appends an item and redirects back to the list.
///
/// Blank or duplicate text re-renders the list with the validation error.
///
/// # Errors
///
/// `404` for a malformed or unknown id.
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentSession(session): CurrentSession,
    Form(request): Form<ItemFormRequest>,
) -> Result<Response, PageError> {
    let id = parse_list_id(&id)?;
    application::find_list(state.list_repository.as_ref(), &id).await?;

    let form = ExistingListItemForm::new(id, request.text);
    match form.save(state.item_repository.as_ref()).await {
        Ok(item) => {
            tracing::debug!(list_id = %id, item_id = item.id.as_i64(), "Item added");
            Ok(Redirect::to(&id.url()).into_response())
        }
        Err(ApplicationError::Validation(error)) => {
            let list_page = application::load_list(
                state.list_repository.as_ref(),
                state.item_repository.as_ref(),
                &id,
            )
            .await?;
            let page = page_context(&state, session).await?;
            let view = ListView::new(page, list_page, form.form().error_state(error));
            Ok(state.templates.render("list.html", &view)?.into_response())
        }
        Err(error) => Err(error.into()),
    }
}

// =============================================================================
// POST /lists/{id}/share
// =============================================================================

/// Shares a list with a registered user, then returns to the list.
///
/// # Errors
///
/// `404` for a malformed or unknown id.
pub async fn share_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(request): Form<ShareRequest>,
) -> Result<Redirect, PageError> {
    let id = parse_list_id(&id)?;
    let outcome = application::share_list(
        state.list_repository.as_ref(),
        state.user_repository.as_ref(),
        &id,
        &request.sharee,
    )
    .await?;

    match outcome {
        ShareOutcome::Shared(email) => tracing::info!(list_id = %id, %email, "List shared"),
        ShareOutcome::UnknownUser(email) => {
            tracing::debug!(list_id = %id, %email, "Share ignored for unknown user");
        }
        ShareOutcome::InvalidEmail => {
            tracing::debug!(list_id = %id, "Share ignored for malformed address");
        }
    }

    Ok(Redirect::to(&id.url()))
}

// =============================================================================
// GET /lists/users/{email}/
// =============================================================================

/// Lists owned by and shared with one user.
///
/// # Errors
///
/// `404` for an address that belongs to no user.
pub async fn my_lists(
    State(state): State<AppState>,
    Path(email): Path<String>,
    CurrentSession(session): CurrentSession,
) -> Result<Html<String>, PageError> {
    let user_lists = application::lists_for_user(
        state.list_repository.as_ref(),
        state.item_repository.as_ref(),
        state.user_repository.as_ref(),
        &email,
    )
    .await?;

    let page = page_context(&state, session).await?;
    let view = MyListsView::new(page, user_lists);
    Ok(state.templates.render("my_lists.html", &view)?)
}
