use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_item, health_check, home_page, login, logout, my_lists, new_list, send_login_email,
    share_list, view_list,
};
use super::state::AppState;

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_page))
        // Lists
        .route("/lists/new", post(new_list))
        .route("/lists/{id}/", get(view_list).post(add_item))
        .route("/lists/{id}/share", post(share_list))
        .route("/lists/users/{email}/", get(my_lists))
        // Accounts
        .route("/accounts/send_login_email", post(send_login_email))
        .route("/accounts/login", get(login))
        .route("/accounts/logout", get(logout).post(logout))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
