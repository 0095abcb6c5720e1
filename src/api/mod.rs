//! HTTP layer: routing, handlers, sessions and page rendering.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

pub use error::PageError;
pub use routes::create_router;
pub use server::serve;
pub use session::{CurrentSession, SESSION_COOKIE_NAME};
pub use state::AppState;
pub use templates::Templates;
