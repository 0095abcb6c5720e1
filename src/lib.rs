//! # superlists
//!
//! Multi-user to-do lists served over HTTP.
//!
//! Visitors start a list from its first item and keep appending items to it.
//! Logging in happens through a single-use link sent by email; lists created
//! while logged in belong to that user, can be shared with other registered
//! users by address, and show up on each user's "my lists" page.
//!
//! ## Layers
//!
//! - [`domain`]: entities, identifiers and validation rules
//! - [`application`]: forms and workflows over the repository ports
//! - [`infrastructure`]: configuration, storage backends and mail delivery
//! - [`api`]: axum routing, sessions and server-rendered pages

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
