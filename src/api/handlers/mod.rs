//! HTTP handlers.

pub mod accounts;
pub mod health;
pub mod lists;

pub use accounts::{login, logout, send_login_email};
pub use health::health_check;
pub use lists::{add_item, home_page, my_lists, new_list, share_list, view_list};
