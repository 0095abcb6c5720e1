//! Application workflows.
//!
//! Each workflow takes the repositories it needs as trait objects, so the
//! same code runs against the in-memory and `PostgreSQL` backends.

pub mod accounts;
pub mod error;
pub mod forms;
pub mod lists;
pub mod sessions;

pub use accounts::{
    AccountSettings, CHECK_EMAIL_MESSAGE, EMAIL_FAILED_MESSAGE, INVALID_EMAIL_MESSAGE,
    LOGIN_EMAIL_SUBJECT, authenticate, send_login_email,
};
pub use error::ApplicationError;
pub use forms::{ExistingListItemForm, FormState, ItemForm, NewListForm};
pub use lists::{
    ListPage, ListSummary, ShareOutcome, UserLists, find_list, lists_for_user, load_list,
    share_list,
};
pub use sessions::{load_session, open_session};
