//! Item forms.
//!
//! A form owns the raw submitted text. Validation trims it and applies the
//! emptiness rule, plus the per-list duplicate rule for existing lists. When
//! validation fails the raw text is echoed back through [`FormState`].

use serde::Serialize;

use super::error::ApplicationError;
use crate::domain::{Email, Item, ItemText, ItemValidationError, List, ListId, Timestamp};
use crate::infrastructure::{ItemRepository, ListRepository, RepositoryError};

/// What a template needs to render the item input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub text: String,
    pub error: Option<&'static str>,
}

// =============================================================================
// ItemForm
// =============================================================================

/// The home-page form. Only checks emptiness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    text: String,
}

impl ItemForm {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// # Errors
    ///
    /// Returns [`ItemValidationError::Empty`] for blank text.
    pub fn validate(&self) -> Result<ItemText, ItemValidationError> {
        ItemText::parse(&self.text)
    }

    /// Unbound state: empty input, no error.
    #[must_use]
    pub fn blank_state() -> FormState {
        FormState::default()
    }

    /// The submitted value together with the error it produced.
    #[must_use]
    pub fn error_state(&self, error: ItemValidationError) -> FormState {
        FormState {
            text: self.text.clone(),
            error: Some(error.message()),
        }
    }
}

// =============================================================================
// NewListForm
// =============================================================================

/// Creates a list from its first item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListForm {
    form: ItemForm,
}

impl NewListForm {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            form: ItemForm::new(text),
        }
    }

    #[must_use]
    pub const fn form(&self) -> &ItemForm {
        &self.form
    }

    /// Validates the text, then stores a new list owned by `owner` together
    /// with its first item.
    ///
    /// # Errors
    ///
    /// `ApplicationError::Validation` for blank text, leaving the store
    /// untouched; `ApplicationError::Repository` if the write fails.
    pub async fn save(
        &self,
        lists: &dyn ListRepository,
        owner: Option<Email>,
    ) -> Result<List, ApplicationError> {
        let text = self.form.validate()?;
        let list = List::new(ListId::generate(), owner, Timestamp::now());
        lists.create_with_first_item(&list, &text).await?;
        Ok(list)
    }
}

// =============================================================================
// ExistingListItemForm
// =============================================================================

/// Appends an item to a known list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingListItemForm {
    list_id: ListId,
    form: ItemForm,
}

impl ExistingListItemForm {
    #[must_use]
    pub fn new(list_id: ListId, text: impl Into<String>) -> Self {
        Self {
            list_id,
            form: ItemForm::new(text),
        }
    }

    #[must_use]
    pub const fn form(&self) -> &ItemForm {
        &self.form
    }

    /// # Errors
    ///
    /// `ApplicationError::Validation` with `Empty` or `Duplicate`.
    pub async fn validate(&self, items: &dyn ItemRepository) -> Result<ItemText, ApplicationError> {
        let text = self.form.validate()?;
        if items.exists_in_list(&self.list_id, &text).await? {
            return Err(ItemValidationError::Duplicate.into());
        }
        Ok(text)
    }

    /// Validates and appends the item.
    ///
    /// A duplicate that slips past validation is caught by the store and
    /// reported the same way.
    ///
    /// # Errors
    ///
    /// `ApplicationError::Validation` for rejected text,
    /// `ApplicationError::Repository` for storage failures.
    pub async fn save(&self, items: &dyn ItemRepository) -> Result<Item, ApplicationError> {
        let text = self.validate(items).await?;
        items
            .create(&self.list_id, &text)
            .await
            .map_err(|error| match error {
                RepositoryError::Conflict(_) => ItemValidationError::Duplicate.into(),
                other => other.into(),
            })
    }
}
