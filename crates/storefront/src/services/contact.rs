//! Support requests.

use thiserror::Error;
use tracing::instrument;

use suds_core::validation::{require_length, require_present};
use suds_core::{Email, ValidationError};

use crate::db::{ContactStore, RepositoryError};
use crate::models::{ContactRequest, NewContactRequest};

/// Errors from submitting a support request.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Contact form input.
#[derive(Debug, Clone)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    fn validate(&self) -> Result<NewContactRequest, ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            require_present(field, value)?;
        }
        require_length("name", &self.name, 2..=50)?;
        require_length("email", &self.email, 2..=50)?;
        require_length("subject", &self.subject, 2..=50)?;
        require_length("message", &self.message, 2..=500)?;
        let email = Email::parse(&self.email)
            .map_err(|e| ValidationError::new("email", e.to_string()))?;

        Ok(NewContactRequest {
            name: self.name.trim().to_string(),
            email: email.into_inner(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Contact operations for one request.
pub struct ContactService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ContactService<'a, S>
where
    S: ContactStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a support request.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` before any write if a field is
    /// missing or out of range.
    #[instrument(skip_all)]
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactRequest, ContactError> {
        let request = form.validate()?;
        let stored = self.store.insert_contact_request(&request).await?;
        tracing::info!(contact_request_id = %stored.id, "Contact request received");
        Ok(stored)
    }
}
