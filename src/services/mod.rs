//! Service layer shared by the console routes.
//!
//! Services are plain async functions generic over the repository traits so
//! they can be exercised against doubles.

use thiserror::Error;

use crate::forms::{FieldErrors, FormError};
use crate::repository::errors::RepositoryError;

pub mod categories;
pub mod lists;
pub mod options;
pub mod users;
pub mod wallpapers;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    /// Input failed validation; the messages are rendered next to the fields.
    #[error("invalid form input")]
    Invalid(FieldErrors),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Invalid(FieldErrors::from(&err))
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Invalid(errors)
    }
}

impl ServiceError {
    /// Message suitable for a flash toast.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::NotFound => "Record not found".to_string(),
            ServiceError::Invalid(_) => "Please fix the highlighted fields".to_string(),
            ServiceError::TypeConstraint(message) => message.clone(),
            ServiceError::Repository(RepositoryError::Rejected(message)) => message.clone(),
            ServiceError::Repository(RepositoryError::Request { message, .. })
                if !message.is_empty() =>
            {
                message.clone()
            }
            ServiceError::Repository(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_not_found() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
    }

    #[test]
    fn rejection_message_is_shown_verbatim() {
        let err = ServiceError::from(RepositoryError::Rejected("Slug already exists".to_string()));
        assert_eq!(err.user_message(), "Slug already exists");
    }

    #[test]
    fn form_errors_become_field_errors() {
        let err = ServiceError::from(FormError::PasswordRequired);
        match err {
            ServiceError::Invalid(fields) => assert!(fields.get("password").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
