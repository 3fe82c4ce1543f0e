//! Actions behind every page and API endpoint.
//!
//! Services are generic over the repository traits so they can run against
//! `DieselRepository` in production and mockall mocks in tests.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::domain::numbering::{MAX_NUMBER_ATTEMPTS, generate_document_number};
use crate::domain::status::StatusMachine;
use crate::forms::{FieldError, FormError};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod dashboard;
pub mod directory;
pub mod inventory;
pub mod materials;
pub mod production;
pub mod quality;
pub mod sales;

#[cfg(test)]
pub(crate) mod fixtures;

/// Errors returned by service actions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Structured per-field messages from form checks.
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    /// The submitted payload is malformed as a whole.
    #[error("{0}")]
    Form(String),
    #[error("not found")]
    NotFound,
    /// The requested status is not reachable from the current one.
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    /// The action lost a race or collided with existing data.
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Duplicate(message) => ServiceError::Conflict(message),
            RepositoryError::ConstraintViolation(message) => {
                log::warn!("Constraint violation: {message}");
                ServiceError::Form(
                    "a referenced record does not exist or a value is not allowed".to_string(),
                )
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        match err.field_errors() {
            Some(errors) => ServiceError::Validation(errors),
            None => ServiceError::Form(err.to_string()),
        }
    }
}

impl ServiceError {
    /// Message safe to show to the caller of `action` (e.g. "update stock").
    ///
    /// Internal errors are reduced to a generic sentence; details stay in the log.
    pub fn public_message(&self, action: &str) -> String {
        match self {
            ServiceError::Validation(_) => "Please correct the highlighted fields.".to_string(),
            ServiceError::Internal(_) => format!("Failed to {action}."),
            other => other.to_string(),
        }
    }
}

/// Refuse any move that is not in the status transition table.
pub(crate) fn check_transition<S>(from: S, to: S) -> ServiceResult<()>
where
    S: StatusMachine,
{
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// Run `insert` with a document number, regenerating it while it collides.
///
/// `number` is tried first. Only generated numbers are retried, up to
/// `MAX_NUMBER_ATTEMPTS` in total; a collision on a caller-supplied number
/// is reported at once.
pub(crate) fn insert_with_document_number<T, G, F>(
    prefix: &str,
    number: String,
    generated: bool,
    rng: &mut G,
    mut insert: F,
) -> ServiceResult<T>
where
    G: Rng + ?Sized,
    F: FnMut(&str) -> RepositoryResult<T>,
{
    let mut number = number;
    let mut attempt = 1;

    loop {
        match insert(&number) {
            Err(RepositoryError::Duplicate(_)) if generated && attempt < MAX_NUMBER_ATTEMPTS => {
                log::warn!("Document number {number} is taken, regenerating (attempt {attempt})");
                number = generate_document_number(prefix, rng);
                attempt += 1;
            }
            Err(RepositoryError::Duplicate(_)) => {
                return Err(ServiceError::Conflict(format!(
                    "number {number} is already taken"
                )));
            }
            result => return result.map_err(ServiceError::from),
        }
    }
}

/// Result of a mutating action together with the pages it made stale.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    /// Paths whose cached rendering must be dropped.
    pub revalidate: Vec<String>,
}

impl<T> Mutation<T> {
    pub fn new(value: T, revalidate: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            value,
            revalidate: revalidate.into_iter().map(Into::into).collect(),
        }
    }
}

/// Uniform JSON envelope returned by every API action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldError>>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            validation_errors: None,
        }
    }

    pub fn failure(err: &ServiceError, action: &str) -> Self {
        let validation_errors = match err {
            ServiceError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        Self {
            success: false,
            data: None,
            error: Some(err.public_message(action)),
            validation_errors,
        }
    }
}
