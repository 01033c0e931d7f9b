use std::fmt::Display;

use thiserror::Error;

use crate::submission::form::{FormStep, FormTransitionError};

/// Message shown to a submitter whenever persistence fails, whatever the cause.
pub const SUBMISSION_RETRY_MESSAGE: &str = "Failed to submit agent. Please try again.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("rating must be between 1 and 5, got {value}")]
    InvalidRating { value: u8 },
    #[error("unsupported pricing type `{value}` (expected free|freemium|paid|subscription|contact)")]
    UnknownPricingType { value: String },
    #[error(transparent)]
    FormTransition(#[from] FormTransitionError),
    #[error("rating count is at its maximum and cannot take another review")]
    RatingCountOverflow,
}

/// A required field is missing or malformed. Raised before any persistence call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub step: Option<FormStep>,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn at_step(step: FormStep, field: &'static str, message: impl Into<String>) -> Self {
        Self { step: Some(step), field, message: message.into() }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self { step: None, field, message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("{operation} failed: {message}")]
    Backend { operation: &'static str, message: String },
    #[error("{entity} insert succeeded but returned no identifier")]
    MissingIdentifier { entity: &'static str },
}

impl PersistenceError {
    pub fn backend(operation: &'static str, error: impl Display) -> Self {
        Self::Backend { operation, message: error.to_string() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("{entity} `{id}` was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<SubmissionError> for ApplicationError {
    fn from(value: SubmissionError) -> Self {
        match value {
            SubmissionError::Validation(error) => Self::Validation(error),
            SubmissionError::Persistence(error) => Self::Persistence(error),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, step: Option<u8>, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Text that is safe to show to the caller. Validation messages pass through verbatim.
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } => message,
            Self::NotFound { .. } => "The requested listing was not found.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Validation(error) => Self::BadRequest {
                step: error.step.map(|step| step.number()),
                message: error.message,
                correlation_id,
            },
            ApplicationError::Domain(DomainError::FormTransition(
                FormTransitionError::StepIncomplete(error),
            )) => Self::BadRequest {
                step: error.step.map(|step| step.number()),
                message: error.message,
                correlation_id,
            },
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), step: None, correlation_id }
            }
            ApplicationError::NotFound { entity, id } => {
                Self::NotFound { message: format!("{entity} `{id}` was not found"), correlation_id }
            }
            ApplicationError::Persistence(error) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
