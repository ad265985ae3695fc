//! Failure types for the booking workflow and their user-facing projection.

use thiserror::Error;

use crate::validation::ValidationError;

pub const CATALOG_FETCH_FAILED_MESSAGE: &str = "Failed to fetch cars. Please try again.";
pub const SUBMISSION_FAILED_MESSAGE: &str = "Booking failed. Please try again.";

#[derive(Debug, Error)]
pub enum CatalogFetchError {
    #[error("catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("catalog service responded with status {0}")]
    Status(u16),
    #[error("catalog response is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remote booking failure. Both kinds surface to the user as the same message;
/// the split only matters for logs.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("reservation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("reservation rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Operation refused because of where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("booking already confirmed; start a new session to book again")]
    Confirmed,
    #[error("booking workflow has been torn down")]
    TornDown,
    #[error("a reservation submission is already in flight")]
    SubmissionInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation(ValidationError),
    Submission,
    Catalog,
}

/// Error content held in workflow state for the view to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowError {
    category: ErrorCategory,
    message: String,
}

impl WorkflowError {
    pub fn validation(cause: ValidationError) -> Self {
        Self {
            category: ErrorCategory::Validation(cause),
            message: cause.to_string(),
        }
    }

    pub fn submission() -> Self {
        Self {
            category: ErrorCategory::Submission,
            message: SUBMISSION_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn catalog() -> Self {
        Self {
            category: ErrorCategory::Catalog,
            message: CATALOG_FETCH_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
