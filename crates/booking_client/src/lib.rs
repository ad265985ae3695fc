//! Client-side vehicle booking workflow: catalog fetch, draft editing,
//! validation and reservation submission.

pub mod api;
pub mod error;
pub mod validation;
pub mod workflow;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use api::{CatalogSource, HttpBookingApi, ReservationSink};
pub use error::{
    CatalogFetchError, ErrorCategory, SessionError, SubmissionError, WorkflowError,
    CATALOG_FETCH_FAILED_MESSAGE, SUBMISSION_FAILED_MESSAGE,
};
pub use validation::{validate, validated_request, ValidationError, ValidationResult};
pub use workflow::{
    BookingWorkflow, CatalogOutcome, SubmitOutcome, WorkflowEvent, WorkflowSnapshot,
    WorkflowState,
};
