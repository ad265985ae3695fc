//! Pure checks deciding whether a booking draft may be submitted.

use shared::{domain::BookingDraft, protocol::ReservationRequest};
use thiserror::Error;

/// Why a draft cannot be submitted. The display text is the message shown to
/// the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a vehicle.")]
    NoVehicleSelected,
    #[error("Please choose both a pickup and a return date.")]
    MissingDates,
    #[error("Please fill in your name, email and phone.")]
    MissingContact,
    #[error("The return date must be on or after the pickup date.")]
    InvalidDateRange,
}

pub type ValidationResult = Result<(), ValidationError>;

/// Checks the draft, reporting the first failing rule.
///
/// Rules run in a fixed order: vehicle, dates present, contact fields present,
/// date ordering. A same-day rental is valid.
pub fn validate(draft: &BookingDraft) -> ValidationResult {
    validated_request(draft).map(|_| ())
}

/// Same checks as [`validate`], yielding the request payload on success.
pub fn validated_request(draft: &BookingDraft) -> Result<ReservationRequest, ValidationError> {
    let Some(vehicle_id) = &draft.vehicle_id else {
        return Err(ValidationError::NoVehicleSelected);
    };

    let (Some(pickup_date), Some(return_date)) = (draft.pickup_date, draft.return_date) else {
        return Err(ValidationError::MissingDates);
    };

    let contact_fields = [
        &draft.contact_name,
        &draft.contact_email,
        &draft.contact_phone,
    ];
    if contact_fields.iter().any(|field| field.is_empty()) {
        return Err(ValidationError::MissingContact);
    }

    if pickup_date > return_date {
        return Err(ValidationError::InvalidDateRange);
    }

    Ok(ReservationRequest {
        vehicle_id: vehicle_id.clone(),
        pickup_date,
        return_date,
        contact_name: draft.contact_name.clone(),
        contact_email: draft.contact_email.clone(),
        contact_phone: draft.contact_phone.clone(),
    })
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
