use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::VehicleId;

/// Body of the reservation write endpoint.
///
/// Only ever built from a draft that passed validation, so every field is
/// present. Dates go over the wire as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    #[serde(rename = "carId")]
    pub vehicle_id: VehicleId,
    #[serde(rename = "pickupDate")]
    pub pickup_date: NaiveDate,
    #[serde(rename = "returnDate")]
    pub return_date: NaiveDate,
    #[serde(rename = "name")]
    pub contact_name: String,
    #[serde(rename = "email")]
    pub contact_email: String,
    #[serde(rename = "phone")]
    pub contact_phone: String,
}

impl ReservationRequest {
    /// Number of rental days, counting a same-day return as one day.
    pub fn rental_days(&self) -> i64 {
        (self.return_date - self.pickup_date).num_days().max(0) + 1
    }
}
