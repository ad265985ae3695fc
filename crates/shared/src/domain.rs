use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque vehicle identifier as handed out by the catalog service.
///
/// Catalog backends disagree on whether ids are strings or numbers, so both
/// are accepted on the way in; the id always goes back out as a string, byte
/// for byte as the catalog served it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVehicleId", into = "String")]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::EmptyVehicleId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<VehicleId> for String {
    fn from(value: VehicleId) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVehicleId {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<RawVehicleId> for VehicleId {
    type Error = DomainError;

    fn try_from(value: RawVehicleId) -> Result<Self, Self::Error> {
        match value {
            RawVehicleId::Text(text) => Self::new(text),
            RawVehicleId::Number(number) => Self::new(number.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("vehicle id must not be empty")]
    EmptyVehicleId,
    #[error("vehicle {id} has invalid daily price {price}")]
    InvalidPrice { id: String, price: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VehicleRecord")]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "pricePerDay")]
    pub price_per_day: f64,
}

impl Vehicle {
    /// Label shown in the vehicle selection list.
    pub fn option_label(&self) -> String {
        format!("{} - ${}/day", self.display_name, self.price_per_day)
    }
}

#[derive(Deserialize)]
struct VehicleRecord {
    id: VehicleId,
    #[serde(alias = "displayName")]
    name: String,
    #[serde(rename = "pricePerDay")]
    price_per_day: f64,
}

impl TryFrom<VehicleRecord> for Vehicle {
    type Error = DomainError;

    fn try_from(record: VehicleRecord) -> Result<Self, Self::Error> {
        if !record.price_per_day.is_finite() || record.price_per_day <= 0.0 {
            return Err(DomainError::InvalidPrice {
                id: record.id.0,
                price: record.price_per_day,
            });
        }
        Ok(Self {
            id: record.id,
            display_name: record.name,
            price_per_day: record.price_per_day,
        })
    }
}

/// Read-only vehicle list for one workflow session.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog(Arc<[Vehicle]>);

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Catalog {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self(vehicles.into())
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.0
    }

    pub fn find(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.0.iter().find(|vehicle| &vehicle.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-progress booking form data. May be incomplete at any point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub vehicle_id: Option<VehicleId>,
    pub pickup_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}

impl BookingDraft {
    pub fn seeded(vehicle_id: Option<VehicleId>) -> Self {
        Self {
            vehicle_id,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Vehicle(value) => self.vehicle_id = value,
            FieldUpdate::PickupDate(value) => self.pickup_date = value,
            FieldUpdate::ReturnDate(value) => self.return_date = value,
            FieldUpdate::ContactName(value) => self.contact_name = value,
            FieldUpdate::ContactEmail(value) => self.contact_email = value,
            FieldUpdate::ContactPhone(value) => self.contact_phone = value,
        }
    }
}

/// A single form edit. Each variant replaces exactly one draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Vehicle(Option<VehicleId>),
    PickupDate(Option<NaiveDate>),
    ReturnDate(Option<NaiveDate>),
    ContactName(String),
    ContactEmail(String),
    ContactPhone(String),
}

impl FieldUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Vehicle(_) => "vehicle_id",
            Self::PickupDate(_) => "pickup_date",
            Self::ReturnDate(_) => "return_date",
            Self::ContactName(_) => "contact_name",
            Self::ContactEmail(_) => "contact_email",
            Self::ContactPhone(_) => "contact_phone",
        }
    }
}
