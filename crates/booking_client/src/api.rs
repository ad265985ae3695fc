//! Remote collaborators: the vehicle catalog and the reservation endpoint.

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Vehicle, error::ApiError, protocol::ReservationRequest};
use tracing::{debug, warn};
use url::Url;

use crate::error::{CatalogFetchError, SubmissionError};

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<Vehicle>, CatalogFetchError>;
}

#[async_trait]
pub trait ReservationSink: Send + Sync {
    /// Any acknowledgment from the service counts as success.
    async fn submit_reservation(&self, request: &ReservationRequest)
        -> Result<(), SubmissionError>;
}

/// JSON-over-HTTP client for both booking endpoints.
///
/// The underlying client carries no request timeout: a reservation that never
/// resolves leaves the workflow in its submitting sub-state.
pub struct HttpBookingApi {
    http: Client,
    catalog_url: Url,
    booking_url: Url,
}

impl HttpBookingApi {
    pub fn new(catalog_url: Url, booking_url: Url) -> Self {
        Self {
            http: Client::new(),
            catalog_url,
            booking_url,
        }
    }

    pub fn catalog_url(&self) -> &Url {
        &self.catalog_url
    }

    pub fn booking_url(&self) -> &Url {
        &self.booking_url
    }
}

#[async_trait]
impl CatalogSource for HttpBookingApi {
    async fn fetch_catalog(&self) -> Result<Vec<Vehicle>, CatalogFetchError> {
        let response = self
            .http
            .get(self.catalog_url.clone())
            .send()
            .await
            .map_err(CatalogFetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogFetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogFetchError::Transport)?;
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
        let served = entries.len();
        let vehicles = decode_vehicles(entries);
        debug!(
            served,
            vehicles = vehicles.len(),
            url = %self.catalog_url,
            "decoded catalog"
        );
        Ok(vehicles)
    }
}

#[async_trait]
impl ReservationSink for HttpBookingApi {
    async fn submit_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<(), SubmissionError> {
        let response = self
            .http
            .post(self.booking_url.clone())
            .json(request)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SubmissionError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body),
        })
    }
}

/// Keeps every well-formed entry; a bad entry costs only itself.
fn decode_vehicles(entries: Vec<serde_json::Value>) -> Vec<Vehicle> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Vehicle>(entry) {
            Ok(vehicle) => Some(vehicle),
            Err(err) => {
                warn!(error = %err, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.to_string(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
