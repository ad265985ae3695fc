use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use shared::protocol::ReservationRequest;
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

use crate::api::HttpBookingApi;

#[derive(Clone)]
pub(crate) struct BookingServerState {
    catalog: Option<Value>,
    booking_status: StatusCode,
    booking_body: String,
    bookings: Arc<Mutex<Vec<ReservationRequest>>>,
}

impl BookingServerState {
    pub(crate) fn new(catalog: Option<Value>) -> Self {
        Self {
            catalog,
            booking_status: StatusCode::CREATED,
            booking_body: String::new(),
            bookings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn rejecting(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.booking_status = status;
        self.booking_body = body.into();
        self
    }

    pub(crate) fn bookings(&self) -> Arc<Mutex<Vec<ReservationRequest>>> {
        self.bookings.clone()
    }
}

async fn handle_catalog(State(state): State<BookingServerState>) -> Response {
    match &state.catalog {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn handle_booking(
    State(state): State<BookingServerState>,
    Json(payload): Json<ReservationRequest>,
) -> Response {
    state.bookings.lock().await.push(payload);
    (state.booking_status, state.booking_body.clone()).into_response()
}

/// Serves `/api/cars` and `/api/bookings` on an ephemeral local port.
pub(crate) async fn spawn_booking_server(state: BookingServerState) -> HttpBookingApi {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new()
        .route("/api/cars", get(handle_catalog))
        .route("/api/bookings", post(handle_booking))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    HttpBookingApi::new(
        Url::parse(&format!("http://{addr}/api/cars")).expect("catalog url"),
        Url::parse(&format!("http://{addr}/api/bookings")).expect("booking url"),
    )
}

/// Endpoints on a port nothing listens on.
pub(crate) async fn unreachable_api() -> HttpBookingApi {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    HttpBookingApi::new(
        Url::parse(&format!("http://{addr}/api/cars")).expect("catalog url"),
        Url::parse(&format!("http://{addr}/api/bookings")).expect("booking url"),
    )
}
