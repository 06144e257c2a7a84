//! API routes for mesa
//!
//! Thin dispatcher: parses transport input into the core's typed requests,
//! calls the query engine or the transaction manager, and serializes
//! `ApiResponse` envelopes. No transport types leak below this layer.

pub mod availability;
pub mod health;
pub mod reservations;
pub mod restaurants;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime};
use tower_http::trace::TraceLayer;

use crate::error::{ApiResponse, AppError, AppResult};
use crate::state::AppState;

/// Handler result: success envelope or a coded error
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/restaurants", get(restaurants::list_restaurants))
        .route("/api/availability", get(availability::search_availability))
        .route("/api/reservations", post(reservations::create_reservation))
        .route(
            "/api/reservations/{id}",
            delete(reservations::cancel_reservation),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse an ISO date (`2025-09-24`), rejecting malformed input before any
/// transaction is opened
pub(crate) fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    raw.parse().map_err(|_| {
        AppError::invalid_input("date must be formatted as YYYY-MM-DD").with_detail("date", raw)
    })
}

/// Parse a time of day (`19:00:00` or `19:00`)
pub(crate) fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| {
            AppError::invalid_input("time must be formatted as HH:MM or HH:MM:SS")
                .with_detail("time", raw)
        })
}
