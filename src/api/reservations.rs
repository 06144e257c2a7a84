//! Reservation booking and cancellation endpoints

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::booking::{self, BookingRequest};
use crate::db::reservations::ReservationRecord;
use crate::error::ApiResponse;
use crate::state::AppState;

use super::{ApiResult, parse_date, parse_time};

/// POST /api/reservations request body.
///
/// The slot is identified by `availability_id` or by `date` + `time`
/// together with `restaurant_id`.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub restaurant_id: i64,
    pub availability_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guest_name: String,
    pub party_size: i32,
}

impl CreateReservationRequest {
    fn into_booking(self) -> crate::error::AppResult<BookingRequest> {
        let date = self.date.as_deref().map(parse_date).transpose()?;
        let time = self.time.as_deref().map(parse_time).transpose()?;
        Ok(BookingRequest {
            restaurant_id: self.restaurant_id,
            availability_id: self.availability_id,
            date,
            time,
            guest_name: self.guest_name,
            party_size: self.party_size,
        })
    }
}

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(payload): Json<CreateReservationRequest>,
) -> ApiResult<ReservationRecord> {
    let request = payload.into_booking()?;
    let record = booking::book(&state.pool, &request).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /api/reservations/{id}
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> ApiResult<Value> {
    booking::cancel(&state.pool, reservation_id).await?;
    Ok(Json(ApiResponse::ok(json!({
        "reservation_id": reservation_id,
        "cancelled": true,
    }))))
}
