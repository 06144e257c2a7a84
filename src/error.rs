//! Error model for the reservation core
//!
//! Every failure the core can surface is one of a small set of coded kinds,
//! so the dispatcher can map each to a transport status without inspecting
//! message strings. Store-layer errors (`sqlx::Error`) are logged and folded
//! into `StoreUnavailable`; the transaction they occurred in has already been
//! rolled back by the time the error leaves the core.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error codes exposed to callers.
///
/// Represented as `u16` on the wire for cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// Operation completed successfully
    Success = 0,
    /// Missing or malformed request field; rejected before any transaction
    InvalidInput = 1001,
    /// Booking referenced a nonexistent slot
    SlotNotFound = 2001,
    /// Requested party size exceeds the slot's current capacity
    InsufficientCapacity = 2002,
    /// Cancel or lookup referenced a nonexistent or already-deleted reservation
    ReservationNotFound = 3001,
    /// Connection or lock-wait failure; the transaction was rolled back
    StoreUnavailable = 9001,
    /// Unexpected internal error
    Internal = 9002,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidInput => "Invalid request",
            Self::SlotNotFound => "Slot not found",
            Self::InsufficientCapacity => "Not enough seats available",
            Self::ReservationNotFound => "Reservation not found",
            Self::StoreUnavailable => "Store temporarily unavailable",
            Self::Internal => "Internal server error",
        }
    }

    /// HTTP status the dispatcher maps this code to
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::SlotNotFound => StatusCode::NOT_FOUND,
            Self::InsufficientCapacity => StatusCode::CONFLICT,
            Self::ReservationNotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when converting an unknown `u16` to an [`ErrorCode`]
#[derive(Debug, Clone, Copy, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1001 => Ok(Self::InvalidInput),
            2001 => Ok(Self::SlotNotFound),
            2002 => Ok(Self::InsufficientCapacity),
            3001 => Ok(Self::ReservationNotFound),
            9001 => Ok(Self::StoreUnavailable),
            9002 => Ok(Self::Internal),
            other => Err(InvalidErrorCode(other)),
        }
    }
}

/// Application error with a structured code and optional details
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The code identifying the kind of failure
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional context (offending field, requested vs remaining, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create an error with the default message for the code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create an error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Validation failure, rejected before any transaction is opened
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidInput, msg)
    }

    pub fn slot_not_found() -> Self {
        Self::new(ErrorCode::SlotNotFound)
    }

    pub fn reservation_not_found(reservation_id: i64) -> Self {
        Self::new(ErrorCode::ReservationNotFound).with_detail("reservation_id", reservation_id)
    }

    pub fn insufficient_capacity(requested: i32) -> Self {
        Self::new(ErrorCode::InsufficientCapacity).with_detail("requested", requested)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Internal, msg)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "store error");
        AppError::new(ErrorCode::StoreUnavailable)
    }
}

/// Unified API response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Successful response wrapping a payload
    pub fn ok(data: T) -> Self {
        Self {
            code: ErrorCode::Success,
            message: "Success".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Error response carrying the failure's code and details
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        (status, Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

/// Result alias used throughout the core
pub type AppResult<T> = Result<T, AppError>;
