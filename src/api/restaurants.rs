//! Restaurant listing passthrough

use axum::Json;
use axum::extract::State;

use crate::db::restaurants::{self, Restaurant};
use crate::error::ApiResponse;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/restaurants
pub async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Vec<Restaurant>> {
    let rows = restaurants::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(rows)))
}
