//! Availability search endpoint

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::ApiResponse;
use crate::search::{self, SearchFilters, SlotView};
use crate::state::AppState;

use super::{ApiResult, parse_date, parse_time};

/// GET /api/availability query parameters; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub cuisine: Option<String>,
    pub restaurant_id: Option<i64>,
    pub restaurant_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub min_party_size: Option<i32>,
    #[serde(default)]
    pub partial_cuisine: bool,
}

impl SearchQuery {
    /// Translate transport strings into the core's typed filters
    pub(crate) fn into_filters(self) -> crate::error::AppResult<SearchFilters> {
        let date = self.date.as_deref().map(parse_date).transpose()?;
        let time = self.time.as_deref().map(parse_time).transpose()?;
        SearchFilters {
            cuisine: self.cuisine,
            restaurant_id: self.restaurant_id,
            restaurant_name: self.restaurant_name,
            date,
            time,
            min_party_size: self.min_party_size,
            partial_cuisine: self.partial_cuisine,
        }
        .normalize()
    }
}

/// GET /api/availability
pub async fn search_availability(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<SlotView>> {
    let filters = query.into_filters()?;
    let rows = search::search(&state.pool, &filters).await?;
    Ok(Json(ApiResponse::ok(rows)))
}
