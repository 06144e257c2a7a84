//! Availability query engine
//!
//! Read-only filtered search over slot inventory joined with the restaurant
//! catalog. Takes no lock: a returned slot is advisory, and a race against a
//! concurrent booking is resolved by the transaction manager, not here.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Optional-field filter set; every omitted field matches all values
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Cuisine match, case-insensitive; exact unless `partial_cuisine` is set
    pub cuisine: Option<String>,
    pub restaurant_id: Option<i64>,
    /// Restaurant name match, case-insensitive exact
    pub restaurant_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Only slots that could seat a party of this size
    pub min_party_size: Option<i32>,
    /// Substring cuisine match instead of exact
    pub partial_cuisine: bool,
}

impl SearchFilters {
    /// Reject malformed filters and drop blank strings so they become
    /// pass-through predicates rather than literal comparisons.
    pub fn normalize(mut self) -> AppResult<Self> {
        if let Some(n) = self.min_party_size {
            if n <= 0 {
                return Err(AppError::invalid_input("min_party_size must be positive")
                    .with_detail("min_party_size", n));
            }
        }
        self.cuisine = self.cuisine.filter(|s| !s.trim().is_empty());
        self.restaurant_name = self.restaurant_name.filter(|s| !s.trim().is_empty());
        Ok(self)
    }
}

/// Denormalized search result row: slot joined with restaurant metadata
#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct SlotView {
    pub availability_id: i64,
    pub restaurant_id: i64,
    pub restaurant: String,
    pub city: String,
    pub cuisine: String,
    pub price: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available_seats: Option<i32>,
    pub is_available: Option<bool>,
}

/// Escape `%`, `_` and `\` so user input never acts as a wildcard
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the cuisine filter as an ILIKE pattern.
///
/// Without wildcards an ILIKE pattern is a case-insensitive exact match;
/// partial mode wraps the escaped input in `%`.
fn cuisine_pattern(cuisine: &str, partial: bool) -> String {
    let escaped = escape_like(cuisine);
    if partial {
        format!("%{escaped}%")
    } else {
        escaped
    }
}

/// Execute the filtered availability search.
///
/// Absent filters are rendered as `$n IS NULL OR ...` pass-through
/// predicates in one static statement, never as literal NULL comparisons.
/// `min_party_size` means `available_seats >= n` on counter slots and plain
/// availability on binary slots.
pub async fn search(pool: &PgPool, filters: &SearchFilters) -> AppResult<Vec<SlotView>> {
    let cuisine = filters
        .cuisine
        .as_deref()
        .map(|c| cuisine_pattern(c, filters.partial_cuisine));
    let name = filters.restaurant_name.as_deref().map(escape_like);

    let rows: Vec<SlotView> = sqlx::query_as(
        r#"
        SELECT a.availability_id, r.restaurant_id, r.name AS restaurant, r.city,
               r.cuisine, r.price, a.date, a.time, a.available_seats, a.is_available
        FROM availability a
        JOIN restaurants r ON a.restaurant_id = r.restaurant_id
        WHERE ($1::TEXT IS NULL OR r.cuisine ILIKE $1)
          AND ($2::BIGINT IS NULL OR r.restaurant_id = $2)
          AND ($3::TEXT IS NULL OR r.name ILIKE $3)
          AND ($4::DATE IS NULL OR a.date = $4)
          AND ($5::TIME IS NULL OR a.time = $5)
          AND ($6::INT IS NULL OR COALESCE(a.available_seats >= $6, a.is_available))
        ORDER BY a.date, a.time, r.restaurant_id
        "#,
    )
    .bind(cuisine)
    .bind(filters.restaurant_id)
    .bind(name)
    .bind(filters.date)
    .bind(filters.time)
    .bind(filters.min_party_size)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
