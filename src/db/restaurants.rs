//! Restaurant catalog queries
//!
//! The catalog is maintained by an out-of-scope process; this module only
//! reads it for the listing passthrough and the availability join.

use sqlx::PgPool;

/// One restaurant catalog row
#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
    pub city: String,
    pub cuisine: String,
    pub price: Option<String>,
    pub cancellation_fee: Option<f64>,
}

/// List the full restaurant catalog
pub async fn list(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT restaurant_id, name, city, cuisine, price, cancellation_fee
        FROM restaurants
        ORDER BY restaurant_id
        "#,
    )
    .fetch_all(pool)
    .await
}
