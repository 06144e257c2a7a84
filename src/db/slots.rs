//! Slot inventory access
//!
//! A slot is the bookable unit (restaurant, date, time) with finite capacity.
//! Locking reads use `FOR UPDATE` so concurrent bookings and cancellations
//! against the same slot serialize for the duration of one transaction.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgConnection;

use crate::capacity::CapacityPolicy;
use crate::error::AppError;

/// How the caller identifies the slot to book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSelector {
    /// Explicit slot row id
    Availability(i64),
    /// Composite natural key (restaurant_id is passed alongside)
    DateTime { date: NaiveDate, time: NaiveTime },
}

/// One slot inventory row
#[derive(Debug, sqlx::FromRow)]
pub struct SlotRow {
    pub availability_id: i64,
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available_seats: Option<i32>,
    pub is_available: Option<bool>,
}

impl SlotRow {
    /// Decode this row's capacity columns into its policy.
    ///
    /// The schema CHECK guarantees exactly one column is set; a row that
    /// violates it is an integrity fault, not a caller error.
    pub fn policy(&self) -> Result<CapacityPolicy, AppError> {
        CapacityPolicy::from_columns(self.available_seats, self.is_available).ok_or_else(|| {
            AppError::internal(format!(
                "slot {} has inconsistent capacity columns",
                self.availability_id
            ))
        })
    }
}

/// Lock the target slot row for the rest of the transaction.
///
/// Lock acquisition and the capacity read are the same statement, so no
/// concurrent transaction can act on a stale read of this slot.
pub async fn lock(
    conn: &mut PgConnection,
    restaurant_id: i64,
    selector: &SlotSelector,
) -> Result<Option<SlotRow>, sqlx::Error> {
    match selector {
        SlotSelector::Availability(availability_id) => {
            sqlx::query_as(
                r#"
                SELECT availability_id, restaurant_id, date, time, available_seats, is_available
                FROM availability
                WHERE availability_id = $1 AND restaurant_id = $2
                FOR UPDATE
                "#,
            )
            .bind(availability_id)
            .bind(restaurant_id)
            .fetch_optional(&mut *conn)
            .await
        }
        SlotSelector::DateTime { date, time } => {
            sqlx::query_as(
                r#"
                SELECT availability_id, restaurant_id, date, time, available_seats, is_available
                FROM availability
                WHERE restaurant_id = $1 AND date = $2 AND time = $3
                FOR UPDATE
                "#,
            )
            .bind(restaurant_id)
            .bind(date)
            .bind(time)
            .fetch_optional(&mut *conn)
            .await
        }
    }
}

/// Lock a slot row by id alone (cancellation path: the id comes from the
/// reservation row, not from caller input)
pub async fn lock_by_id(
    conn: &mut PgConnection,
    availability_id: i64,
) -> Result<Option<SlotRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT availability_id, restaurant_id, date, time, available_seats, is_available
        FROM availability
        WHERE availability_id = $1
        FOR UPDATE
        "#,
    )
    .bind(availability_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Write a mutated capacity policy back to the locked slot row
pub async fn store_capacity(
    conn: &mut PgConnection,
    availability_id: i64,
    policy: &CapacityPolicy,
) -> Result<(), sqlx::Error> {
    let (available_seats, is_available) = policy.into_columns();
    sqlx::query("UPDATE availability SET available_seats = $2, is_available = $3 WHERE availability_id = $1")
        .bind(availability_id)
        .bind(available_seats)
        .bind(is_available)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
