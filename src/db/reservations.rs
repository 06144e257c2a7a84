//! Reservation record access
//!
//! Cancellation is physical deletion; a reservation row exists exactly while
//! its capacity deduction is in effect.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgConnection;

/// One reservation row, as returned to callers
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ReservationRecord {
    pub reservation_id: i64,
    pub availability_id: i64,
    pub restaurant_id: i64,
    pub guest_name: String,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub party_size: i32,
}

/// Insert a reservation against a locked slot, returning the generated id
pub async fn insert(
    conn: &mut PgConnection,
    availability_id: i64,
    restaurant_id: i64,
    guest_name: &str,
    date: NaiveDate,
    time: NaiveTime,
    party_size: i32,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO reservations
            (availability_id, restaurant_id, guest_name, reservation_date, reservation_time, party_size)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING reservation_id
        "#,
    )
    .bind(availability_id)
    .bind(restaurant_id)
    .bind(guest_name)
    .bind(date)
    .bind(time)
    .bind(party_size)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.0)
}

/// Lock the reservation row for the rest of the transaction, reading the slot
/// reference and party size needed to restore capacity
pub async fn lock(
    conn: &mut PgConnection,
    reservation_id: i64,
) -> Result<Option<ReservationRecord>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT reservation_id, availability_id, restaurant_id, guest_name,
               reservation_date, reservation_time, party_size
        FROM reservations
        WHERE reservation_id = $1
        FOR UPDATE
        "#,
    )
    .bind(reservation_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Delete a locked reservation row
pub async fn delete(conn: &mut PgConnection, reservation_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM reservations WHERE reservation_id = $1")
        .bind(reservation_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
