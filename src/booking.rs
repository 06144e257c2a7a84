//! Reservation transaction manager
//!
//! Owns the atomic lock-check-mutate sequences for booking and cancellation.
//! Each operation acquires one pooled connection, runs one transaction, and
//! releases the connection on every exit path; an early return before commit
//! drops the transaction, which rolls it back, so no partial state (a
//! reservation without its capacity deduction, or the reverse) is ever
//! observable. This module is the only writer of slot capacity.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::db::reservations::{self, ReservationRecord};
use crate::db::slots::{self, SlotSelector};
use crate::error::{AppError, AppResult};

/// Validated booking parameters.
///
/// The slot is identified either by an explicit `availability_id` or by the
/// composite (restaurant_id, date, time) key; the chosen identity is trusted
/// as the booking target and is also what gets locked.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub restaurant_id: i64,
    pub availability_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub guest_name: String,
    pub party_size: i32,
}

impl BookingRequest {
    /// Validate the request and resolve the slot selector.
    ///
    /// Runs before any transaction is opened.
    pub fn validate(&self) -> AppResult<SlotSelector> {
        if self.party_size <= 0 {
            return Err(AppError::invalid_input("party_size must be positive")
                .with_detail("party_size", self.party_size));
        }
        if self.guest_name.trim().is_empty() {
            return Err(AppError::invalid_input("guest_name must not be empty"));
        }
        match (self.availability_id, self.date, self.time) {
            (Some(id), _, _) => Ok(SlotSelector::Availability(id)),
            (None, Some(date), Some(time)) => Ok(SlotSelector::DateTime { date, time }),
            _ => Err(AppError::invalid_input(
                "either availability_id or both date and time are required",
            )),
        }
    }
}

/// Book a reservation against a slot, deducting its capacity, as one
/// atomic transaction.
///
/// The capacity read and the row lock are the same `FOR UPDATE` statement:
/// a concurrent booking or cancellation of the same slot blocks there until
/// this transaction finishes, then re-evaluates against the committed state.
/// At most N concurrent bookers can succeed against capacity N.
pub async fn book(pool: &PgPool, request: &BookingRequest) -> AppResult<ReservationRecord> {
    let selector = request.validate()?;
    let guest_name = request.guest_name.trim();

    let mut tx = pool.begin().await?;

    let slot = slots::lock(&mut tx, request.restaurant_id, &selector)
        .await?
        .ok_or_else(AppError::slot_not_found)?;

    let mut policy = slot.policy()?;
    if !policy.try_reserve(request.party_size) {
        return Err(AppError::insufficient_capacity(request.party_size)
            .with_detail("availability_id", slot.availability_id));
    }

    let reservation_id = reservations::insert(
        &mut tx,
        slot.availability_id,
        slot.restaurant_id,
        guest_name,
        slot.date,
        slot.time,
        request.party_size,
    )
    .await?;

    slots::store_capacity(&mut tx, slot.availability_id, &policy).await?;

    tx.commit().await?;

    tracing::info!(
        reservation_id,
        availability_id = slot.availability_id,
        restaurant_id = slot.restaurant_id,
        party_size = request.party_size,
        "reservation booked"
    );

    Ok(ReservationRecord {
        reservation_id,
        availability_id: slot.availability_id,
        restaurant_id: slot.restaurant_id,
        guest_name: guest_name.to_string(),
        reservation_date: slot.date,
        reservation_time: slot.time,
        party_size: request.party_size,
    })
}

/// Cancel a reservation and restore its slot's capacity, as one atomic
/// transaction.
///
/// The restore target comes from the reservation row's own slot reference,
/// never from caller input, and stays locked until commit so a concurrent
/// booking cannot read capacity between the delete and the restore. A second
/// cancel of the same id finds no row and fails with `ReservationNotFound`
/// without touching capacity.
pub async fn cancel(pool: &PgPool, reservation_id: i64) -> AppResult<()> {
    if reservation_id <= 0 {
        return Err(AppError::invalid_input("reservation_id must be positive")
            .with_detail("reservation_id", reservation_id));
    }

    let mut tx = pool.begin().await?;

    let reservation = reservations::lock(&mut tx, reservation_id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(reservation_id))?;

    reservations::delete(&mut tx, reservation.reservation_id).await?;

    let slot = slots::lock_by_id(&mut tx, reservation.availability_id)
        .await?
        .ok_or_else(|| {
            AppError::internal(format!(
                "reservation {} references missing slot {}",
                reservation.reservation_id, reservation.availability_id
            ))
        })?;

    let mut policy = slot.policy()?;
    policy.release(reservation.party_size);
    slots::store_capacity(&mut tx, slot.availability_id, &policy).await?;

    tx.commit().await?;

    tracing::info!(
        reservation_id,
        availability_id = slot.availability_id,
        party_size = reservation.party_size,
        "reservation cancelled"
    );

    Ok(())
}
