//! mesa — restaurant table reservation service
//!
//! Transactional finite-inventory management for restaurant table slots:
//! concurrent booking and cancellation against a PostgreSQL store, with
//! row-level locking to prevent overbooking and lost updates, plus the
//! filtered availability search that surfaces eligible slots.

pub mod api;
pub mod booking;
pub mod capacity;
pub mod config;
pub mod db;
pub mod error;
pub mod search;
pub mod state;
