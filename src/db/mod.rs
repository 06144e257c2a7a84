//! Store access layer
//!
//! Thin row-to-struct accessors over PostgreSQL. Locking reads used by the
//! transaction manager live here; callers own transaction scope and commit.

pub mod reservations;
pub mod restaurants;
pub mod slots;
