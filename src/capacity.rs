//! Capacity policy for slot inventory
//!
//! A slot's remaining capacity is represented one of two ways: a seat counter
//! or a single availability flag. Both are mutations of the same entity, so
//! the transaction manager is written once against this enum and never
//! inspects the representation directly.

/// How a slot's remaining bookable capacity is represented and mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Seat counter; holds zero-or-many reservations bounded by capacity
    Counter { remaining: i32 },
    /// Single availability flag; holds zero-or-one reservation
    Binary { available: bool },
}

impl CapacityPolicy {
    /// Rebuild the policy from the slot row's capacity columns.
    ///
    /// Exactly one column is non-NULL (schema CHECK); returns `None` if the
    /// row violates that, so the caller can surface an integrity error.
    pub fn from_columns(
        available_seats: Option<i32>,
        is_available: Option<bool>,
    ) -> Option<CapacityPolicy> {
        match (available_seats, is_available) {
            (Some(remaining), None) => Some(CapacityPolicy::Counter { remaining }),
            (None, Some(available)) => Some(CapacityPolicy::Binary { available }),
            _ => None,
        }
    }

    /// Split the policy back into the slot row's capacity columns
    pub fn into_columns(self) -> (Option<i32>, Option<bool>) {
        match self {
            CapacityPolicy::Counter { remaining } => (Some(remaining), None),
            CapacityPolicy::Binary { available } => (None, Some(available)),
        }
    }

    /// Whether this slot could currently seat a party of the given size
    pub fn accommodates(&self, party_size: i32) -> bool {
        match self {
            CapacityPolicy::Counter { remaining } => *remaining >= party_size,
            CapacityPolicy::Binary { available } => *available,
        }
    }

    /// Deduct capacity for a party, or refuse without mutating.
    ///
    /// Counter slots require `remaining >= party_size` and never go negative;
    /// binary slots require the flag to be set and clear it.
    pub fn try_reserve(&mut self, party_size: i32) -> bool {
        match self {
            CapacityPolicy::Counter { remaining } => {
                if *remaining >= party_size {
                    *remaining -= party_size;
                    true
                } else {
                    false
                }
            }
            CapacityPolicy::Binary { available } => {
                if *available {
                    *available = false;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Restore capacity for a canceled reservation of the given party size
    pub fn release(&mut self, party_size: i32) {
        match self {
            CapacityPolicy::Counter { remaining } => *remaining += party_size,
            CapacityPolicy::Binary { available } => *available = true,
        }
    }
}
