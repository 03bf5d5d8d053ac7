//! Room availability
//!
//! Two stays collide when `existing.check_out > check_in && existing.check_in < check_out`.
//! Cancelled bookings never block. Back-to-back stays sharing a turnover day
//! are both allowed.

use chrono::NaiveDate;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::BookingEngine;
use crate::error::{Error, Result};
use crate::models::Stay;
use crate::storage::{BookingRepository, CatalogRepository};

/// Whether no live booking of an existing room overlaps the stay
pub fn is_room_available<S>(store: &S, room_id: Uuid, stay: &Stay) -> Result<bool>
where
    S: CatalogRepository + BookingRepository + ?Sized,
{
    if store.find_room(room_id)?.is_none() {
        return Err(Error::NotFound("Room not found".to_string()));
    }
    room_is_free(store, room_id, stay)
}

/// Overlap check for a room already known to exist
pub fn room_is_free<S>(store: &S, room_id: Uuid, stay: &Stay) -> Result<bool>
where
    S: BookingRepository + ?Sized,
{
    let free = !store.room_has_overlap(room_id, stay)?;
    debug!(%room_id, check_in = %stay.check_in(), check_out = %stay.check_out(), free, "Availability checked");
    Ok(free)
}

impl BookingEngine {
    /// Advisory availability check. `add_booking` repeats it inside its transaction.
    #[instrument(skip(self))]
    pub fn is_room_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool> {
        let stay = Stay::new(check_in, check_out)?;
        is_room_available(&self.db, room_id, &stay)
    }
}
