//! Stay pricing: nightly base fare times whole nights

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use super::BookingEngine;
use crate::error::{Error, Result};
use crate::models::{Money, Room, Stay};
use crate::storage::CatalogRepository;

/// Price of a stay in a known room. Guest count does not affect the fare.
pub fn fare_for(room: &Room, stay: &Stay) -> Result<Money> {
    room.base_fare.times(stay.nights())
}

/// Look up the room and price the stay
pub fn total_fare<S>(store: &S, room_id: Uuid, stay: &Stay) -> Result<Money>
where
    S: CatalogRepository + ?Sized,
{
    let room = store
        .find_room(room_id)?
        .ok_or_else(|| Error::NotFound("Room not found".to_string()))?;
    fare_for(&room, stay)
}

impl BookingEngine {
    /// Total fare for a prospective stay. Empty or inverted ranges are rejected
    /// before the room is looked up.
    ///
    /// `guests` is reserved for capacity-based pricing and does not change the
    /// fare; capacity itself is checked when the booking is placed.
    #[instrument(skip(self))]
    pub fn calculate_total_fare(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Money> {
        let stay = Stay::new(check_in, check_out)?;
        total_fare(&self.db, room_id, &stay)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[test]
    fn test_three_nights_at_one_hundred() {
        let f = fixture();
        let total = f
            .engine
            .calculate_total_fare(f.room.id, date(2026, 11, 10), date(2026, 11, 13), 2)
            .unwrap();
        assert_eq!(total, Money::from_major(300));
        assert_eq!(total.to_string(), "300.00");
    }

    #[test]
    fn test_guest_count_does_not_change_fare() {
        let f = fixture();
        let one = f
            .engine
            .calculate_total_fare(f.room.id, date(2026, 11, 10), date(2026, 11, 12), 1)
            .unwrap();
        let two = f
            .engine
            .calculate_total_fare(f.room.id, date(2026, 11, 10), date(2026, 11, 12), 2)
            .unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_fractional_rate_is_exact() {
        let f = fixture();
        let room = Room::new(f.hotel.id, "Suite", 4, Money::from_cents(19_999));
        let stay = Stay::new(date(2026, 11, 1), date(2026, 11, 8)).unwrap();
        assert_eq!(fare_for(&room, &stay).unwrap(), Money::from_cents(139_993));
    }

    #[test]
    fn test_unknown_room_not_found() {
        let f = fixture();
        let err = f
            .engine
            .calculate_total_fare(Uuid::new_v4(), date(2026, 11, 10), date(2026, 11, 13), 1)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_zero_nights_rejected() {
        let f = fixture();
        let err = f
            .engine
            .calculate_total_fare(f.room.id, date(2026, 11, 10), date(2026, 11, 10), 1)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_fare_overflow_is_validation() {
        let f = fixture();
        let room = Room::new(f.hotel.id, "Penthouse", 2, Money::from_cents(999_999_999_999_999_999));
        f.engine.database().catalog().create_room(&room).unwrap();

        let err = f
            .engine
            .calculate_total_fare(room.id, date(2026, 11, 1), date(2026, 11, 11), 1)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
