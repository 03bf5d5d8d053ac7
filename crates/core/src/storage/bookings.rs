//! Booking storage operations

use rusqlite::{params, Connection, Error as SqlError, ErrorCode, Row};
use tracing::instrument;
use uuid::Uuid;

use super::migrations::OVERLAP_MESSAGE;
use super::parse::{format_date, parse_booking_status, parse_date, parse_datetime, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{Booking, BookingDetails, BookingStatus, Money, Stay};

const BOOKING_COLUMNS: &str = "id, user_id, hotel_id, room_id, check_in, check_out, guests, total_cents, is_paid, status, created_at";

fn booking_from_row(row: &Row<'_>) -> std::result::Result<Booking, SqlError> {
    Ok(Booking {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        hotel_id: parse_uuid(&row.get::<_, String>(2)?)?,
        room_id: parse_uuid(&row.get::<_, String>(3)?)?,
        check_in: parse_date(&row.get::<_, String>(4)?)?,
        check_out: parse_date(&row.get::<_, String>(5)?)?,
        guests: row.get(6)?,
        total_amount: Money::from_cents(row.get(7)?),
        is_paid: row.get::<_, i32>(8)? != 0,
        status: parse_booking_status(&row.get::<_, String>(9)?)?,
        created_at: parse_datetime(&row.get::<_, String>(10)?)?,
    })
}

/// Translate the overlap trigger into a business conflict
fn map_insert_error(err: SqlError) -> Error {
    if let SqlError::SqliteFailure(code, Some(message)) = &err {
        if code.code == ErrorCode::ConstraintViolation && message.contains(OVERLAP_MESSAGE) {
            return Error::Conflict("Room not available for selected dates".to_string());
        }
    }
    Error::Database(err)
}

pub struct BookingStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a booking row
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, room_id = %booking.room_id))]
    pub fn create(&self, booking: &Booking) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO bookings (id, user_id, hotel_id, room_id, check_in, check_out, guests, total_cents, is_paid, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    booking.id.to_string(),
                    booking.user_id.to_string(),
                    booking.hotel_id.to_string(),
                    booking.room_id.to_string(),
                    format_date(booking.check_in),
                    format_date(booking.check_out),
                    booking.guests,
                    booking.total_amount.cents(),
                    booking.is_paid as i32,
                    booking.status.as_str(),
                    booking.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_insert_error)?;
        Ok(())
    }

    /// Find booking by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let booking = self
            .conn
            .query_row(
                &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
                params![id.to_string()],
                booking_from_row,
            )
            .optional()?;
        Ok(booking)
    }

    /// Whether a non-cancelled booking of the room overlaps `[check_in, check_out)`
    #[instrument(skip(self))]
    pub fn has_overlap(&self, room_id: Uuid, stay: &Stay) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE room_id = ?1
                  AND status != 'Cancelled'
                  AND check_out > ?2
                  AND check_in < ?3
             )",
            params![
                room_id.to_string(),
                format_date(stay.check_in()),
                format_date(stay.check_out()),
            ],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Bookings made by a user, latest check-in first
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY check_in DESC, created_at DESC"
        ))?;
        let bookings = stmt
            .query_map(params![user_id.to_string()], booking_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    /// All bookings, newest first
    #[instrument(skip(self))]
    pub fn list_all(&self) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))?;
        let bookings = stmt
            .query_map([], booking_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    /// All bookings joined with their hotel name
    #[instrument(skip(self))]
    pub fn list_details(&self) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, h.name, b.room_id, b.check_in, b.check_out, b.guests, b.status
             FROM bookings b
             INNER JOIN hotels h ON h.id = b.hotel_id
             ORDER BY b.check_in, b.created_at",
        )?;
        let details = stmt
            .query_map([], |row| {
                Ok(BookingDetails {
                    booking_id: parse_uuid(&row.get::<_, String>(0)?)?,
                    hotel_name: row.get(1)?,
                    room_id: parse_uuid(&row.get::<_, String>(2)?)?,
                    check_in: parse_date(&row.get::<_, String>(3)?)?,
                    check_out: parse_date(&row.get::<_, String>(4)?)?,
                    guests: row.get(5)?,
                    status: parse_booking_status(&row.get::<_, String>(6)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(details)
    }

    /// Flip an unpaid pending booking to paid + confirmed.
    /// Returns false when the row was not in that state.
    #[instrument(skip(self))]
    pub fn mark_paid(&self, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE bookings SET is_paid = 1, status = 'Confirmed'
             WHERE id = ?1 AND is_paid = 0 AND status = 'Pending'",
            params![id.to_string()],
        )?;
        Ok(changed == 1)
    }

    /// Move a live booking to `Cancelled`. Returns false if it already was.
    #[instrument(skip(self))]
    pub fn mark_cancelled(&self, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE bookings SET status = ?1 WHERE id = ?2 AND status != ?1",
            params![BookingStatus::Cancelled.as_str(), id.to_string()],
        )?;
        Ok(changed == 1)
    }

    /// Number of booking rows (all states)
    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingRequest, Hotel, Role, Room, User};
    use crate::storage::Database;
    use chrono::NaiveDate;

    struct Fixture {
        db: Database,
        guest: Uuid,
        hotel: Uuid,
        room: Uuid,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("Alice", "alice@example.com", Role::Guest);
        let hotel = Hotel::new("Cozy Haven", "Pune");
        let room = Room::new(hotel.id, "Deluxe", 2, Money::from_major(100));
        db.catalog().create_user(&user).unwrap();
        db.catalog().create_hotel(&hotel).unwrap();
        db.catalog().create_room(&room).unwrap();
        Fixture {
            db,
            guest: user.id,
            hotel: hotel.id,
            room: room.id,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    fn booking(f: &Fixture, from: u32, to: u32) -> Booking {
        let request = BookingRequest {
            hotel_id: f.hotel,
            room_id: f.room,
            check_in: date(from),
            check_out: date(to),
            guests: 1,
        };
        Booking::new(f.guest, &request, Money::from_major(100 * (to - from) as i64))
    }

    #[test]
    fn test_create_and_find() {
        let f = setup();
        let store = f.db.bookings();
        let b = booking(&f, 10, 13);
        store.create(&b).unwrap();

        let found = store.find_by_id(b.id).unwrap().unwrap();
        assert_eq!(found, Booking { created_at: found.created_at, ..b });
        assert_eq!(found.status, BookingStatus::Pending);
        assert!(!found.is_paid);
        assert!(store.find_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_has_overlap_ignores_cancelled() {
        let f = setup();
        let store = f.db.bookings();
        let b = booking(&f, 10, 13);
        store.create(&b).unwrap();

        let inside = Stay::new(date(11), date(12)).unwrap();
        let after = Stay::new(date(13), date(15)).unwrap();
        assert!(store.has_overlap(f.room, &inside).unwrap());
        assert!(!store.has_overlap(f.room, &after).unwrap());
        assert!(!store.has_overlap(Uuid::new_v4(), &inside).unwrap());

        assert!(store.mark_cancelled(b.id).unwrap());
        assert!(!store.has_overlap(f.room, &inside).unwrap());
    }

    #[test]
    fn test_trigger_rejects_overlapping_insert() {
        let f = setup();
        let store = f.db.bookings();
        store.create(&booking(&f, 10, 13)).unwrap();

        let err = store.create(&booking(&f, 12, 14)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.count().unwrap(), 1);

        // Back-to-back stays share no night
        store.create(&booking(&f, 13, 14)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_mark_paid_only_from_pending() {
        let f = setup();
        let store = f.db.bookings();
        let b = booking(&f, 10, 13);
        store.create(&b).unwrap();

        assert!(store.mark_paid(b.id).unwrap());
        assert!(!store.mark_paid(b.id).unwrap());

        let paid = store.find_by_id(b.id).unwrap().unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_cancelled_cannot_be_revived() {
        let f = setup();
        let store = f.db.bookings();
        let b = booking(&f, 10, 13);
        store.create(&b).unwrap();
        assert!(store.mark_cancelled(b.id).unwrap());
        assert!(!store.mark_cancelled(b.id).unwrap());

        let revive = f.db.conn.execute(
            "UPDATE bookings SET status = 'Pending' WHERE id = ?1",
            params![b.id.to_string()],
        );
        assert!(revive.is_err());
    }

    #[test]
    fn test_paid_pending_rejected_by_schema() {
        let f = setup();
        let mut b = booking(&f, 10, 13);
        b.is_paid = true;
        assert!(matches!(f.db.bookings().create(&b), Err(Error::Database(_))));
    }

    #[test]
    fn test_list_for_user_and_details() {
        let f = setup();
        let store = f.db.bookings();
        store.create(&booking(&f, 1, 3)).unwrap();
        store.create(&booking(&f, 20, 22)).unwrap();

        let mine = store.list_for_user(f.guest).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].check_in, date(20));
        assert!(store.list_for_user(Uuid::new_v4()).unwrap().is_empty());

        let details = store.list_details().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].hotel_name, "Cozy Haven");
        assert_eq!(details[0].check_in, date(1));
        assert_eq!(store.list_all().unwrap().len(), 2);
    }
}
