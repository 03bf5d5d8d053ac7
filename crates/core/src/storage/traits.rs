//! Storage repository traits
//!
//! These traits define the storage interface the booking engine runs against.
//! They are implemented for a bare `Connection`, so the same engine code works
//! on an open transaction, and for `Database`.

use rusqlite::Connection;
use uuid::Uuid;

use super::{BookingStore, CatalogStore, PaymentStore};
use crate::error::Result;
use crate::models::{Booking, BookingDetails, Hotel, Payment, PaymentHistory, Room, Stay, User};

/// Read-only lookups into the catalog and identity tables
pub trait CatalogRepository {
    /// Find room by ID
    fn find_room(&self, id: Uuid) -> Result<Option<Room>>;

    /// Find hotel by ID
    fn find_hotel(&self, id: Uuid) -> Result<Option<Hotel>>;

    /// Find user by ID
    fn find_user(&self, id: Uuid) -> Result<Option<User>>;
}

/// Booking repository operations
pub trait BookingRepository {
    /// Insert a new booking
    fn insert_booking(&self, booking: &Booking) -> Result<()>;

    /// Find booking by ID
    fn find_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Whether a live booking of the room overlaps the stay
    fn room_has_overlap(&self, room_id: Uuid, stay: &Stay) -> Result<bool>;

    /// Pending + unpaid -> Confirmed + paid
    fn mark_booking_paid(&self, id: Uuid) -> Result<bool>;

    /// Live -> Cancelled
    fn mark_booking_cancelled(&self, id: Uuid) -> Result<bool>;

    /// List a user's bookings
    fn list_user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>>;

    /// List every booking
    fn list_all_bookings(&self) -> Result<Vec<Booking>>;

    /// List every booking with its hotel name
    fn list_booking_details(&self) -> Result<Vec<BookingDetails>>;
}

/// Payment repository operations
pub trait PaymentRepository {
    /// Insert a new payment
    fn insert_payment(&self, payment: &Payment) -> Result<()>;

    /// Find payment by ID
    fn find_payment(&self, id: Uuid) -> Result<Option<Payment>>;

    /// Find the payment linked to a booking
    fn find_payment_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>>;

    /// Completed -> Refunded
    fn mark_payment_refunded(&self, id: Uuid) -> Result<bool>;

    /// Payment history for one user
    fn user_payment_history(&self, user_id: Uuid) -> Result<Vec<PaymentHistory>>;

    /// Payment history for all users
    fn payment_history(&self) -> Result<Vec<PaymentHistory>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
pub trait Storage: CatalogRepository + BookingRepository + PaymentRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: CatalogRepository + BookingRepository + PaymentRepository {}

impl CatalogRepository for Connection {
    fn find_room(&self, id: Uuid) -> Result<Option<Room>> {
        CatalogStore::new(self).find_room(id)
    }

    fn find_hotel(&self, id: Uuid) -> Result<Option<Hotel>> {
        CatalogStore::new(self).find_hotel(id)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        CatalogStore::new(self).find_user(id)
    }
}

impl BookingRepository for Connection {
    fn insert_booking(&self, booking: &Booking) -> Result<()> {
        BookingStore::new(self).create(booking)
    }

    fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        BookingStore::new(self).find_by_id(id)
    }

    fn room_has_overlap(&self, room_id: Uuid, stay: &Stay) -> Result<bool> {
        BookingStore::new(self).has_overlap(room_id, stay)
    }

    fn mark_booking_paid(&self, id: Uuid) -> Result<bool> {
        BookingStore::new(self).mark_paid(id)
    }

    fn mark_booking_cancelled(&self, id: Uuid) -> Result<bool> {
        BookingStore::new(self).mark_cancelled(id)
    }

    fn list_user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        BookingStore::new(self).list_for_user(user_id)
    }

    fn list_all_bookings(&self) -> Result<Vec<Booking>> {
        BookingStore::new(self).list_all()
    }

    fn list_booking_details(&self) -> Result<Vec<BookingDetails>> {
        BookingStore::new(self).list_details()
    }
}

impl PaymentRepository for Connection {
    fn insert_payment(&self, payment: &Payment) -> Result<()> {
        PaymentStore::new(self).create(payment)
    }

    fn find_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        PaymentStore::new(self).find_by_id(id)
    }

    fn find_payment_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        PaymentStore::new(self).find_by_booking(booking_id)
    }

    fn mark_payment_refunded(&self, id: Uuid) -> Result<bool> {
        PaymentStore::new(self).mark_refunded(id)
    }

    fn user_payment_history(&self, user_id: Uuid) -> Result<Vec<PaymentHistory>> {
        PaymentStore::new(self).history_for_user(user_id)
    }

    fn payment_history(&self) -> Result<Vec<PaymentHistory>> {
        PaymentStore::new(self).history_all()
    }
}
