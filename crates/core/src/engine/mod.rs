//! Booking lifecycle engine
//!
//! Owns the database handle and runs every write as one immediate
//! transaction. Notifications go out only after the transaction commits.

mod availability;
mod booking;
mod cancellation;
mod fare;
mod payment;

use std::path::Path;
use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, LocalClock};
use crate::config::{BookingPolicy, HavenConfig};
use crate::error::{Error, Result};
use crate::models::{Actor, Booking, BookingDetails, Money, Payment, PaymentHistory};
use crate::notify::{Notifier, Recipient, TracingNotifier};
use crate::permissions::{BookingAction, PermissionMatrix};
use crate::storage::{BookingRepository, CatalogRepository, Database, PaymentRepository};

pub use availability::{is_room_available, room_is_free};
pub use fare::{fare_for, total_fare};

/// Entry point for booking, payment and cancellation flows
pub struct BookingEngine {
    db: Database,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl BookingEngine {
    /// Engine with the log notifier, local clock and default policy
    pub fn new(db: Database) -> Self {
        Self {
            db,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(LocalClock),
            policy: BookingPolicy::default(),
        }
    }

    /// Open the database at `path` with the configured timeout and policy
    pub fn from_config(config: &HavenConfig, path: &Path) -> Result<Self> {
        config.policy.validate()?;
        let db = Database::open_with_busy_timeout(path, config.database.busy_timeout())?;
        Self::new(db).with_policy(config.policy.clone())
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the booking policy after validating it
    pub fn with_policy(mut self, policy: BookingPolicy) -> Result<Self> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    fn tolerance(&self) -> Money {
        Money::from_cents(self.policy.payment_tolerance_cents)
    }

    // Reads

    /// Get a booking by ID
    pub fn get_booking(&self, booking_id: Uuid) -> Result<Booking> {
        self.db
            .find_booking(booking_id)?
            .ok_or_else(|| Error::NotFound("Booking not found".to_string()))
    }

    /// A user's bookings, latest check-in first
    pub fn get_user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        self.db.list_user_bookings(user_id)
    }

    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub fn get_all_bookings(&self, actor: &Actor) -> Result<Vec<Booking>> {
        PermissionMatrix::require(actor, BookingAction::ViewAllBookings)?;
        self.db.list_all_bookings()
    }

    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub fn get_all_booking_details(&self, actor: &Actor) -> Result<Vec<BookingDetails>> {
        PermissionMatrix::require(actor, BookingAction::ViewBookingDetails)?;
        self.db.list_booking_details()
    }

    /// Get a payment by ID
    pub fn get_payment(&self, payment_id: Uuid) -> Result<Payment> {
        self.db
            .find_payment(payment_id)?
            .ok_or_else(|| Error::NotFound("Payment not found".to_string()))
    }

    pub fn get_user_payment_history(&self, user_id: Uuid) -> Result<Vec<PaymentHistory>> {
        self.db.user_payment_history(user_id)
    }

    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub fn get_payment_history(&self, actor: &Actor) -> Result<Vec<PaymentHistory>> {
        PermissionMatrix::require(actor, BookingAction::ViewAllPayments)?;
        self.db.payment_history()
    }

    // Notifications

    /// Resolve the guest and hotel for a committed booking
    fn recipient_for(&self, booking: &Booking) -> Result<Option<Recipient>> {
        let Some(user) = self.db.find_user(booking.user_id)? else {
            return Ok(None);
        };
        let hotel = self.db.find_hotel(booking.hotel_id)?;
        Ok(Some(Recipient::new(&user, hotel.as_ref())))
    }

    /// Deliver a notice for a committed change. Failures are logged and dropped.
    fn notify<F>(&self, booking: &Booking, send: F)
    where
        F: FnOnce(&dyn Notifier, &Recipient) -> Result<()>,
    {
        let recipient = match self.recipient_for(booking) {
            Ok(Some(recipient)) => recipient,
            Ok(None) => {
                warn!(booking_id = %booking.id, user_id = %booking.user_id, "No recipient for notification");
                return;
            }
            Err(e) => {
                warn!(booking_id = %booking.id, error = %e, "Failed to resolve notification recipient");
                return;
            }
        };

        if let Err(e) = send(self.notifier.as_ref(), &recipient) {
            warn!(booking_id = %booking.id, error = %e, "Failed to send notification");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for engine tests

    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{BookingRequest, CardDetails, Hotel, PaymentRequest, Role, Room, User};

    /// Notifier that remembers what it was asked to send
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn record(&self, kind: &str) -> Result<()> {
            self.sent
                .lock()
                .map_err(|_| Error::Notification("poisoned".into()))?
                .push(kind.to_string());
            Ok(())
        }

        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify_payment_confirmed(&self, _: &Booking, _: &Payment, _: &Recipient) -> Result<()> {
            self.record("payment_confirmed")
        }

        fn notify_booking_cancelled(&self, _: &Booking, refund: Option<&Payment>, _: &Recipient) -> Result<()> {
            self.record(if refund.is_some() {
                "booking_cancelled_refunded"
            } else {
                "booking_cancelled"
            })
        }

        fn notify_refund_processed(&self, _: &Booking, _: &Payment, _: &Recipient) -> Result<()> {
            self.record("refund_processed")
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    pub struct Fixture {
        pub engine: BookingEngine,
        pub notifier: Arc<RecordingNotifier>,
        pub guest: User,
        pub admin: User,
        pub hotel: Hotel,
        pub room: Room,
    }

    impl Fixture {
        pub fn actor(&self) -> Actor {
            Actor::guest(self.guest.id)
        }

        pub fn admin_actor(&self) -> Actor {
            Actor::admin(self.admin.id)
        }

        pub fn request(&self, check_in: NaiveDate, check_out: NaiveDate) -> BookingRequest {
            BookingRequest {
                hotel_id: self.hotel.id,
                room_id: self.room.id,
                check_in,
                check_out,
                guests: 2,
            }
        }

        pub fn book(&mut self, check_in: NaiveDate, check_out: NaiveDate) -> Booking {
            let request = self.request(check_in, check_out);
            let guest = self.guest.id;
            self.engine.add_booking(&request, guest).unwrap()
        }

        pub fn pay(&mut self, booking: &Booking) -> Payment {
            let result = self
                .engine
                .process_payment(&PaymentRequest {
                    booking_id: booking.id,
                    amount: booking.total_amount,
                    card: card(),
                })
                .unwrap();
            assert!(result.success, "{}", result.message);
            self.engine.get_payment(result.payment_id.unwrap()).unwrap()
        }
    }

    pub fn card() -> CardDetails {
        CardDetails::new("4242 4242 4242 4242", "12/30", "123")
    }

    /// One hotel with a 100.00/night double room, clock at 2026-10-19 09:00
    pub fn fixture() -> Fixture {
        fixture_at(at(2026, 10, 19, 9))
    }

    pub fn fixture_at(now: NaiveDateTime) -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let guest = User::new("Erin Guest", "erin@example.com", Role::Guest);
        let admin = User::new("Ada Admin", "ada@example.com", Role::Admin);
        let hotel = Hotel::new("Cozy Haven", "Manali");
        let room = Room::new(hotel.id, "Deluxe", 2, Money::from_major(100));
        db.catalog().create_user(&guest).unwrap();
        db.catalog().create_user(&admin).unwrap();
        db.catalog().create_hotel(&hotel).unwrap();
        db.catalog().create_room(&room).unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let engine = BookingEngine::new(db)
            .with_notifier(notifier.clone())
            .with_clock(Arc::new(FixedClock::new(now)));

        Fixture {
            engine,
            notifier,
            guest,
            admin,
            hotel,
            room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_get_booking_not_found() {
        let f = fixture();
        let err = f.engine.get_booking(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(matches!(
            f.engine.get_payment(Uuid::new_v4()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_user_bookings_latest_check_in_first() {
        let mut f = fixture();
        let early = f.book(date(2026, 11, 1), date(2026, 11, 3));
        let late = f.book(date(2026, 12, 1), date(2026, 12, 3));

        let bookings = f.engine.get_user_bookings(f.guest.id).unwrap();
        let ids: Vec<_> = bookings.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[test]
    fn test_admin_listings_require_role() {
        let mut f = fixture();
        f.book(date(2026, 11, 1), date(2026, 11, 3));

        assert!(matches!(
            f.engine.get_all_bookings(&f.actor()),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            f.engine.get_payment_history(&f.actor()),
            Err(Error::PermissionDenied(_))
        ));

        let admin = f.admin_actor();
        assert_eq!(f.engine.get_all_bookings(&admin).unwrap().len(), 1);
        let details = f.engine.get_all_booking_details(&admin).unwrap();
        assert_eq!(details[0].hotel_name, "Cozy Haven");
    }

    #[test]
    fn test_payment_history_views() {
        let mut f = fixture();
        let booking = f.book(date(2026, 11, 1), date(2026, 11, 3));
        let payment = f.pay(&booking);

        let mine = f.engine.get_user_payment_history(f.guest.id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].payment_id, payment.id);
        assert_eq!(mine[0].room_type, "Deluxe");

        let all = f.engine.get_payment_history(&f.admin_actor()).unwrap();
        assert_eq!(all.len(), 1);
        assert!(f.engine.get_user_payment_history(f.admin.id).unwrap().is_empty());
    }
}
