//! End-to-end booking lifecycle through the public API

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use haven_core::{
    Booking, BookingEngine, BookingRepository, BookingRequest, BookingStatus, CardDetails,
    Database, Error, FixedClock, Hotel, Money, Notifier, Payment, PaymentRepository,
    PaymentRequest, PaymentStatus, Recipient, RejectionKind, Result, Role, Room, User,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

/// Always fails, to prove notification errors never undo committed work
struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify_payment_confirmed(&self, _: &Booking, _: &Payment, _: &Recipient) -> Result<()> {
        Err(Error::Notification("smtp unreachable".to_string()))
    }

    fn notify_booking_cancelled(&self, _: &Booking, _: Option<&Payment>, _: &Recipient) -> Result<()> {
        Err(Error::Notification("smtp unreachable".to_string()))
    }

    fn notify_refund_processed(&self, _: &Booking, _: &Payment, _: &Recipient) -> Result<()> {
        Err(Error::Notification("smtp unreachable".to_string()))
    }
}

/// Captures recipients and refund flags
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn push(&self, kind: &str, to: &Recipient) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((kind.to_string(), to.email.clone()));
        Ok(())
    }

    fn kinds(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_payment_confirmed(&self, _: &Booking, _: &Payment, to: &Recipient) -> Result<()> {
        self.push("paid", to)
    }

    fn notify_booking_cancelled(&self, _: &Booking, refund: Option<&Payment>, to: &Recipient) -> Result<()> {
        self.push(if refund.is_some() { "cancelled+refund" } else { "cancelled" }, to)
    }

    fn notify_refund_processed(&self, _: &Booking, _: &Payment, to: &Recipient) -> Result<()> {
        self.push("refunded", to)
    }
}

struct World {
    guest: User,
    hotel: Hotel,
    room: Room,
}

fn world(db: &Database) -> World {
    let guest = User::new("Priya Nair", "priya@example.com", Role::Guest);
    let hotel = Hotel::new("Seaside Retreat", "Kochi");
    let room = Room::new(hotel.id, "Deluxe", 2, Money::from_major(100));
    db.catalog().create_user(&guest).unwrap();
    db.catalog().create_hotel(&hotel).unwrap();
    db.catalog().create_room(&room).unwrap();
    World { guest, hotel, room }
}

fn engine_at(now: NaiveDateTime, notifier: Arc<dyn Notifier>) -> (BookingEngine, World) {
    let db = Database::open_in_memory().unwrap();
    let world = world(&db);
    let engine = BookingEngine::new(db)
        .with_clock(Arc::new(FixedClock::new(now)))
        .with_notifier(notifier);
    (engine, world)
}

fn request(world: &World, check_in: NaiveDate, check_out: NaiveDate) -> BookingRequest {
    BookingRequest {
        hotel_id: world.hotel.id,
        room_id: world.room.id,
        check_in,
        check_out,
        guests: 2,
    }
}

fn pay(engine: &mut BookingEngine, booking: &Booking, amount: Money) -> haven_core::PaymentResult {
    engine
        .process_payment(&PaymentRequest {
            booking_id: booking.id,
            amount,
            card: CardDetails::new("5555 5555 5555 4444", "08/29", "321"),
        })
        .unwrap()
}

#[test]
fn test_full_lifecycle_with_refund() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), notifier.clone());

    let fare = engine
        .calculate_total_fare(world.room.id, date(2026, 11, 20), date(2026, 11, 23), 2)
        .unwrap();
    assert_eq!(fare, Money::from_major(300));

    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();
    assert_eq!(booking.total_amount, fare);

    let paid = pay(&mut engine, &booking, fare);
    assert!(paid.success);
    let payment_id = paid.payment_id.unwrap();

    let cancelled = engine.cancel_booking(booking.id, world.guest.id).unwrap();
    assert!(cancelled.success);
    assert_eq!(cancelled.refunded_payment_id, Some(payment_id));

    let stored = engine.get_booking(booking.id).unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert!(stored.is_paid);
    assert_eq!(engine.get_payment(payment_id).unwrap().status, PaymentStatus::Refunded);

    let history = engine.get_user_payment_history(world.guest.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].hotel_name, "Seaside Retreat");
    assert_eq!(history[0].status, PaymentStatus::Refunded);

    assert_eq!(notifier.kinds(), vec!["paid", "cancelled+refund"]);
}

#[test]
fn test_cancellation_window_23h_vs_25h() {
    // Check-in 2026-11-20 00:00
    let (mut late, world) = engine_at(at(2026, 11, 19, 1), Arc::new(RecordingNotifier::default()));
    let booking = late
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 22)), world.guest.id)
        .unwrap();
    assert!(pay(&mut late, &booking, booking.total_amount).success);

    let result = late.cancel_booking(booking.id, world.guest.id).unwrap();
    assert!(!result.success);
    assert_eq!(result.rejection, Some(RejectionKind::Conflict));
    assert_eq!(
        late.get_booking(booking.id).unwrap().status,
        BookingStatus::Confirmed
    );

    let (mut early, world) = engine_at(at(2026, 11, 18, 23), Arc::new(RecordingNotifier::default()));
    let booking = early
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 22)), world.guest.id)
        .unwrap();
    let paid = pay(&mut early, &booking, booking.total_amount);

    let result = early.cancel_booking(booking.id, world.guest.id).unwrap();
    assert!(result.success, "{}", result.message);
    assert_eq!(
        early.get_payment(paid.payment_id.unwrap()).unwrap().status,
        PaymentStatus::Refunded
    );
}

#[test]
fn test_payment_is_idempotent() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(RecordingNotifier::default()));
    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();

    assert!(pay(&mut engine, &booking, booking.total_amount).success);
    let second = pay(&mut engine, &booking, booking.total_amount);
    assert!(!second.success);
    assert_eq!(second.rejection, Some(RejectionKind::Conflict));
    assert_eq!(engine.database().payments().count().unwrap(), 1);
}

#[test]
fn test_amount_mismatch_writes_nothing() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(RecordingNotifier::default()));
    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();

    let result = pay(&mut engine, &booking, booking.total_amount + Money::from_major(1));
    assert!(!result.success);
    assert_eq!(result.rejection, Some(RejectionKind::Validation));

    let stored = engine.get_booking(booking.id).unwrap();
    assert!(!stored.is_paid);
    assert_eq!(stored.status, BookingStatus::Pending);
    assert!(engine
        .database()
        .find_payment_for_booking(booking.id)
        .unwrap()
        .is_none());
}

#[test]
fn test_cancelled_is_terminal() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(RecordingNotifier::default()));
    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();

    assert!(engine.cancel_booking(booking.id, world.guest.id).unwrap().success);
    let again = engine.cancel_booking(booking.id, world.guest.id).unwrap();
    assert!(!again.success);
    assert_eq!(again.rejection, Some(RejectionKind::Conflict));

    let late_payment = pay(&mut engine, &booking, booking.total_amount);
    assert!(!late_payment.success);
    assert_eq!(
        engine.get_booking(booking.id).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[test]
fn test_fault_during_cancellation_rolls_back() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(RecordingNotifier::default()));
    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();
    let paid = pay(&mut engine, &booking, booking.total_amount);

    // Booking update succeeds, payment update fails
    engine
        .database()
        .connection()
        .execute_batch(
            "CREATE TRIGGER fail_refund BEFORE UPDATE OF status ON payments
             BEGIN SELECT RAISE(ABORT, 'simulated fault'); END;",
        )
        .unwrap();

    let err = engine.cancel_booking(booking.id, world.guest.id).unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    let stored = engine.database().find_booking(booking.id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
    let payment = engine
        .database()
        .find_payment(paid.payment_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
}

#[test]
fn test_notifier_failure_does_not_undo_commit() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(FailingNotifier));
    let booking = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();

    let paid = pay(&mut engine, &booking, booking.total_amount);
    assert!(paid.success);
    assert!(engine.get_booking(booking.id).unwrap().is_paid);

    let cancelled = engine.cancel_booking(booking.id, world.guest.id).unwrap();
    assert!(cancelled.success);
    assert_eq!(
        engine.get_booking(booking.id).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[test]
fn test_rejected_overlap_leaves_first_booking_intact() {
    let (mut engine, world) = engine_at(at(2026, 11, 1, 10), Arc::new(RecordingNotifier::default()));
    let first = engine
        .add_booking(&request(&world, date(2026, 11, 20), date(2026, 11, 23)), world.guest.id)
        .unwrap();

    let err = engine
        .add_booking(&request(&world, date(2026, 11, 22), date(2026, 11, 24)), world.guest.id)
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.rejection(), Some(RejectionKind::Conflict));

    let bookings = engine.get_user_bookings(world.guest.id).unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, first.id);
}
