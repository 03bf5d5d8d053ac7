//! SQLite storage layer for Haven

mod bookings;
mod catalog;
mod migrations;
mod parse;
mod payments;
mod traits;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Booking, BookingDetails, Hotel, Payment, PaymentHistory, Room, Stay, User};

pub use bookings::BookingStore;
pub use catalog::CatalogStore;
pub use payments::PaymentStore;
pub use traits::{BookingRepository, CatalogRepository, PaymentRepository, Storage};

/// How long a writer waits for another writer's transaction before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create database, waiting up to `busy_timeout` for locks
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open_with_busy_timeout<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, busy_timeout)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        conn.busy_timeout(busy_timeout)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Run `work` as one unit: commit if it returns `Ok`, roll back otherwise.
    ///
    /// The transaction starts with `BEGIN IMMEDIATE`, taking SQLite's single
    /// writer lock up front. Reads inside `work` therefore cannot be
    /// invalidated by another writer before the commit.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                debug!(error = %err, "Transaction rolled back");
                Err(err)
            }
        }
    }

    /// Raw connection for read-only queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get booking store
    pub fn bookings(&self) -> BookingStore<'_> {
        BookingStore::new(&self.conn)
    }

    /// Get payment store
    pub fn payments(&self) -> PaymentStore<'_> {
        PaymentStore::new(&self.conn)
    }

    /// Get catalog store (users, hotels, rooms)
    pub fn catalog(&self) -> CatalogStore<'_> {
        CatalogStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl CatalogRepository for Database {
    fn find_room(&self, id: Uuid) -> Result<Option<Room>> {
        self.conn.find_room(id)
    }

    fn find_hotel(&self, id: Uuid) -> Result<Option<Hotel>> {
        self.conn.find_hotel(id)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        self.conn.find_user(id)
    }
}

impl BookingRepository for Database {
    fn insert_booking(&self, booking: &Booking) -> Result<()> {
        self.conn.insert_booking(booking)
    }

    fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        self.conn.find_booking(id)
    }

    fn room_has_overlap(&self, room_id: Uuid, stay: &Stay) -> Result<bool> {
        self.conn.room_has_overlap(room_id, stay)
    }

    fn mark_booking_paid(&self, id: Uuid) -> Result<bool> {
        self.conn.mark_booking_paid(id)
    }

    fn mark_booking_cancelled(&self, id: Uuid) -> Result<bool> {
        self.conn.mark_booking_cancelled(id)
    }

    fn list_user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        self.conn.list_user_bookings(user_id)
    }

    fn list_all_bookings(&self) -> Result<Vec<Booking>> {
        self.conn.list_all_bookings()
    }

    fn list_booking_details(&self) -> Result<Vec<BookingDetails>> {
        self.conn.list_booking_details()
    }
}

impl PaymentRepository for Database {
    fn insert_payment(&self, payment: &Payment) -> Result<()> {
        self.conn.insert_payment(payment)
    }

    fn find_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        self.conn.find_payment(id)
    }

    fn find_payment_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        self.conn.find_payment_for_booking(booking_id)
    }

    fn mark_payment_refunded(&self, id: Uuid) -> Result<bool> {
        self.conn.mark_payment_refunded(id)
    }

    fn user_payment_history(&self, user_id: Uuid) -> Result<Vec<PaymentHistory>> {
        self.conn.user_payment_history(user_id)
    }

    fn payment_history(&self) -> Result<Vec<PaymentHistory>> {
        self.conn.payment_history()
    }
}
