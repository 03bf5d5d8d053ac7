//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// Overlap guard message raised by the bookings trigger
pub const OVERLAP_MESSAGE: &str = "room not available for selected dates";

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Users (identity provider mirror)
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Hotels (catalog)
            CREATE TABLE IF NOT EXISTS hotels (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                owner_id TEXT,
                FOREIGN KEY (owner_id) REFERENCES users(id)
            );

            -- Rooms (catalog)
            CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                hotel_id TEXT NOT NULL,
                room_size TEXT NOT NULL,
                bed_type TEXT NOT NULL,
                max_people INTEGER NOT NULL CHECK (max_people >= 1),
                base_fare_cents INTEGER NOT NULL CHECK (base_fare_cents >= 0),
                is_ac INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (hotel_id) REFERENCES hotels(id) ON DELETE CASCADE
            );

            -- Bookings
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                hotel_id TEXT NOT NULL,
                room_id TEXT NOT NULL,
                check_in TEXT NOT NULL,
                check_out TEXT NOT NULL,
                guests INTEGER NOT NULL CHECK (guests >= 1),
                total_cents INTEGER NOT NULL CHECK (total_cents >= 0),
                is_paid INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Confirmed', 'Cancelled')),
                created_at TEXT NOT NULL,
                CHECK (check_out > check_in),
                CHECK (is_paid = 0 OR status IN ('Confirmed', 'Cancelled')),
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (hotel_id) REFERENCES hotels(id),
                FOREIGN KEY (room_id) REFERENCES rooms(id)
            );

            -- Payments, 1:1 with bookings
            CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                booking_id TEXT NOT NULL UNIQUE,
                amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
                currency TEXT NOT NULL DEFAULT 'USD',
                paid_at TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('Completed', 'Refunded')),
                FOREIGN KEY (booking_id) REFERENCES bookings(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Availability lookups
            CREATE INDEX IF NOT EXISTS idx_bookings_room_dates
                ON bookings(room_id, check_in, check_out);

            -- Per-user listings
            CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings(user_id);

            -- Catalog
            CREATE INDEX IF NOT EXISTS idx_rooms_hotel ON rooms(hotel_id);

            -- Payment history ordering
            CREATE INDEX IF NOT EXISTS idx_payments_paid_at ON payments(paid_at);
        "#,
    },
    Migration {
        version: 3,
        description: "Add storage-level booking guards",
        sql: r#"
            -- No two live bookings of one room may overlap
            CREATE TRIGGER IF NOT EXISTS bookings_no_overlap
            BEFORE INSERT ON bookings
            WHEN NEW.status != 'Cancelled'
            BEGIN
                SELECT RAISE(ABORT, 'room not available for selected dates')
                WHERE EXISTS (
                    SELECT 1 FROM bookings
                    WHERE room_id = NEW.room_id
                      AND status != 'Cancelled'
                      AND check_out > NEW.check_in
                      AND check_in < NEW.check_out
                );
            END;

            -- Cancelled is terminal
            CREATE TRIGGER IF NOT EXISTS bookings_cancelled_is_final
            BEFORE UPDATE OF status ON bookings
            WHEN OLD.status = 'Cancelled' AND NEW.status != 'Cancelled'
            BEGIN
                SELECT RAISE(ABORT, 'cancelled bookings are final');
            END;
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
///
/// Runs under one immediate transaction so processes opening the same file
/// at once cannot apply a migration twice.
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    init_migrations_table(&tx)?;

    let current_version = get_current_version(&tx)?;
    info!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            tx.execute_batch(migration.sql)?;
            record_migration(&tx, migration)?;

            info!(version = migration.version, "Migration complete");
        }
    }

    let new_version = get_current_version(&tx)?;
    tx.commit()?;

    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}
