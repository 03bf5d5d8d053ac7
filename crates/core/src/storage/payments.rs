//! Payment storage operations

use rusqlite::{params, Connection, Error as SqlError, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_payment_status, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Money, Payment, PaymentHistory, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, booking_id, amount_cents, currency, paid_at, status";

fn payment_from_row(row: &Row<'_>) -> std::result::Result<Payment, SqlError> {
    Ok(Payment {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        booking_id: parse_uuid(&row.get::<_, String>(1)?)?,
        amount_paid: Money::from_cents(row.get(2)?),
        currency: row.get(3)?,
        paid_at: parse_datetime(&row.get::<_, String>(4)?)?,
        status: parse_payment_status(&row.get::<_, String>(5)?)?,
    })
}

fn history_from_row(row: &Row<'_>) -> std::result::Result<PaymentHistory, SqlError> {
    Ok(PaymentHistory {
        payment_id: parse_uuid(&row.get::<_, String>(0)?)?,
        paid_at: parse_datetime(&row.get::<_, String>(1)?)?,
        hotel_name: row.get(2)?,
        room_id: parse_uuid(&row.get::<_, String>(3)?)?,
        room_type: row.get(4)?,
        amount_paid: Money::from_cents(row.get(5)?),
        status: parse_payment_status(&row.get::<_, String>(6)?)?,
    })
}

const HISTORY_SELECT: &str = "SELECT p.id, p.paid_at, h.name, r.id, r.room_size, p.amount_cents, p.status
     FROM payments p
     INNER JOIN bookings b ON b.id = p.booking_id
     INNER JOIN rooms r ON r.id = b.room_id
     INNER JOIN hotels h ON h.id = r.hotel_id";

pub struct PaymentStore<'a> {
    conn: &'a Connection,
}

impl<'a> PaymentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a payment row
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, booking_id = %payment.booking_id))]
    pub fn create(&self, payment: &Payment) -> Result<()> {
        self.conn.execute(
            "INSERT INTO payments (id, booking_id, amount_cents, currency, paid_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                payment.id.to_string(),
                payment.booking_id.to_string(),
                payment.amount_paid.cents(),
                payment.currency,
                payment.paid_at.to_rfc3339(),
                payment.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Find payment by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let payment = self
            .conn
            .query_row(
                &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"),
                params![id.to_string()],
                payment_from_row,
            )
            .optional()?;
        Ok(payment)
    }

    /// Find the payment linked to a booking
    #[instrument(skip(self))]
    pub fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        let payment = self
            .conn
            .query_row(
                &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = ?1"),
                params![booking_id.to_string()],
                payment_from_row,
            )
            .optional()?;
        Ok(payment)
    }

    /// Move a completed payment to `Refunded`. Returns false if it was not completed.
    #[instrument(skip(self))]
    pub fn mark_refunded(&self, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE payments SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                PaymentStatus::Refunded.as_str(),
                id.to_string(),
                PaymentStatus::Completed.as_str(),
            ],
        )?;
        Ok(changed == 1)
    }

    /// Payment history for one user, newest first
    #[instrument(skip(self))]
    pub fn history_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentHistory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT} WHERE b.user_id = ?1 ORDER BY p.paid_at DESC"
        ))?;
        let history = stmt
            .query_map(params![user_id.to_string()], history_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(history)
    }

    /// Payment history across all users, newest first
    #[instrument(skip(self))]
    pub fn history_all(&self) -> Result<Vec<PaymentHistory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT} ORDER BY p.paid_at DESC"))?;
        let history = stmt
            .query_map([], history_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(history)
    }

    /// Number of payment rows
    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))?;
        Ok(count)
    }
}
