//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;
use uuid::Uuid;

use crate::models::{BookingStatus, PaymentStatus, Role};

/// Date format used for check-in/check-out columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> SqlError {
    SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value {value:?}")]
struct UnknownValue {
    kind: &'static str,
    value: String,
}

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s).map_err(|e| conversion_error(0, e))
}

/// Parse an optional UUID from a database string column
pub fn parse_uuid_opt(s: Option<String>) -> Result<Option<Uuid>, SqlError> {
    s.map(|s| parse_uuid(&s)).transpose()
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, SqlError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(0, e))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_booking_status(s: &str) -> Result<BookingStatus, SqlError> {
    BookingStatus::from_str(s).ok_or_else(|| {
        conversion_error(
            0,
            UnknownValue {
                kind: "booking status",
                value: s.to_string(),
            },
        )
    })
}

pub fn parse_payment_status(s: &str) -> Result<PaymentStatus, SqlError> {
    PaymentStatus::from_str(s).ok_or_else(|| {
        conversion_error(
            0,
            UnknownValue {
                kind: "payment status",
                value: s.to_string(),
            },
        )
    })
}

pub fn parse_role(s: &str) -> Result<Role, SqlError> {
    Role::from_str(s).ok_or_else(|| {
        conversion_error(
            0,
            UnknownValue {
                kind: "role",
                value: s.to_string(),
            },
        )
    })
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_sorts_lexically() {
        let earlier = format_date(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
        let later = format_date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(earlier, "2026-09-30");
        assert!(earlier < later);
        assert_eq!(parse_date(&later).unwrap(), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
    }

    #[test]
    fn test_unknown_status_is_conversion_error() {
        let err = parse_booking_status("Archived").unwrap_err();
        assert!(matches!(err, SqlError::FromSqlConversionFailure(..)));
        assert!(err.to_string().contains("Archived"));
    }
}
