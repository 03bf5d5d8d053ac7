//! Booking model and lifecycle

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;
use crate::error::{Error, Result};

/// Booking lifecycle state
///
/// ```text
/// Pending --pay--> Confirmed
/// Pending --cancel--> Cancelled
/// Confirmed --cancel--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Created, awaiting payment
    Pending,
    /// Paid
    Confirmed,
    /// Terminal
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        *self == BookingStatus::Cancelled
    }

    /// Whether the state machine has an edge from `self` to `next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Years that render as four digits, so stored dates sort as text
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// A validated date range, `[check_in, check_out)` with at least one night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl Stay {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if !SUPPORTED_YEARS.contains(&check_in.year()) || !SUPPORTED_YEARS.contains(&check_out.year()) {
            return Err(Error::Validation(
                "Dates must fall between years 1 and 9999".to_string(),
            ));
        }
        if check_out <= check_in {
            return Err(Error::Validation(
                "Check-out date must be after check-in date".to_string(),
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Whole nights between check-in and check-out (always >= 1)
    pub fn nights(&self) -> u32 {
        // Constructor guarantees a positive span
        (self.check_out - self.check_in).num_days() as u32
    }
}

/// What a guest asks for when reserving a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}

impl BookingRequest {
    pub fn stay(&self) -> Result<Stay> {
        Stay::new(self.check_in, self.check_out)
    }
}

/// A reservation of one room for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_amount: Money,
    pub is_paid: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// New unpaid booking in `Pending`
    pub fn new(user_id: Uuid, request: &BookingRequest, total_amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            hotel_id: request.hotel_id,
            room_id: request.room_id,
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            total_amount,
            is_paid: false,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Check-in as a wall-clock instant (start of the check-in day)
    pub fn check_in_at(&self) -> NaiveDateTime {
        self.check_in.and_time(NaiveTime::MIN)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Flattened booking row for administrative listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking_id: Uuid,
    pub hotel_name: String,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub status: BookingStatus,
}
