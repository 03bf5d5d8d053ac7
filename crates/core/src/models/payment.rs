//! Payment model and card shape checks

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Completed" => Some(PaymentStatus::Completed),
            "Refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funds captured against a booking (at most one per booking)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount_paid: Money,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
    pub status: PaymentStatus,
}

impl Payment {
    pub fn completed(booking_id: Uuid, amount_paid: Money, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            amount_paid,
            currency: currency.to_string(),
            paid_at: Utc::now(),
            status: PaymentStatus::Completed,
        }
    }
}

/// Card data as typed by the guest. Checked for shape, never stored or charged.
#[derive(Clone, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvc: String,
}

impl CardDetails {
    pub fn new(number: impl Into<String>, expiry: impl Into<String>, cvc: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            expiry: expiry.into(),
            cvc: cvc.into(),
        }
    }

    /// Validate number (Luhn), expiry (not before `today`'s month) and CVC
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        let digits: Vec<u32> = self
            .number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .map(|c| c.to_digit(10))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Validation("Card number must contain only digits".to_string()))?;

        if !(12..=19).contains(&digits.len()) || !luhn_valid(&digits) {
            return Err(Error::Validation("Card number is invalid".to_string()));
        }

        let (month, year) = parse_expiry(&self.expiry)?;
        if (year, month) < (today.year(), today.month()) {
            return Err(Error::Validation("Card has expired".to_string()));
        }

        let cvc_ok = (3..=4).contains(&self.cvc.len()) && self.cvc.chars().all(|c| c.is_ascii_digit());
        if !cvc_ok {
            return Err(Error::Validation("CVC must be 3 or 4 digits".to_string()));
        }

        Ok(())
    }

    /// Last four digits for display
    pub fn last4(&self) -> String {
        let digits: String = self.number.chars().filter(|c| c.is_ascii_digit()).collect();
        digits[digits.len().saturating_sub(4)..].to_string()
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{}", self.last4()))
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .finish()
    }
}

fn luhn_valid(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn parse_expiry(expiry: &str) -> Result<(u32, i32)> {
    let invalid = || Error::Validation("Expiry must be MM/YY".to_string());
    let (mm, yy) = expiry.trim().split_once('/').ok_or_else(invalid)?;
    if mm.len() != 2 || yy.len() != 2 {
        return Err(invalid());
    }
    let month: u32 = mm.parse().map_err(|_| invalid())?;
    let year: i32 = yy.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((month, 2000 + year))
}

/// A request to pay for a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
    pub amount: Money,
    pub card: CardDetails,
}

/// Payment row joined with its booking's hotel and room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub payment_id: Uuid,
    pub paid_at: DateTime<Utc>,
    pub hotel_name: String,
    pub room_id: Uuid,
    pub room_type: String,
    pub amount_paid: Money,
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_valid_card() {
        let card = CardDetails::new("4242 4242 4242 4242", "12/27", "123");
        assert!(card.validate(today()).is_ok());
        let amex = CardDetails::new("3782-822463-10005", "10/26", "1234");
        assert!(amex.validate(today()).is_ok());
    }

    #[test]
    fn test_luhn_failure() {
        let card = CardDetails::new("4242 4242 4242 4241", "12/27", "123");
        assert!(matches!(card.validate(today()), Err(Error::Validation(_))));
    }

    #[test]
    fn test_non_digit_number() {
        let card = CardDetails::new("4242-4242-abcd-4242", "12/27", "123");
        assert!(card.validate(today()).is_err());
    }

    #[test]
    fn test_expired_card() {
        let card = CardDetails::new("4242424242424242", "09/26", "123");
        let err = card.validate(today()).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_bad_expiry_and_cvc() {
        assert!(CardDetails::new("4242424242424242", "13/27", "123")
            .validate(today())
            .is_err());
        assert!(CardDetails::new("4242424242424242", "1227", "123")
            .validate(today())
            .is_err());
        assert!(CardDetails::new("4242424242424242", "12/27", "12")
            .validate(today())
            .is_err());
    }

    #[test]
    fn test_debug_masks_card() {
        let card = CardDetails::new("4242 4242 4242 4242", "12/27", "123");
        let shown = format!("{card:?}");
        assert!(shown.contains("****4242"));
        assert!(!shown.contains("4242 4242"));
        assert!(!shown.contains("123\""));
    }
}
