//! Typed results for operations whose business failures are not errors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RejectionKind;

/// Result of `process_payment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub success: bool,
    pub message: String,
    pub payment_id: Option<Uuid>,
    pub rejection: Option<RejectionKind>,
}

impl PaymentResult {
    pub fn completed(payment_id: Uuid) -> Self {
        Self {
            success: true,
            message: "Payment processed successfully".to_string(),
            payment_id: Some(payment_id),
            rejection: None,
        }
    }

    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payment_id: None,
            rejection: Some(kind),
        }
    }
}

/// Result of `cancel_booking`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationResult {
    pub success: bool,
    pub message: String,
    /// Payment flipped to `Refunded` by this cancellation, if any
    pub refunded_payment_id: Option<Uuid>,
    pub rejection: Option<RejectionKind>,
}

impl CancellationResult {
    pub fn cancelled(refunded_payment_id: Option<Uuid>) -> Self {
        Self {
            success: true,
            message: "Booking cancelled successfully. Refund processed if applicable.".to_string(),
            refunded_payment_id,
            rejection: None,
        }
    }

    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            refunded_payment_id: None,
            rejection: Some(kind),
        }
    }
}

/// Result of the administrative `process_refund`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundResult {
    pub success: bool,
    pub message: String,
    pub rejection: Option<RejectionKind>,
}

impl RefundResult {
    pub fn refunded() -> Self {
        Self {
            success: true,
            message: "Refund processed successfully".to_string(),
            rejection: None,
        }
    }

    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            rejection: Some(kind),
        }
    }
}
