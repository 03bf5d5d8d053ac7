//! Guest notifications
//!
//! Notifications are sent after the owning transaction has committed. A
//! failing notifier is logged by the caller and never undoes the state change.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::{Booking, Hotel, Payment, User};

/// Who a notification goes to, resolved from the catalog after commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub full_name: String,
    pub email: String,
    pub hotel_name: String,
}

impl Recipient {
    pub fn new(user: &User, hotel: Option<&Hotel>) -> Self {
        Self {
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            hotel_name: hotel.map(|h| h.name.clone()).unwrap_or_default(),
        }
    }
}

/// A rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notice {
    pub fn payment_confirmed(booking: &Booking, payment: &Payment, to: &Recipient) -> Self {
        Self {
            to: to.email.clone(),
            subject: format!("Payment Confirmation for Booking #{}", booking.id),
            body: format!(
                "Dear {name},\n\
                 Thank you for your payment. Your booking at {hotel} has been confirmed.\n\
                 \n\
                 Booking ID: {id}\n\
                 Room: {room}\n\
                 Check-in: {check_in}\n\
                 Check-out: {check_out}\n\
                 \n\
                 Payment ID: {payment_id}\n\
                 Amount Paid: {amount} {currency}\n\
                 Payment Date: {paid}\n\
                 Payment Status: {status}\n",
                name = to.full_name,
                hotel = to.hotel_name,
                id = booking.id,
                room = booking.room_id,
                check_in = booking.check_in,
                check_out = booking.check_out,
                payment_id = payment.id,
                amount = payment.amount_paid,
                currency = payment.currency,
                paid = payment.paid_at.date_naive(),
                status = payment.status,
            ),
        }
    }

    pub fn booking_cancelled(booking: &Booking, refund: Option<&Payment>, to: &Recipient) -> Self {
        let refund_line = match refund {
            Some(payment) => format!(
                "A refund of {} {} will be processed to your original payment method within 5-7 business days.",
                payment.amount_paid, payment.currency
            ),
            None => "No payment was made, so no refund is required.".to_string(),
        };
        Self {
            to: to.email.clone(),
            subject: format!("Booking Cancellation Confirmation #{}", booking.id),
            body: format!(
                "Dear {name},\n\
                 Your booking #{id} at {hotel} has been successfully cancelled.\n\
                 \n\
                 Check-in: {check_in}\n\
                 Check-out: {check_out}\n\
                 \n\
                 {refund_line}\n",
                name = to.full_name,
                id = booking.id,
                hotel = to.hotel_name,
                check_in = booking.check_in,
                check_out = booking.check_out,
            ),
        }
    }

    pub fn refund_processed(booking: &Booking, payment: &Payment, to: &Recipient) -> Self {
        Self {
            to: to.email.clone(),
            subject: format!("Refund Confirmation for Booking #{}", booking.id),
            body: format!(
                "Dear {name},\n\
                 Your refund for booking #{id} has been processed.\n\
                 \n\
                 Hotel: {hotel}\n\
                 Original Check-in: {check_in}\n\
                 Amount Refunded: {amount} {currency}\n\
                 \n\
                 Please allow 5-7 business days for the refund to appear in your account.\n",
                name = to.full_name,
                id = booking.id,
                hotel = to.hotel_name,
                check_in = booking.check_in,
                amount = payment.amount_paid,
                currency = payment.currency,
            ),
        }
    }
}

/// Outbound guest messaging
pub trait Notifier: Send + Sync {
    fn notify_payment_confirmed(&self, booking: &Booking, payment: &Payment, to: &Recipient) -> Result<()>;

    /// `refund` is the payment flipped to refunded by this cancellation, if any
    fn notify_booking_cancelled(&self, booking: &Booking, refund: Option<&Payment>, to: &Recipient) -> Result<()>;

    fn notify_refund_processed(&self, booking: &Booking, payment: &Payment, to: &Recipient) -> Result<()>;
}

/// Writes notices to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    fn emit(notice: &Notice) {
        info!(to = %notice.to, subject = %notice.subject, "Notification");
    }
}

impl Notifier for TracingNotifier {
    fn notify_payment_confirmed(&self, booking: &Booking, payment: &Payment, to: &Recipient) -> Result<()> {
        Self::emit(&Notice::payment_confirmed(booking, payment, to));
        Ok(())
    }

    fn notify_booking_cancelled(&self, booking: &Booking, refund: Option<&Payment>, to: &Recipient) -> Result<()> {
        Self::emit(&Notice::booking_cancelled(booking, refund, to));
        Ok(())
    }

    fn notify_refund_processed(&self, booking: &Booking, payment: &Payment, to: &Recipient) -> Result<()> {
        Self::emit(&Notice::refund_processed(booking, payment, to));
        Ok(())
    }
}
