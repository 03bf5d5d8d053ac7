//! Guest cancellation and administrative refunds
//!
//! A booking is cancelled and its completed payment (if any) flipped to
//! `Refunded` in the same transaction. `is_paid` stays set on cancelled
//! bookings as a record that money once changed hands.

use chrono::Duration;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::BookingEngine;
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Actor, Booking, BookingStatus, CancellationResult, Payment, PaymentStatus, RefundResult};
use crate::permissions::{BookingAction, PermissionMatrix};
use crate::storage::{BookingRepository, PaymentRepository, Storage};

/// Cancel a live booking and refund its payment. Must run inside a transaction.
pub(super) fn cancel_in<S>(store: &S, mut booking: Booking) -> Result<(Booking, Option<Payment>)>
where
    S: Storage + ?Sized,
{
    if !store.mark_booking_cancelled(booking.id)? {
        return Err(Error::Conflict("Booking is already cancelled".to_string()));
    }
    booking.status = BookingStatus::Cancelled;

    let mut refund = None;
    if booking.is_paid {
        if let Some(mut payment) = store.find_payment_for_booking(booking.id)? {
            if payment.status == PaymentStatus::Completed && store.mark_payment_refunded(payment.id)? {
                payment.status = PaymentStatus::Refunded;
                info!(payment_id = %payment.id, amount = %payment.amount_paid, "Refund recorded");
                invariants::assert_refund_consistent(&payment, &booking);
                refund = Some(payment);
            }
        }
    }

    Ok((booking, refund))
}

impl BookingEngine {
    /// Cancel a booking on behalf of its owner.
    ///
    /// Allowed until `cancellation_window_hours` before the start of the
    /// check-in day. Business rule failures come back as an unsuccessful
    /// result, never as an error.
    #[instrument(skip(self))]
    pub fn cancel_booking(
        &mut self,
        booking_id: Uuid,
        requesting_user_id: Uuid,
    ) -> Result<CancellationResult> {
        let now = self.clock.now();
        let window_hours = self.policy.cancellation_window_hours;

        let result = self.db.transaction(|tx| {
            let booking = tx
                .find_booking(booking_id)?
                .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;

            if booking.user_id != requesting_user_id {
                return Err(Error::Conflict(
                    "You can only cancel your own bookings".to_string(),
                ));
            }
            if booking.status.is_terminal() {
                return Err(Error::Conflict("Booking is already cancelled".to_string()));
            }

            let deadline = Duration::try_hours(window_hours)
                .and_then(|window| booking.check_in_at().checked_sub_signed(window))
                .ok_or_else(|| {
                    Error::Config(format!(
                        "cancellation_window_hours {window_hours} is out of range"
                    ))
                })?;
            if now > deadline {
                return Err(Error::Conflict(format!(
                    "Cancellation is not allowed within {} hours of check-in",
                    window_hours
                )));
            }

            cancel_in(tx, booking)
        });

        match result {
            Ok((booking, refund)) => {
                info!(
                    booking_id = %booking.id,
                    refunded = refund.is_some(),
                    "Booking cancelled"
                );
                self.notify(&booking, |notifier, to| {
                    notifier.notify_booking_cancelled(&booking, refund.as_ref(), to)
                });
                Ok(CancellationResult::cancelled(refund.map(|p| p.id)))
            }
            Err(e) => match e.into_rejection() {
                Ok((kind, message)) => {
                    info!(%booking_id, reason = %message, "Cancellation rejected");
                    Ok(CancellationResult::rejected(kind, message))
                }
                Err(e) => {
                    error!(%booking_id, error = %e, "Error cancelling booking");
                    Err(e)
                }
            },
        }
    }

    /// Refund a completed payment outside the guest flow. The booking is
    /// cancelled with it; no cancellation window applies.
    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub fn process_refund(&mut self, actor: &Actor, payment_id: Uuid) -> Result<RefundResult> {
        PermissionMatrix::require(actor, BookingAction::RefundPayment)?;

        let result = self.db.transaction(|tx| {
            let mut payment = tx
                .find_payment(payment_id)?
                .ok_or_else(|| Error::NotFound("Payment not found".to_string()))?;

            if payment.status != PaymentStatus::Completed || !tx.mark_payment_refunded(payment.id)? {
                return Err(Error::Conflict(
                    "Only completed payments can be refunded".to_string(),
                ));
            }
            payment.status = PaymentStatus::Refunded;

            let mut booking = tx
                .find_booking(payment.booking_id)?
                .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;
            if !booking.is_cancelled() {
                tx.mark_booking_cancelled(booking.id)?;
                booking.status = BookingStatus::Cancelled;
            }

            invariants::assert_refund_consistent(&payment, &booking);
            Ok((booking, payment))
        });

        match result {
            Ok((booking, payment)) => {
                info!(
                    payment_id = %payment.id,
                    booking_id = %booking.id,
                    amount = %payment.amount_paid,
                    "Refund processed"
                );
                self.notify(&booking, |notifier, to| {
                    notifier.notify_refund_processed(&booking, &payment, to)
                });
                Ok(RefundResult::refunded())
            }
            Err(e) => match e.into_rejection() {
                Ok((kind, message)) => {
                    info!(%payment_id, reason = %message, "Refund rejected");
                    Ok(RefundResult::rejected(kind, message))
                }
                Err(e) => {
                    error!(%payment_id, error = %e, "Error processing refund");
                    Err(e)
                }
            },
        }
    }
}
