//! Payment processing
//!
//! Paying records a completed payment and flips the booking to paid and
//! confirmed in one transaction. Card data is checked for shape only.

use chrono::NaiveDate;
use tracing::{error, info, instrument};

use super::BookingEngine;
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Booking, BookingStatus, Money, Payment, PaymentRequest, PaymentResult};
use crate::storage::Storage;

/// Check the request against the booking and record the payment.
/// Must run inside a transaction.
fn settle<S>(
    store: &S,
    request: &PaymentRequest,
    tolerance: Money,
    currency: &str,
    today: NaiveDate,
) -> Result<(Booking, Payment)>
where
    S: Storage + ?Sized,
{
    let mut booking = store
        .find_booking(request.booking_id)?
        .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;

    if booking.is_paid {
        return Err(Error::Conflict("Booking is already paid".to_string()));
    }
    if booking.is_cancelled() {
        return Err(Error::Conflict("Booking is cancelled".to_string()));
    }
    if request.amount.abs_diff(booking.total_amount) > tolerance {
        return Err(Error::Validation(
            "Payment amount doesn't match booking total".to_string(),
        ));
    }
    request.card.validate(today)?;

    let payment = Payment::completed(booking.id, request.amount, currency);
    store.insert_payment(&payment)?;
    if !store.mark_booking_paid(booking.id)? {
        return Err(Error::Conflict("Booking is already paid".to_string()));
    }
    booking.is_paid = true;
    booking.status = BookingStatus::Confirmed;

    invariants::assert_booking_invariants(&booking);
    invariants::assert_payment_matches_booking(&payment, &booking, tolerance);
    Ok((booking, payment))
}

impl BookingEngine {
    /// Pay for a pending booking.
    ///
    /// Business rule failures (unknown booking, already paid, amount
    /// mismatch, bad card) come back as an unsuccessful result and leave
    /// no trace in storage.
    #[instrument(skip(self, request), fields(booking_id = %request.booking_id, amount = %request.amount))]
    pub fn process_payment(&mut self, request: &PaymentRequest) -> Result<PaymentResult> {
        let tolerance = self.tolerance();
        let today = self.clock.today();
        let currency = self.policy.currency.clone();

        let result = self
            .db
            .transaction(|tx| settle(tx, request, tolerance, &currency, today));

        match result {
            Ok((booking, payment)) => {
                info!(payment_id = %payment.id, card = %request.card.last4(), "Payment processed");
                self.notify(&booking, |notifier, to| {
                    notifier.notify_payment_confirmed(&booking, &payment, to)
                });
                Ok(PaymentResult::completed(payment.id))
            }
            Err(e) => match e.into_rejection() {
                Ok((kind, message)) => {
                    info!(reason = %message, "Payment rejected");
                    Ok(PaymentResult::rejected(kind, message))
                }
                Err(e) => {
                    error!(error = %e, "Error processing payment");
                    Err(e)
                }
            },
        }
    }
}
