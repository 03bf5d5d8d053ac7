//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible booking states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Money, Payment, PaymentStatus};

/// Validate that a booking row is internally consistent
pub fn assert_booking_invariants(booking: &Booking) {
    debug_assert!(
        booking.check_out > booking.check_in,
        "Booking {} checks out {} on or before check-in {}",
        booking.id,
        booking.check_out,
        booking.check_in
    );

    debug_assert!(booking.guests >= 1, "Booking {} has no guests", booking.id);

    debug_assert!(
        !booking.total_amount.cents().is_negative(),
        "Booking {} has negative total {}",
        booking.id,
        booking.total_amount
    );

    // Paid bookings never sit in Pending
    debug_assert!(
        !(booking.is_paid && booking.status == BookingStatus::Pending),
        "Booking {} is paid but still Pending",
        booking.id
    );
}

/// Validate that a payment belongs to the booking and covers its total
pub fn assert_payment_matches_booking(payment: &Payment, booking: &Booking, tolerance: Money) {
    debug_assert!(
        payment.booking_id == booking.id,
        "Payment {} points at booking {}, expected {}",
        payment.id,
        payment.booking_id,
        booking.id
    );

    debug_assert!(
        payment.amount_paid.abs_diff(booking.total_amount) <= tolerance,
        "Payment {} of {} does not cover booking total {}",
        payment.id,
        payment.amount_paid,
        booking.total_amount
    );
}

/// Validate that a refunded payment leaves its booking cancelled
pub fn assert_refund_consistent(payment: &Payment, booking: &Booking) {
    debug_assert!(
        payment.status != PaymentStatus::Refunded || booking.is_cancelled(),
        "Payment {} refunded but booking {} is {}",
        payment.id,
        booking.id,
        booking.status
    );
}

/// Validate that a user ID is not nil
pub fn assert_user_id_valid(user_id: Uuid, context: &str) {
    debug_assert!(
        user_id != Uuid::nil(),
        "Nil user_id in context: {}",
        context
    );
}
