//! Permission system for administrative booking operations
//!
//! Guest-facing operations (book, pay, cancel own booking) are open to every
//! authenticated user; ownership is checked by the operation itself.

use crate::error::{Error, Result};
use crate::models::{Actor, Role};

/// Operations that go beyond a guest's own bookings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    /// List every booking
    ViewAllBookings,
    /// List every booking joined with hotel names
    ViewBookingDetails,
    /// Force a booking status change
    UpdateBookingStatus,
    /// Payment history across all users
    ViewAllPayments,
    /// Refund a payment outside the guest cancellation flow
    RefundPayment,
}

/// Permission matrix for account roles
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if a role has permission to perform an action
    pub fn can_perform(role: Role, action: BookingAction) -> bool {
        match action {
            // Listings - staff
            BookingAction::ViewAllBookings => matches!(role, Role::Admin | Role::HotelOwner),
            BookingAction::ViewBookingDetails => matches!(role, Role::Admin | Role::HotelOwner),

            // Money and overrides - Admin only
            BookingAction::UpdateBookingStatus => role == Role::Admin,
            BookingAction::ViewAllPayments => role == Role::Admin,
            BookingAction::RefundPayment => role == Role::Admin,
        }
    }

    /// Fail with `PermissionDenied` unless the actor may perform the action
    pub fn require(actor: &Actor, action: BookingAction) -> Result<()> {
        if Self::can_perform(actor.role, action) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "{} may not perform {:?}",
                actor.role.as_str(),
                action
            )))
        }
    }
}
