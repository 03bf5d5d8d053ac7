//! Booking creation and administrative status changes

use tracing::{error, info, instrument};
use uuid::Uuid;

use super::cancellation::cancel_in;
use super::{availability, fare, BookingEngine};
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Actor, Booking, BookingRequest, BookingStatus, Stay};
use crate::permissions::{BookingAction, PermissionMatrix};
use crate::storage::{BookingRepository, Storage};

/// Validate, price and insert a booking. Must run inside a transaction.
fn place_booking<S>(store: &S, request: &BookingRequest, stay: &Stay, user_id: Uuid) -> Result<Booking>
where
    S: Storage + ?Sized,
{
    let room = store
        .find_room(request.room_id)?
        .ok_or_else(|| Error::NotFound("Room not found".to_string()))?;

    if room.hotel_id != request.hotel_id {
        return Err(Error::Validation(
            "Room does not belong to the selected hotel".to_string(),
        ));
    }
    if request.guests > room.max_people {
        return Err(Error::Validation(format!(
            "Room allows at most {} guests",
            room.max_people
        )));
    }

    if !availability::room_is_free(store, room.id, stay)? {
        return Err(Error::Conflict(
            "Room not available for selected dates".to_string(),
        ));
    }

    let booking = Booking::new(user_id, request, fare::fare_for(&room, stay)?);
    invariants::assert_booking_invariants(&booking);
    store.insert_booking(&booking)?;
    Ok(booking)
}

impl BookingEngine {
    /// Reserve a room for `user_id`. The booking starts `Pending` and unpaid.
    ///
    /// Availability is re-checked under the write lock, so two concurrent
    /// requests for overlapping dates cannot both succeed.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %user_id))]
    pub fn add_booking(&mut self, request: &BookingRequest, user_id: Uuid) -> Result<Booking> {
        invariants::assert_user_id_valid(user_id, "add_booking");
        let stay = request.stay()?;
        if request.guests == 0 {
            return Err(Error::Validation(
                "At least one guest is required".to_string(),
            ));
        }

        let result = self
            .db
            .transaction(|tx| place_booking(tx, request, &stay, user_id));

        match &result {
            Ok(booking) => info!(
                booking_id = %booking.id,
                total = %booking.total_amount,
                nights = stay.nights(),
                "Booking created"
            ),
            Err(e) if e.rejection().is_some() => info!(error = %e, "Booking rejected"),
            Err(e) => error!(error = %e, "Error adding booking"),
        }
        result
    }

    /// Administrative status override. Only cancellation is accepted: a booking
    /// is confirmed by paying for it, and nothing leaves `Cancelled`.
    /// Cancelling a paid booking refunds its payment.
    #[instrument(skip(self), fields(actor = %actor.user_id))]
    pub fn update_booking_status(
        &mut self,
        actor: &Actor,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking> {
        PermissionMatrix::require(actor, BookingAction::UpdateBookingStatus)?;

        let (booking, refund) = self.db.transaction(|tx| {
            let booking = tx
                .find_booking(booking_id)?
                .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;

            if !booking.status.can_transition_to(status) {
                return Err(Error::Conflict(format!(
                    "Cannot change booking from {} to {}",
                    booking.status, status
                )));
            }
            if status == BookingStatus::Confirmed {
                return Err(Error::Conflict(
                    "Bookings are confirmed by payment".to_string(),
                ));
            }
            cancel_in(tx, booking)
        })?;

        info!(
            booking_id = %booking.id,
            refunded = refund.is_some(),
            "Booking status updated"
        );
        self.notify(&booking, |notifier, to| {
            notifier.notify_booking_cancelled(&booking, refund.as_ref(), to)
        });
        Ok(booking)
    }
}
