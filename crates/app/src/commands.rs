//! Command-line commands and their dispatch onto the engine

use chrono::NaiveDate;
use haven_core::{
    Actor, BookingEngine, BookingRequest, BookingStatus, CardDetails, CatalogRepository, Error,
    Hotel, Money, PaymentRequest, Result, Role, Room, User,
};
use serde_json::{json, Value};
use uuid::Uuid;

pub const USAGE: &str = "\
usage: haven <command> [args]

commands:
  seed-demo                                        create a demo hotel, rooms and users
  fare <room> <check-in> <check-out> [guests]      price a stay
  available <room> <check-in> <check-out>          check room availability
  book <user> <hotel> <room> <check-in> <check-out> <guests>
  pay <booking> <amount> <card-number> <MM/YY> <cvc>
  cancel <booking> <user>
  booking <booking>
  bookings <user>
  payments <user>
  all-bookings <actor>
  all-payments <actor>
  status <actor> <booking> <Pending|Confirmed|Cancelled>
  refund <actor> <payment>

dates are YYYY-MM-DD; ids are UUIDs";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SeedDemo,
    Fare {
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    },
    Available {
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    Book {
        user_id: Uuid,
        request: BookingRequestArgs,
    },
    Pay {
        booking_id: Uuid,
        amount: Money,
        number: String,
        expiry: String,
        cvc: String,
    },
    Cancel {
        booking_id: Uuid,
        user_id: Uuid,
    },
    Booking(Uuid),
    Bookings(Uuid),
    Payments(Uuid),
    AllBookings(Uuid),
    AllPayments(Uuid),
    Status {
        actor_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    },
    Refund {
        actor_id: Uuid,
        payment_id: Uuid,
    },
}

/// Booking request fields as parsed from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequestArgs {
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}

impl From<BookingRequestArgs> for BookingRequest {
    fn from(args: BookingRequestArgs) -> Self {
        BookingRequest {
            hotel_id: args.hotel_id,
            room_id: args.room_id,
            check_in: args.check_in,
            check_out: args.check_out,
            guests: args.guests,
        }
    }
}

fn usage_error(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}

fn uuid_arg(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| usage_error(format!("Not a valid id: {s}")))
}

fn date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| usage_error(format!("Not a valid date (YYYY-MM-DD): {s}")))
}

fn count_arg(s: &str) -> Result<u32> {
    s.parse()
        .map_err(|_| usage_error(format!("Not a valid guest count: {s}")))
}

impl Command {
    /// Parse arguments after the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["seed-demo"] => Command::SeedDemo,
            ["fare", room, check_in, check_out] => Command::Fare {
                room_id: uuid_arg(room)?,
                check_in: date_arg(check_in)?,
                check_out: date_arg(check_out)?,
                guests: 1,
            },
            ["fare", room, check_in, check_out, guests] => Command::Fare {
                room_id: uuid_arg(room)?,
                check_in: date_arg(check_in)?,
                check_out: date_arg(check_out)?,
                guests: count_arg(guests)?,
            },
            ["available", room, check_in, check_out] => Command::Available {
                room_id: uuid_arg(room)?,
                check_in: date_arg(check_in)?,
                check_out: date_arg(check_out)?,
            },
            ["book", user, hotel, room, check_in, check_out, guests] => Command::Book {
                user_id: uuid_arg(user)?,
                request: BookingRequestArgs {
                    hotel_id: uuid_arg(hotel)?,
                    room_id: uuid_arg(room)?,
                    check_in: date_arg(check_in)?,
                    check_out: date_arg(check_out)?,
                    guests: count_arg(guests)?,
                },
            },
            ["pay", booking, amount, number, expiry, cvc] => Command::Pay {
                booking_id: uuid_arg(booking)?,
                amount: Money::parse(amount)?,
                number: number.to_string(),
                expiry: expiry.to_string(),
                cvc: cvc.to_string(),
            },
            ["cancel", booking, user] => Command::Cancel {
                booking_id: uuid_arg(booking)?,
                user_id: uuid_arg(user)?,
            },
            ["booking", booking] => Command::Booking(uuid_arg(booking)?),
            ["bookings", user] => Command::Bookings(uuid_arg(user)?),
            ["payments", user] => Command::Payments(uuid_arg(user)?),
            ["all-bookings", actor] => Command::AllBookings(uuid_arg(actor)?),
            ["all-payments", actor] => Command::AllPayments(uuid_arg(actor)?),
            ["status", actor, booking, status] => Command::Status {
                actor_id: uuid_arg(actor)?,
                booking_id: uuid_arg(booking)?,
                status: BookingStatus::from_str(status)
                    .ok_or_else(|| usage_error(format!("Unknown booking status: {status}")))?,
            },
            ["refund", actor, payment] => Command::Refund {
                actor_id: uuid_arg(actor)?,
                payment_id: uuid_arg(payment)?,
            },
            _ => return Err(usage_error(USAGE)),
        };
        Ok(command)
    }

    /// Run the command and render its result as JSON
    pub fn run(self, engine: &mut BookingEngine) -> Result<Value> {
        let value = match self {
            Command::SeedDemo => seed_demo(engine)?,
            Command::Fare {
                room_id,
                check_in,
                check_out,
                guests,
            } => {
                let total = engine.calculate_total_fare(room_id, check_in, check_out, guests)?;
                json!({ "room_id": room_id, "total": total.to_string() })
            }
            Command::Available {
                room_id,
                check_in,
                check_out,
            } => {
                let available = engine.is_room_available(room_id, check_in, check_out)?;
                json!({ "room_id": room_id, "available": available })
            }
            Command::Book { user_id, request } => {
                serde_json::to_value(engine.add_booking(&request.into(), user_id)?)?
            }
            Command::Pay {
                booking_id,
                amount,
                number,
                expiry,
                cvc,
            } => serde_json::to_value(engine.process_payment(&PaymentRequest {
                booking_id,
                amount,
                card: CardDetails::new(number, expiry, cvc),
            })?)?,
            Command::Cancel {
                booking_id,
                user_id,
            } => serde_json::to_value(engine.cancel_booking(booking_id, user_id)?)?,
            Command::Booking(id) => serde_json::to_value(engine.get_booking(id)?)?,
            Command::Bookings(user_id) => serde_json::to_value(engine.get_user_bookings(user_id)?)?,
            Command::Payments(user_id) => {
                serde_json::to_value(engine.get_user_payment_history(user_id)?)?
            }
            Command::AllBookings(actor_id) => {
                let actor = resolve_actor(engine, actor_id)?;
                serde_json::to_value(engine.get_all_booking_details(&actor)?)?
            }
            Command::AllPayments(actor_id) => {
                let actor = resolve_actor(engine, actor_id)?;
                serde_json::to_value(engine.get_payment_history(&actor)?)?
            }
            Command::Status {
                actor_id,
                booking_id,
                status,
            } => {
                let actor = resolve_actor(engine, actor_id)?;
                serde_json::to_value(engine.update_booking_status(&actor, booking_id, status)?)?
            }
            Command::Refund {
                actor_id,
                payment_id,
            } => {
                let actor = resolve_actor(engine, actor_id)?;
                serde_json::to_value(engine.process_refund(&actor, payment_id)?)?
            }
        };
        Ok(value)
    }
}

/// Look up the caller's role in the users table
fn resolve_actor(engine: &BookingEngine, user_id: Uuid) -> Result<Actor> {
    let user = engine
        .database()
        .find_user(user_id)?
        .ok_or_else(|| Error::PermissionDenied(format!("Unknown user {user_id}")))?;
    Ok(Actor::new(user.id, user.role))
}

fn seed_demo(engine: &BookingEngine) -> Result<Value> {
    let catalog = engine.database().catalog();

    let admin = User::new("Haven Admin", "admin@haven.example", Role::Admin);
    let owner = User::new("Meera Owner", "owner@haven.example", Role::HotelOwner);
    let guest = User::new("Sam Guest", "guest@haven.example", Role::Guest);
    for user in [&admin, &owner, &guest] {
        catalog.create_user(user)?;
    }

    let hotel = Hotel::new("Cozy Haven", "Manali").with_owner(owner.id);
    catalog.create_hotel(&hotel)?;

    let rooms = [
        Room::new(hotel.id, "Standard", 2, Money::from_major(100)),
        Room::new(hotel.id, "Deluxe", 3, Money::from_major(160)).with_bed_type("King"),
        Room::new(hotel.id, "Family Suite", 5, Money::from_cents(24_950)).with_bed_type("Twin"),
    ];
    for room in &rooms {
        catalog.create_room(room)?;
    }

    Ok(json!({
        "admin_id": admin.id,
        "owner_id": owner.id,
        "guest_id": guest.id,
        "hotel_id": hotel.id,
        "room_ids": rooms.iter().map(|r| r.id).collect::<Vec<_>>(),
    }))
}
