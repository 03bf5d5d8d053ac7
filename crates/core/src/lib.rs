//! Haven Core Library
//!
//! Booking lifecycle, payments, cancellations and storage for Haven hotel
//! reservations.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod models;
pub mod notify;
pub mod permissions;
pub mod storage;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{BookingPolicy, DatabaseConfig, HavenConfig, MAX_CANCELLATION_WINDOW_HOURS};
pub use engine::BookingEngine;
pub use error::{Error, RejectionKind, Result};
pub use models::*;
pub use notify::{Notice, Notifier, Recipient, TracingNotifier};
pub use permissions::*;
pub use storage::{
    BookingRepository, CatalogRepository, Database, PaymentRepository, Storage,
    DEFAULT_BUSY_TIMEOUT,
};
