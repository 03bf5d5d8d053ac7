//! Data models for Haven

mod booking;
mod catalog;
mod money;
mod outcome;
mod payment;
mod user;

pub use booking::*;
pub use catalog::*;
pub use money::*;
pub use outcome::*;
pub use payment::*;
pub use user::*;
