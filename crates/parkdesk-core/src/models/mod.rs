//! Data models exchanged with the ParkDesk API.
//!
//! This module contains:
//!
//! - `Credentials`, `SignupRequest`: authentication request bodies
//! - `Profile`: the signed-in administrator
//! - `Booking`, `BookingCategory`: slot reservations
//! - `ParkingArea`, `ParkingSlot`: the parking-area browser
//! - `NewArea`, `AreaDetails`, `ManagedSlot`: area and slot administration
//! - `OccupancyItem`, `RevenueItem`: report rows

pub mod auth;
pub mod booking;
pub mod parking;
pub mod report;

pub use auth::{Credentials, Profile, SignupRequest};
pub use booking::{Booking, BookingCategory};
pub use parking::{AreaDetails, ManagedSlot, NewArea, ParkingArea, ParkingSlot};
pub use report::{OccupancyItem, RevenueItem};
