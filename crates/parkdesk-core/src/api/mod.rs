//! REST API client module for the ParkDesk backend.
//!
//! This module provides the `ApiClient` for talking to the parking
//! administration API: login and signup (as the session `Authenticator`),
//! and one collaborator trait per admin resource so screens can be tested
//! against fakes.
//!
//! Admin endpoints use bearer token authentication with the token issued
//! by `POST /login`.

pub mod client;
pub mod error;
pub mod sources;

pub use client::ApiClient;
pub use error::ApiError;
pub use sources::{BookingSource, ParkingSource, ProfileSource, ReportSource};
