//! Route partitions and the router guard.
//!
//! Screens are split into a public partition (login, signup) and a protected
//! partition (everything under the admin dashboard). The guard watches the session
//! and replaces the current screen with the root of the right partition.

pub mod guard;
pub mod route;

pub use guard::{authorize, NavigationStack, Navigator, RouteDecision, RouterGuard};
pub use route::{Partition, Route};
