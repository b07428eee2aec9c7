use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A slot reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub area_name: String,
    pub slot_number: u32,
    pub user: String,
    pub start_time: String,
    pub end_time: String,
}

/// Booking list filter, one endpoint each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingCategory {
    #[default]
    Active,
    Past,
    All,
}

impl BookingCategory {
    /// API path segment for this category.
    pub fn path(&self) -> &'static str {
        match self {
            BookingCategory::Active => "bookings/active",
            BookingCategory::Past => "bookings/past",
            BookingCategory::All => "bookings/all",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BookingCategory::Active => "Active",
            BookingCategory::Past => "Past",
            BookingCategory::All => "All",
        }
    }
}

impl fmt::Display for BookingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for BookingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BookingCategory::Active),
            "past" => Ok(BookingCategory::Past),
            "all" => Ok(BookingCategory::All),
            other => Err(format!(
                "Unknown booking category '{}' (expected active, past or all)",
                other
            )),
        }
    }
}
