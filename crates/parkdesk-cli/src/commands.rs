//! Command-line interface definitions for ParkDesk.
//!
//! # Example
//!
//! ```bash
//! parkdesk login admin@example.com
//! parkdesk bookings past
//! parkdesk area edit loc1 --total-slots 42
//! parkdesk manage-slots disable s9
//! ```

use clap::{Parser, Subcommand, ValueEnum};

use parkdesk_core::models::BookingCategory;
use parkdesk_core::routing::Route;

/// Command-line client for the parking administration portal.
#[derive(Debug, Parser)]
#[command(name = "parkdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which report to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Occupancy,
    Revenue,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show whether you are signed in
    Status,
    /// Sign in to the admin portal
    Login {
        /// Email address (defaults to PARKDESK_EMAIL, then the last one used)
        email: Option<String>,
    },
    /// Create an account
    Signup,
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in admin
    Profile,
    /// List bookings
    Bookings {
        /// active, past or all
        #[arg(default_value = "active")]
        category: BookingCategory,
    },
    /// List parking areas
    Areas,
    /// Add, show or edit a parking area
    Area {
        #[command(subcommand)]
        action: AreaAction,
    },
    /// Show slot occupancy for an area
    Slots {
        #[arg(value_name = "AREA_ID")]
        area_id: String,
    },
    /// List slots, or put one in or out of service
    ManageSlots {
        #[command(subcommand)]
        action: Option<SlotAction>,
    },
    /// Show a report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AreaAction {
    /// Add a parking area
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
    },
    /// Show the editable settings of an area
    Show {
        #[arg(value_name = "AREA_ID")]
        area_id: String,
    },
    /// Change an area's settings
    Edit {
        #[arg(value_name = "AREA_ID")]
        area_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_name = "N")]
        total_slots: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SlotAction {
    /// Put a slot back in service
    Enable {
        #[arg(value_name = "SLOT_ID")]
        slot_id: String,
    },
    /// Take a slot out of service
    Disable {
        #[arg(value_name = "SLOT_ID")]
        slot_id: String,
    },
}

impl Command {
    /// Screen this command corresponds to, if it is gated by the session.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::Signup => Some(Route::Signup),
            Command::Profile => Some(Route::Profile),
            Command::Bookings { .. } => Some(Route::Bookings),
            Command::Areas | Command::Slots { .. } => Some(Route::ParkingAreas),
            Command::Area {
                action: AreaAction::Add { .. },
            } => Some(Route::AddArea),
            Command::Area {
                action: AreaAction::Show { area_id } | AreaAction::Edit { area_id, .. },
            } => Some(Route::EditArea {
                area_id: area_id.clone(),
            }),
            Command::ManageSlots { .. } => Some(Route::ManageSlots),
            Command::Report {
                kind: ReportKind::Occupancy,
            } => Some(Route::OccupancyReport),
            Command::Report {
                kind: ReportKind::Revenue,
            } => Some(Route::RevenueReport),
            Command::Status | Command::Logout => None,
        }
    }
}
