//! One collaborator trait per admin resource.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AreaDetails, Booking, BookingCategory, ManagedSlot, NewArea, OccupancyItem, ParkingArea,
    ParkingSlot, Profile, RevenueItem,
};

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self) -> Result<Profile>;
}

#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch_bookings(&self, category: BookingCategory) -> Result<Vec<Booking>>;
}

#[async_trait]
pub trait ParkingSource: Send + Sync {
    async fn fetch_areas(&self) -> Result<Vec<ParkingArea>>;

    async fn fetch_slots(&self, area_id: &str) -> Result<Vec<ParkingSlot>>;

    /// Editable settings of one area.
    async fn fetch_area(&self, area_id: &str) -> Result<AreaDetails>;

    async fn create_area(&self, area: &NewArea) -> Result<()>;

    async fn update_area(&self, area_id: &str, details: &AreaDetails) -> Result<()>;

    /// Every slot with its in-service flag.
    async fn fetch_managed_slots(&self) -> Result<Vec<ManagedSlot>>;

    /// Put a slot in or out of service.
    async fn set_slot_active(&self, slot_id: &str, active: bool) -> Result<()>;
}

#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_occupancy(&self) -> Result<Vec<OccupancyItem>>;

    async fn fetch_revenue(&self) -> Result<Vec<RevenueItem>>;
}
