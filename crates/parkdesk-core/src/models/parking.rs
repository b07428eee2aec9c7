use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A parking location shown in the area browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingArea {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// A single slot within a parking area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSlot {
    pub id: String,
    pub slot_number: u32,
    pub row_name: String,
    #[serde(default)]
    pub is_occupied: bool,
}

impl ParkingSlot {
    /// Short label such as `B7`.
    pub fn label(&self) -> String {
        format!("{}{}", self.row_name, self.slot_number)
    }
}

/// Count occupied slots.
pub fn occupied_count(slots: &[ParkingSlot]) -> usize {
    slots.iter().filter(|s| s.is_occupied).count()
}

/// Body of `POST /admin/areas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArea {
    pub name: String,
    pub location: String,
}

impl NewArea {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            location: location.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.location.is_empty() {
            bail!("Both name and location are required.");
        }
        Ok(())
    }
}

/// Editable settings of one area, read from and written back to `/areas/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDetails {
    pub area_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub total_slots: u32,
}

impl AreaDetails {
    pub fn validate(&self) -> Result<()> {
        if self.area_name.trim().is_empty() || self.location.trim().is_empty() {
            bail!("Area name and location are required.");
        }
        Ok(())
    }
}

/// A slot as listed on the slot management screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedSlot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}
