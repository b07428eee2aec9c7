use serde::{Deserialize, Serialize};

/// Occupancy of one parking area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyItem {
    pub area_id: String,
    pub area_name: String,
    pub occupied: u32,
    pub total: u32,
}

impl OccupancyItem {
    /// Occupied share in percent, 0 for an area with no slots.
    pub fn rate_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.occupied) * 100.0 / f64::from(self.total)
        }
    }

    pub fn available(&self) -> u32 {
        self.total.saturating_sub(self.occupied)
    }
}

/// One revenue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueItem {
    pub report_id: String,
    pub date: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sum of all revenue amounts.
pub fn total_revenue(items: &[RevenueItem]) -> f64 {
    items.iter().map(|i| i.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(occupied: u32, total: u32) -> OccupancyItem {
        OccupancyItem {
            area_id: "a1".into(),
            area_name: "Library Parking".into(),
            occupied,
            total,
        }
    }

    #[test]
    fn test_occupancy_rate() {
        assert_eq!(area(25, 100).rate_percent(), 25.0);
        assert_eq!(area(0, 0).rate_percent(), 0.0);
        assert_eq!(area(30, 40).available(), 10);
        // Bad data from the server never underflows
        assert_eq!(area(50, 40).available(), 0);
    }

    #[test]
    fn test_total_revenue() {
        let json = r#"[{"reportId":"r1","date":"2024-05-01","amount":120.5},{"reportId":"r2","date":"2024-05-02","amount":79.5,"description":"Event day"}]"#;
        let items: Vec<RevenueItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[1].description.as_deref(), Some("Event day"));
        assert_eq!(total_revenue(&items), 200.0);
    }
}
