//! Plain-text rendering of admin data.

use std::collections::BTreeMap;

use parkdesk_core::models::{
    report::total_revenue, AreaDetails, Booking, ManagedSlot, OccupancyItem, ParkingArea,
    ParkingSlot, Profile, RevenueItem,
};

/// Widest area name shown before truncation
const AREA_NAME_WIDTH: usize = 22;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

pub fn format_profile(profile: &Profile) -> String {
    format!("Name:  {}\nEmail: {}", profile.name, profile.email)
}

pub fn format_bookings(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "No bookings found.".to_string();
    }

    let mut lines = vec![format!(
        "{:<w$}  {:>4}  {:<16}  {:<19}  {:<19}",
        "Area",
        "Slot",
        "User",
        "Start",
        "End",
        w = AREA_NAME_WIDTH
    )];
    for b in bookings {
        lines.push(format!(
            "{:<w$}  {:>4}  {:<16}  {:<19}  {:<19}",
            truncate_string(&b.area_name, AREA_NAME_WIDTH),
            b.slot_number,
            truncate_string(&b.user, 16),
            format_date(&b.start_time),
            format_date(&b.end_time),
            w = AREA_NAME_WIDTH
        ));
    }
    lines.join("\n")
}

pub fn format_areas(areas: &[ParkingArea]) -> String {
    if areas.is_empty() {
        return "No parking areas configured.".to_string();
    }
    areas
        .iter()
        .map(|a| format!("{:<10}  {}", a.id, a.display_name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per row, `X` for occupied and `.` for free, then a summary.
pub fn format_slots(slots: &[ParkingSlot]) -> String {
    if slots.is_empty() {
        return "No slots in this area.".to_string();
    }

    let mut rows: BTreeMap<&str, Vec<&ParkingSlot>> = BTreeMap::new();
    for slot in slots {
        rows.entry(slot.row_name.as_str()).or_default().push(slot);
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (row, mut row_slots) in rows {
        row_slots.sort_by_key(|s| s.slot_number);
        let cells: String = row_slots
            .iter()
            .map(|s| if s.is_occupied { 'X' } else { '.' })
            .collect();
        lines.push(format!("{:<3} {}", row, cells));
    }

    let occupied = parkdesk_core::models::parking::occupied_count(slots);
    lines.push(format!(
        "{} of {} slots occupied, {} free",
        occupied,
        slots.len(),
        slots.len() - occupied
    ));
    lines.join("\n")
}

pub fn format_area_details(details: &AreaDetails) -> String {
    format!(
        "Name:     {}\nLocation: {}\nSlots:    {}",
        details.area_name, details.location, details.total_slots
    )
}

pub fn format_managed_slots(slots: &[ManagedSlot]) -> String {
    if slots.is_empty() {
        return "No slots configured.".to_string();
    }
    slots
        .iter()
        .map(|s| {
            let status = if s.is_active { "active" } else { "inactive" };
            format!("{:<10}  {:<8}  {}", s.id, s.name, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_occupancy(items: &[OccupancyItem]) -> String {
    if items.is_empty() {
        return "No occupancy data.".to_string();
    }
    items
        .iter()
        .map(|i| {
            format!(
                "{:<w$}  {:>4}/{:<4}  {:>5.1}%",
                truncate_string(&i.area_name, AREA_NAME_WIDTH),
                i.occupied,
                i.total,
                i.rate_percent(),
                w = AREA_NAME_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_revenue(items: &[RevenueItem]) -> String {
    if items.is_empty() {
        return "No revenue recorded.".to_string();
    }
    let mut lines: Vec<String> = items
        .iter()
        .map(|i| {
            format!(
                "{:<14}  {:>10.2}  {}",
                format_date(&i.date),
                i.amount,
                i.description.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string()
        })
        .collect();
    lines.push(format!("{:<14}  {:>10.2}", "Total", total_revenue(items)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(row: &str, number: u32, occupied: bool) -> ParkingSlot {
        ParkingSlot {
            id: format!("{}{}", row, number),
            slot_number: number,
            row_name: row.to_string(),
            is_occupied: occupied,
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Ölçü Parkı", 7), "Ölçü...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01T09:30:00Z"), "May 01, 2024 09:30");
        assert_eq!(format_date("2024-05-01"), "May 01, 2024");
        assert_eq!(format_date("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_format_slots_grid() {
        let slots = vec![
            slot("B", 2, false),
            slot("A", 2, true),
            slot("A", 1, false),
            slot("B", 1, true),
        ];
        assert_eq!(
            format_slots(&slots),
            "A   .X\nB   X.\n2 of 4 slots occupied, 2 free"
        );
    }

    #[test]
    fn test_format_revenue_total() {
        let items = vec![
            RevenueItem {
                report_id: "r1".into(),
                date: "2024-05-01".into(),
                amount: 10.5,
                description: None,
            },
            RevenueItem {
                report_id: "r2".into(),
                date: "2024-05-02".into(),
                amount: 4.5,
                description: Some("Evening".into()),
            },
        ];
        let text = format_revenue(&items);
        assert!(text.ends_with("Total                15.00"));
        assert!(text.contains("Evening"));
    }

    #[test]
    fn test_format_managed_slots() {
        let slots = vec![
            ManagedSlot {
                id: "s1".into(),
                name: "A1".into(),
                is_active: true,
            },
            ManagedSlot {
                id: "s2".into(),
                name: "A2".into(),
                is_active: false,
            },
        ];
        let text = format_managed_slots(&slots);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().ends_with("active"));
        assert!(text.ends_with("inactive"));
        assert_eq!(format_managed_slots(&[]), "No slots configured.");
    }

    #[test]
    fn test_format_area_details() {
        let details = AreaDetails {
            area_name: "NSTP Parking".into(),
            location: "Block C".into(),
            total_slots: 40,
        };
        assert_eq!(
            format_area_details(&details),
            "Name:     NSTP Parking\nLocation: Block C\nSlots:    40"
        );
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_bookings(&[]), "No bookings found.");
        assert_eq!(format_areas(&[]), "No parking areas configured.");
        assert_eq!(format_occupancy(&[]), "No occupancy data.");
    }
}
