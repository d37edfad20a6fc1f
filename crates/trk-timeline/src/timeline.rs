//! Status history projection for the timeline.

use chrono::{DateTime, Utc};
use trk_schemas::StatusHistoryEntry;

use crate::color::{status_color, StatusColor};

/// One row of the rendered timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub label: String,
    pub color: StatusColor,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// `out_for_delivery` → `Out For Delivery`. Blank input → `Unknown`.
pub fn humanize_status(status: &str) -> String {
    let words: Vec<String> = status
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Unknown".to_string()
    } else {
        words.join(" ")
    }
}

/// Project the history in its original order. Timestamps are not used to
/// reorder.
pub fn project_timeline(history: &[StatusHistoryEntry]) -> Vec<TimelineEntry> {
    history
        .iter()
        .map(|e| TimelineEntry {
            label: humanize_status(&e.status),
            color: status_color(&e.status),
            timestamp: e.timestamp,
            description: e.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trk_testkit::status_entry;

    #[test]
    fn humanize() {
        assert_eq!(humanize_status("out_for_delivery"), "Out For Delivery");
        assert_eq!(humanize_status("PENDING"), "Pending");
        assert_eq!(humanize_status("en-route"), "En Route");
        assert_eq!(humanize_status(" _ "), "Unknown");
    }

    #[test]
    fn keeps_original_order_even_when_timestamps_disagree() {
        let history = vec![
            status_entry("delivered", 30, "Handed over"),
            status_entry("pending", 0, "Order placed"),
            status_entry("mystery", 10, ""),
        ];
        let rows = project_timeline(&history);
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Delivered", "Pending", "Mystery"]);
        assert_eq!(rows[0].color, StatusColor::Green);
        assert_eq!(rows[2].color, StatusColor::Gray);
        assert_eq!(rows[0].description, "Handed over");
    }

    #[test]
    fn empty_history_projects_nothing() {
        assert!(project_timeline(&[]).is_empty());
    }
}
