//! Rendering scenarios for the tracking panel.
//!
//! # Invariants under test
//! - Items render as `Name (xN)` with the line total; delivery fee and total
//!   are formatted as naira.
//! - An error state renders the message and no timeline.
//! - Timeline rows keep history order; unknown statuses still render.
//! - Plain style never emits escape codes.

use trk_testkit::{ord123, status_entry};
use trk_timeline::{render_view, status_color, StatusColor, Style};
use trk_view::ViewState;

fn showing(order: trk_schemas::Order) -> ViewState {
    ViewState {
        order: Some(order),
        loading: false,
        error: None,
    }
}

#[test]
fn ord123_renders_items_fee_and_total() {
    let wire = serde_json::json!({
        "orderId": "ORD123",
        "status": "processing",
        "statusHistory": [
            { "status": "pending", "timestamp": "2024-05-01T10:00:00Z", "description": "Order placed" },
            { "status": "processing", "timestamp": "2024-05-01T10:05:00Z" }
        ],
        "items": [{ "productName": "Paracetamol", "quantity": 2, "price": 500 }],
        "totalAmount": 1000,
        "deliveryFee": 300
    });
    let order = serde_json::from_value(wire).unwrap();
    let text = render_view(&showing(order), Style::Plain);

    assert!(text.contains("Paracetamol (x2)  ₦1,000\n"), "{text}");
    assert!(text.contains("Subtotal ₦1,000\n"), "{text}");
    assert!(text.contains("Delivery fee ₦300\n"), "{text}");
    assert!(text.contains("\nTotal ₦1,000\n"), "{text}");
    assert!(text.contains("Status: Processing\n"), "{text}");
    assert!(!text.contains('\x1b'));
}

#[test]
fn not_found_renders_error_panel_without_timeline() {
    let st = ViewState {
        order: None,
        loading: false,
        error: Some("Order not found".to_string()),
    };
    let text = render_view(&st, Style::Ansi);
    assert_eq!(text, "Error\nOrder not found\n");
    assert!(!text.contains("Timeline"));
}

#[test]
fn timeline_keeps_history_order_and_tolerates_unknown_status() {
    let mut order = ord123("delivered");
    order.status_history = vec![
        status_entry("delivered", 40, "Handed to customer"),
        status_entry("unknown_status_xyz", 20, ""),
        status_entry("pending", 0, "Order placed"),
    ];
    let text = render_view(&showing(order), Style::Plain);

    let timeline = text.split("Timeline\n").nth(1).expect("timeline section");
    let rows: Vec<&str> = timeline.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("Delivered") && rows[0].contains("Handed to customer"));
    assert!(rows[1].contains("Unknown Status Xyz"));
    assert!(rows[2].contains("Pending") && rows[2].contains("2024-05-01 10:00"));
}

#[test]
fn empty_history_has_no_timeline_section() {
    let mut order = ord123("processing");
    order.status_history.clear();
    let text = render_view(&showing(order), Style::Plain);
    assert!(!text.contains("Timeline"));
}

#[test]
fn ansi_style_colours_status_by_table() {
    let text = render_view(&showing(ord123("delivered")), Style::Ansi);
    let green = format!("{}Delivered\x1b[0m", StatusColor::Green.ansi());
    assert!(text.contains(&green), "{text:?}");
    assert_eq!(status_color("unknown_status_xyz"), StatusColor::Gray);
}
