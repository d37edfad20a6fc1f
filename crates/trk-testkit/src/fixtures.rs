use chrono::{DateTime, TimeZone, Utc};
use trk_schemas::{Item, Money, Order, PushEnvelope, StatusHistoryEntry};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn status_entry(status: &str, minute: u32, description: &str) -> StatusHistoryEntry {
    StatusHistoryEntry {
        status: status.to_string(),
        timestamp: at(minute),
        description: description.to_string(),
    }
}

/// Minimal valid order with the given id and status and no items.
pub fn order(order_id: &str, status: &str) -> Order {
    Order {
        order_id: order_id.to_string(),
        transaction_reference: None,
        status: status.to_string(),
        delivery_status: None,
        rider_name: None,
        items: Vec::new(),
        total_amount: Money::ZERO,
        delivery_fee: Money::ZERO,
        created_at: Some(at(0)),
        status_history: vec![status_entry(status, 0, "")],
    }
}

/// `ORD123`: two Paracetamol at ₦500, total ₦1,000, delivery ₦300.
pub fn ord123(status: &str) -> Order {
    Order {
        order_id: "ORD123".to_string(),
        transaction_reference: Some("PSK-ORD123".to_string()),
        status: status.to_string(),
        delivery_status: None,
        rider_name: None,
        items: vec![Item {
            product_name: "Paracetamol".to_string(),
            quantity: 2,
            price: Money::from_whole_naira(500),
        }],
        total_amount: Money::from_whole_naira(1_000),
        delivery_fee: Money::from_whole_naira(300),
        created_at: Some(at(0)),
        status_history: vec![
            status_entry("pending", 0, "Order placed"),
            status_entry(status, 5, "Status updated"),
        ],
    }
}

/// JSON text of an `order_update` push frame for `order`.
pub fn order_update_frame(order: &Order) -> String {
    PushEnvelope::order_update(order)
        .and_then(|env| serde_json::to_string(&env))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_valid_orders() {
        assert!(order("A", "pending").validate().is_ok());
        assert!(ord123("processing").validate().is_ok());
    }

    #[test]
    fn update_frame_decodes_back() {
        let o = ord123("en_route");
        match trk_live::decode_frame(&order_update_frame(&o)).unwrap() {
            trk_live::Inbound::OrderUpdate(decoded) => assert_eq!(decoded, o),
            other => panic!("unexpected {other:?}"),
        }
    }
}
