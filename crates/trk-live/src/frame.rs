//! Push frame decoding.

use std::fmt;

use trk_schemas::{Order, OrderUpdateData, PushEnvelope, ORDER_UPDATE_EVENT};

/// A successfully decoded push frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `order_update` carrying a valid order snapshot.
    OrderUpdate(Order),
    /// Any other event name. Not an error; callers ignore it.
    OtherEvent(String),
}

/// A frame that is not valid JSON, lacks `event`, or is an `order_update`
/// whose `data.order` is missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMessage {
    pub reason: String,
}

impl fmt::Display for MalformedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed push message: {}", self.reason)
    }
}

impl std::error::Error for MalformedMessage {}

fn malformed(reason: impl Into<String>) -> MalformedMessage {
    MalformedMessage {
        reason: reason.into(),
    }
}

pub fn decode_frame(text: &str) -> Result<Inbound, MalformedMessage> {
    let envelope: PushEnvelope =
        serde_json::from_str(text).map_err(|e| malformed(format!("envelope: {e}")))?;

    if envelope.event != ORDER_UPDATE_EVENT {
        return Ok(Inbound::OtherEvent(envelope.event));
    }

    let data: OrderUpdateData =
        serde_json::from_value(envelope.data).map_err(|e| malformed(format!("data: {e}")))?;
    data.order
        .validate()
        .map_err(|e| malformed(format!("order: {e}")))?;

    Ok(Inbound::OrderUpdate(data.order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_frame(order_id: &str, status: &str) -> String {
        serde_json::json!({
            "event": "order_update",
            "data": { "order": {
                "orderId": order_id,
                "status": status,
                "totalAmount": 1000,
                "items": [{ "productName": "Paracetamol", "quantity": 2, "price": 500 }]
            }}
        })
        .to_string()
    }

    #[test]
    fn order_update_decodes_order() {
        match decode_frame(&update_frame("ORD123", "en_route")).unwrap() {
            Inbound::OrderUpdate(order) => {
                assert_eq!(order.order_id, "ORD123");
                assert_eq!(order.status, "en_route");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_events_are_not_errors() {
        let frame = r#"{"event":"inventory_update","data":{"sku":"X"}}"#;
        assert_eq!(
            decode_frame(frame).unwrap(),
            Inbound::OtherEvent("inventory_update".to_string())
        );
    }

    #[test]
    fn event_without_data_is_other_event() {
        assert_eq!(
            decode_frame(r#"{"event":"ping"}"#).unwrap(),
            Inbound::OtherEvent("ping".to_string())
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame(r#"{"data":{}}"#).is_err());
        assert!(decode_frame("[]").is_err());
    }

    #[test]
    fn order_update_without_order_is_malformed() {
        let err = decode_frame(r#"{"event":"order_update","data":{}}"#).unwrap_err();
        assert!(err.reason.starts_with("data:"), "{err}");
    }

    #[test]
    fn order_update_with_invalid_order_is_malformed() {
        let frame = serde_json::json!({
            "event": "order_update",
            "data": { "order": {
                "orderId": "ORD123",
                "status": "pending",
                "totalAmount": 1000,
                "items": [{ "productName": "Paracetamol", "quantity": 0, "price": 500 }]
            }}
        })
        .to_string();
        let err = decode_frame(&frame).unwrap_err();
        assert!(err.reason.starts_with("order:"), "{err}");
    }
}
