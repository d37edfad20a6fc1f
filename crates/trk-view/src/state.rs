//! What the renderer sees.

use trk_schemas::Order;

/// Current display state.
///
/// The reducer never produces `error` and `order` together; [`Self::screen`]
/// still gives `error` precedence should a caller build such a state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub order: Option<Order>,
    /// True from mount until the initial fetch resolves.
    pub loading: bool,
    pub error: Option<String>,
}

/// Which panel to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    /// Nothing tracked.
    Idle,
    Loading,
    Error(&'a str),
    Order(&'a Order),
}

impl ViewState {
    pub fn loading() -> Self {
        Self {
            order: None,
            loading: true,
            error: None,
        }
    }

    /// Error first, then any held order (a push may land while the fetch is
    /// still loading), then the loading panel.
    pub fn screen(&self) -> Screen<'_> {
        if let Some(err) = self.error.as_deref() {
            return Screen::Error(err);
        }
        if let Some(order) = self.order.as_ref() {
            return Screen::Order(order);
        }
        if self.loading {
            return Screen::Loading;
        }
        Screen::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        serde_json::from_str(r#"{"orderId":"A","status":"pending","totalAmount":0}"#).unwrap()
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(ViewState::default().screen(), Screen::Idle);
        assert_eq!(ViewState::loading().screen(), Screen::Loading);
    }

    #[test]
    fn error_takes_precedence_over_stale_order() {
        let st = ViewState {
            order: Some(order()),
            loading: false,
            error: Some("Order not found".to_string()),
        };
        assert_eq!(st.screen(), Screen::Error("Order not found"));
    }

    #[test]
    fn order_shows_even_while_loading() {
        let o = order();
        let st = ViewState {
            order: Some(o.clone()),
            loading: true,
            error: None,
        };
        assert_eq!(st.screen(), Screen::Order(&o));
    }
}
