//! Text panel for the current view state.

use std::fmt::Write as _;

use trk_schemas::Order;
use trk_view::{Screen, ViewState};

use crate::color::{status_color, StatusColor, ANSI_RESET};
use crate::timeline::{humanize_status, project_timeline};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    /// Status labels and timeline bullets carry SGR colour escapes.
    Ansi,
}

impl Style {
    fn paint(self, color: StatusColor, text: &str) -> String {
        match self {
            Style::Plain => text.to_string(),
            Style::Ansi => format!("{}{text}{ANSI_RESET}", color.ansi()),
        }
    }
}

/// Render the panel for `state`. An idle state renders as an empty string.
pub fn render_view(state: &ViewState, style: Style) -> String {
    match state.screen() {
        Screen::Idle => String::new(),
        Screen::Loading => "Loading order...\n".to_string(),
        Screen::Error(message) => format!("Error\n{message}\n"),
        Screen::Order(order) => render_order(order, state.loading, style),
    }
}

fn render_order(order: &Order, refreshing: bool, style: Style) -> String {
    let mut out = String::new();
    let status = order.display_status();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "Order {}", order.order_id);
    if let Some(reference) = order.transaction_reference.as_deref() {
        let _ = writeln!(out, "Reference: {reference}");
    }
    let _ = writeln!(
        out,
        "Status: {}",
        style.paint(status_color(status), &humanize_status(status))
    );
    if let Some(rider) = order.rider_name.as_deref().filter(|r| !r.trim().is_empty()) {
        let _ = writeln!(out, "Rider: {rider}");
    }
    if let Some(created) = order.created_at {
        let _ = writeln!(out, "Placed: {} UTC", created.format(TIMESTAMP_FORMAT));
    }
    if refreshing {
        let _ = writeln!(out, "(refreshing...)");
    }

    out.push('\n');
    out.push_str("Items\n");
    if order.items.is_empty() {
        out.push_str("  (none)\n");
    }
    for item in &order.items {
        let line_total = item
            .line_total()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "  {} (x{})  {line_total}",
            item.product_name, item.quantity
        );
    }
    if let Some(subtotal) = order.items_subtotal().filter(|_| !order.items.is_empty()) {
        let _ = writeln!(out, "Subtotal {subtotal}");
    }
    let _ = writeln!(out, "Delivery fee {}", order.delivery_fee);
    let _ = writeln!(out, "Total {}", order.total_amount);

    let rows = project_timeline(&order.status_history);
    if !rows.is_empty() {
        out.push('\n');
        out.push_str("Timeline\n");
        for row in rows {
            let _ = write!(
                out,
                "  {} {}  {}",
                style.paint(row.color, "●"),
                row.label,
                row.timestamp.format(TIMESTAMP_FORMAT)
            );
            if !row.description.is_empty() {
                let _ = write!(out, "  {}", row.description);
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use trk_testkit::order;

    #[test]
    fn idle_and_loading() {
        assert_eq!(render_view(&ViewState::default(), Style::Plain), "");
        assert_eq!(
            render_view(&ViewState::loading(), Style::Plain),
            "Loading order...\n"
        );
    }

    #[test]
    fn delivery_status_overrides_status_for_display() {
        let mut o = order("A", "processing");
        o.delivery_status = Some("out_for_delivery".to_string());
        o.rider_name = Some("Musa".to_string());
        let st = ViewState {
            order: Some(o),
            ..ViewState::default()
        };
        let text = render_view(&st, Style::Plain);
        assert!(text.contains("Status: Out For Delivery\n"), "{text}");
        assert!(text.contains("Rider: Musa\n"));
    }

    #[test]
    fn order_held_while_loading_is_marked_refreshing() {
        let st = ViewState {
            order: Some(order("A", "en_route")),
            loading: true,
            error: None,
        };
        assert!(render_view(&st, Style::Plain).contains("(refreshing...)"));
    }
}
