//! Status → colour table.

/// Colour family of a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusColor {
    Amber,
    Blue,
    Indigo,
    Red,
    Purple,
    Green,
    /// Any status the table does not know.
    Gray,
}

impl StatusColor {
    pub fn name(self) -> &'static str {
        match self {
            StatusColor::Amber => "amber",
            StatusColor::Blue => "blue",
            StatusColor::Indigo => "indigo",
            StatusColor::Red => "red",
            StatusColor::Purple => "purple",
            StatusColor::Green => "green",
            StatusColor::Gray => "gray",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Amber => "#f59e0b",
            StatusColor::Blue => "#3b82f6",
            StatusColor::Indigo => "#6366f1",
            StatusColor::Red => "#ef4444",
            StatusColor::Purple => "#a855f7",
            StatusColor::Green => "#22c55e",
            StatusColor::Gray => "#6b7280",
        }
    }

    /// SGR foreground escape for terminals.
    pub fn ansi(self) -> &'static str {
        match self {
            StatusColor::Amber => "\x1b[33m",
            StatusColor::Blue => "\x1b[34m",
            StatusColor::Indigo => "\x1b[94m",
            StatusColor::Red => "\x1b[31m",
            StatusColor::Purple => "\x1b[35m",
            StatusColor::Green => "\x1b[32m",
            StatusColor::Gray => "\x1b[90m",
        }
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";

/// Lowercase, with spaces and hyphens folded to `_`.
fn normalize(status: &str) -> String {
    status
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Colour for any status string. Never fails.
pub fn status_color(status: &str) -> StatusColor {
    match normalize(status).as_str() {
        "pending" => StatusColor::Amber,
        "processing" => StatusColor::Blue,
        "accepted" | "confirmed" => StatusColor::Indigo,
        "rejected" | "cancelled" | "canceled" | "failed" => StatusColor::Red,
        "en_route" | "out_for_delivery" | "picked_up" => StatusColor::Purple,
        "delivered" | "completed" => StatusColor::Green,
        _ => StatusColor::Gray,
    }
}
