//! trk-timeline
//!
//! Pure rendering for the tracking display: the status colour table, the
//! status-history projection and the text panel for a [`ViewState`].
//! Nothing here does IO.
//!
//! [`ViewState`]: trk_view::ViewState

pub mod color;
pub mod panel;
pub mod timeline;

pub use color::{status_color, StatusColor};
pub use panel::{render_view, Style};
pub use timeline::{humanize_status, project_timeline, TimelineEntry};
