//! trk-view
//!
//! Order view state for the tracking display.
//!
//! Two asynchronous sources write the displayed order: the one-shot fetch
//! and the push channel. Neither writes state directly. Both become
//! [`ViewEvent`]s, and a single [`TrackingReducer`] folds them in arrival
//! order under one rule: a fetch result is applied only if no push update
//! was accepted since that fetch started.
//!
//! [`OrderTracker`] is the async driver: one task owns the reducer and the
//! push channel handle, and publishes [`ViewState`] through a `watch`
//! channel.

pub mod reducer;
pub mod state;
pub mod tracker;

pub use reducer::{replay, DropReason, Outcome, SessionId, TrackingReducer, ViewEvent};
pub use state::{Screen, ViewState};
pub use tracker::{spawn_tracker, OrderTracker, TrackerClosed, TrackerHandle};
