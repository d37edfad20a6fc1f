//! trk-testkit
//!
//! Test tooling for the tracker crates. Nothing here ships in a binary.
//!
//! - [`fixtures`]: canned orders and push frames.
//! - [`scripted`]: in-memory [`OrderFetcher`] / [`PushTransport`] doubles
//!   with controllable timing and open/close counters.
//! - [`backend`]: an in-process fake storefront backend (HTTP tracking
//!   endpoint + WebSocket push) for end-to-end tests of the real clients.
//!
//! [`OrderFetcher`]: trk_fetch::OrderFetcher
//! [`PushTransport`]: trk_live::PushTransport

pub mod backend;
pub mod fixtures;
pub mod scripted;

pub use backend::{BackendState, FakeBackend};
pub use fixtures::{order, order_update_frame, ord123, status_entry};
pub use scripted::{FetchGate, ScriptedFetcher, ScriptedTransport};
