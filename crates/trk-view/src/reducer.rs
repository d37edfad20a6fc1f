//! Deterministic reducer over view events.
//!
//! # Invariants
//!
//! - **Recency**: a fetch result is applied only if no push update was
//!   accepted since the fetch started. Otherwise the push snapshot stays and
//!   the fetch result is reported as [`Outcome::Superseded`].
//! - **Exclusive error/order**: a fetch failure sets `error` only when no
//!   order is held; an accepted push clears `error`.
//! - **Session isolation**: every event carries the session it belongs to.
//!   Events from any other session, or arriving after unmount, are dropped.
//! - **Identifier match**: a push whose order id differs from the tracked id
//!   never touches the state.
//! - **Pure**: no IO, no clock. The same event sequence always produces the
//!   same state (see [`replay`]).

use tracing::warn;
use trk_fetch::FetchError;
use trk_schemas::Order;

use crate::state::ViewState;

/// Monotonic identifier of one tracked order id inside a tracker.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Display mounted (or switched) to `order_id`.
    Mounted {
        session: SessionId,
        order_id: String,
    },
    /// The one-shot fetch was issued.
    FetchStarted { session: SessionId },
    FetchResolved {
        session: SessionId,
        result: Result<Order, FetchError>,
    },
    PushReceived { session: SessionId, order: Order },
    Unmounted,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A fetch result lost to a push snapshot received after it started.
    Superseded,
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    NotMounted,
    StaleSession { current: SessionId, got: SessionId },
    OrderMismatch { tracked: String, got: String },
    NoFetchInFlight,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackingReducer {
    state: ViewState,
    mounted: bool,
    session: SessionId,
    order_id: Option<String>,
    /// Push updates accepted in the current session.
    push_seq: u64,
    /// `push_seq` when the in-flight fetch started.
    fetch_started_at: Option<u64>,
}

impl TrackingReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn tracked_order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn apply(&mut self, event: ViewEvent) -> Outcome {
        match event {
            ViewEvent::Mounted { session, order_id } => self.mount(session, order_id),
            ViewEvent::FetchStarted { session } => {
                if let Err(reason) = self.check_session(session) {
                    return Outcome::Dropped(reason);
                }
                self.fetch_started_at = Some(self.push_seq);
                self.state.loading = true;
                Outcome::Applied
            }
            ViewEvent::FetchResolved { session, result } => self.resolve_fetch(session, result),
            ViewEvent::PushReceived { session, order } => self.push(session, order),
            ViewEvent::Unmounted => {
                self.mounted = false;
                self.order_id = None;
                self.fetch_started_at = None;
                self.state = ViewState::default();
                Outcome::Applied
            }
        }
    }

    fn mount(&mut self, session: SessionId, order_id: String) -> Outcome {
        // Sessions only move forward; 0 is the "never mounted" value.
        if session <= self.session {
            return Outcome::Dropped(DropReason::StaleSession {
                current: self.session,
                got: session,
            });
        }
        self.session = session;
        self.mounted = true;
        self.order_id = Some(order_id);
        self.push_seq = 0;
        self.fetch_started_at = None;
        self.state = ViewState::loading();
        Outcome::Applied
    }

    fn resolve_fetch(&mut self, session: SessionId, result: Result<Order, FetchError>) -> Outcome {
        if let Err(reason) = self.check_session(session) {
            return Outcome::Dropped(reason);
        }
        let Some(started_at) = self.fetch_started_at.take() else {
            return Outcome::Dropped(DropReason::NoFetchInFlight);
        };
        self.state.loading = false;

        let push_won = self.push_seq != started_at;
        match result {
            Ok(order) if !push_won => {
                self.state.order = Some(order);
                self.state.error = None;
                Outcome::Applied
            }
            Ok(_) => Outcome::Superseded,
            Err(e) if self.state.order.is_some() => {
                warn!(session, error = %e, "fetch failed after a push snapshot arrived; keeping snapshot");
                Outcome::Superseded
            }
            Err(e) => {
                self.state.error = Some(e.user_message().to_string());
                Outcome::Applied
            }
        }
    }

    fn push(&mut self, session: SessionId, order: Order) -> Outcome {
        if let Err(reason) = self.check_session(session) {
            return Outcome::Dropped(reason);
        }
        let tracked = self.order_id.as_deref().unwrap_or_default();
        if order.order_id != tracked {
            return Outcome::Dropped(DropReason::OrderMismatch {
                tracked: tracked.to_string(),
                got: order.order_id,
            });
        }
        self.push_seq += 1;
        self.state.order = Some(order);
        self.state.error = None;
        Outcome::Applied
    }

    fn check_session(&self, session: SessionId) -> Result<(), DropReason> {
        if !self.mounted {
            return Err(DropReason::NotMounted);
        }
        if session != self.session {
            return Err(DropReason::StaleSession {
                current: self.session,
                got: session,
            });
        }
        Ok(())
    }
}

/// Fold an ordered event log into a fresh reducer.
pub fn replay<I>(events: I) -> TrackingReducer
where
    I: IntoIterator<Item = ViewEvent>,
{
    let mut reducer = TrackingReducer::new();
    for event in events {
        reducer.apply(event);
    }
    reducer
}
