//! Async driver for the tracking display.
//!
//! One task owns the [`TrackingReducer`] and the current [`ChannelHandle`].
//! Commands (track / unmount), fetch completions and push updates all arrive
//! on channels and are applied one at a time, so the view state needs no
//! lock. Renderers observe state through [`TrackerHandle::subscribe`].
//!
//! The in-flight fetch is never cancelled. Its completion is tagged with the
//! session that issued it; after a switch the reducer drops it, and after
//! unmount the event channel is gone and the send fails silently.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use trk_fetch::{FetchError, OrderFetcher, MISSING_ORDER_ID};
use trk_live::{ChannelHandle, LiveUpdateListener, PushTransport};

use crate::reducer::{Outcome, SessionId, TrackingReducer, ViewEvent};
use crate::state::ViewState;

/// Command queue depth. Commands are rare (one per identifier change).
const COMMAND_BUFFER: usize = 16;

enum Command {
    Track(String),
    Unmount,
}

/// The tracker task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerClosed;

impl fmt::Display for TrackerClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order tracker is no longer running")
    }
}

impl std::error::Error for TrackerClosed {}

/// Sources the tracker reads from.
pub struct OrderTracker {
    fetcher: Arc<dyn OrderFetcher>,
    transport: Arc<dyn PushTransport>,
}

impl OrderTracker {
    pub fn new(fetcher: Arc<dyn OrderFetcher>, transport: Arc<dyn PushTransport>) -> Self {
        Self { fetcher, transport }
    }

    /// Start the tracker task. Must be called inside a Tokio runtime.
    pub fn spawn(self) -> TrackerHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(ViewState::default());
        let task = tokio::spawn(self.run(cmd_rx, state_tx));
        TrackerHandle {
            cmd_tx,
            state_rx,
            task,
        }
    }

    async fn run(self, mut cmd_rx: mpsc::Receiver<Command>, state_tx: watch::Sender<ViewState>) {
        let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<ViewEvent>();
        let mut reducer = TrackingReducer::new();
        let mut channel: Option<ChannelHandle> = None;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Track(order_id)) => {
                        if let Some(previous) = channel.take() {
                            previous.shutdown().await;
                        }
                        let session = reducer.session() + 1;
                        channel = self.start_session(&mut reducer, &evt_tx, session, &order_id);
                        publish(&state_tx, &reducer);
                    }
                    // A dropped handle unmounts too.
                    Some(Command::Unmount) | None => break,
                },
                Some(event) = evt_rx.recv() => {
                    let outcome = reducer.apply(event);
                    match &outcome {
                        Outcome::Applied => publish(&state_tx, &reducer),
                        // The snapshot stays but loading still ends.
                        Outcome::Superseded => {
                            debug!(session = reducer.session(), "fetch result superseded by push");
                            publish(&state_tx, &reducer);
                        }
                        Outcome::Dropped(reason) => debug!(?reason, "view event dropped"),
                    }
                }
            }
        }

        if let Some(previous) = channel.take() {
            previous.shutdown().await;
        }
        reducer.apply(ViewEvent::Unmounted);
        publish(&state_tx, &reducer);
        info!("order tracker unmounted");
    }

    /// Mount `order_id`, then start the fetch and the listener side by side.
    ///
    /// The id is trimmed once here so the fetch, the listener predicate and
    /// the reducer all key on the same value. A blank id resolves straight to
    /// the missing-id error and opens no channel.
    fn start_session(
        &self,
        reducer: &mut TrackingReducer,
        evt_tx: &mpsc::UnboundedSender<ViewEvent>,
        session: SessionId,
        order_id: &str,
    ) -> Option<ChannelHandle> {
        let order_id = order_id.trim().to_string();
        reducer.apply(ViewEvent::Mounted {
            session,
            order_id: order_id.clone(),
        });
        reducer.apply(ViewEvent::FetchStarted { session });

        if order_id.is_empty() {
            warn!(session, "blank order id; nothing to track");
            reducer.apply(ViewEvent::FetchResolved {
                session,
                result: Err(FetchError::NotFoundOrInvalid {
                    status: None,
                    message: MISSING_ORDER_ID.to_string(),
                }),
            });
            return None;
        }
        info!(%order_id, session, "tracking order");

        let fetcher = Arc::clone(&self.fetcher);
        let tx = evt_tx.clone();
        let fetch_id = order_id.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_order(&fetch_id).await;
            // Err means the tracker is gone; the result has nowhere to go.
            let _ = tx.send(ViewEvent::FetchResolved { session, result });
        });

        let tx = evt_tx.clone();
        Some(LiveUpdateListener::open(
            Arc::clone(&self.transport),
            order_id,
            move |order| {
                let _ = tx.send(ViewEvent::PushReceived { session, order });
            },
        ))
    }
}

/// Shorthand for `OrderTracker::new(..).spawn()`.
pub fn spawn_tracker(
    fetcher: Arc<dyn OrderFetcher>,
    transport: Arc<dyn PushTransport>,
) -> TrackerHandle {
    OrderTracker::new(fetcher, transport).spawn()
}

fn publish(state_tx: &watch::Sender<ViewState>, reducer: &TrackingReducer) {
    let next = reducer.state();
    state_tx.send_if_modified(|current| {
        if current == next {
            false
        } else {
            *current = next.clone();
            true
        }
    });
}

/// Control side of a running tracker.
pub struct TrackerHandle {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    /// Track `order_id`, replacing whatever was tracked before.
    pub async fn track(&self, order_id: impl Into<String>) -> Result<(), TrackerClosed> {
        self.cmd_tx
            .send(Command::Track(order_id.into()))
            .await
            .map_err(|_| TrackerClosed)
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_rx.clone()
    }

    pub fn current(&self) -> ViewState {
        self.state_rx.borrow().clone()
    }

    /// Close the push channel, stop the task and wait for it.
    pub async fn unmount(self) {
        let _ = self.cmd_tx.send(Command::Unmount).await;
        let _ = self.task.await;
    }
}
