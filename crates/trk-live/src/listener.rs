//! Listener task and its lifetime handle.
//!
//! [`LiveUpdateListener::open`] spawns one task per tracked order. The task
//! owns the frame stream, so the connection is released exactly once, when
//! the task returns, whichever way it returns: the handle was closed or
//! dropped, the server ended the stream, or the channel failed.
//!
//! Channel failures are logged and end the task. There is no reconnect and
//! no backoff; the tracker keeps showing its last snapshot.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use trk_schemas::Order;

use crate::router::{for_order, Dispatch, UpdateRouter};
use crate::transport::PushTransport;

/// Why a listener task returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// The handle was closed or dropped.
    Closed,
    /// The transport could not connect.
    ConnectFailed,
    /// The connection failed after opening.
    ChannelFailed,
    /// The server ended the stream.
    Ended,
}

pub struct LiveUpdateListener;

impl LiveUpdateListener {
    /// Open a push channel and call `handler` for every update whose order
    /// id equals `order_id`. Must be called inside a Tokio runtime.
    pub fn open<H>(
        transport: Arc<dyn PushTransport>,
        order_id: impl Into<String>,
        handler: H,
    ) -> ChannelHandle
    where
        H: FnMut(Order) + Send + 'static,
    {
        let order_id = order_id.into();
        let mut router = UpdateRouter::new();
        router.on_update(for_order(order_id.clone()), handler);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_listener(
            transport,
            order_id.clone(),
            router,
            shutdown_rx,
        ));

        ChannelHandle {
            order_id,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Scoped ownership of one push channel.
///
/// Closing is idempotent and also happens on drop, so every exit path of the
/// owner releases the channel.
pub struct ChannelHandle {
    order_id: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<ListenerExit>>,
}

impl ChannelHandle {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }

    /// Signal the listener task to stop. Returns `true` only for the call
    /// that actually closed the channel.
    pub fn close(&mut self) -> bool {
        match self.shutdown.take() {
            Some(tx) => {
                // Err means the task already returned on its own.
                let _ = tx.send(());
                debug!(order_id = %self.order_id, "push channel close requested");
                true
            }
            None => false,
        }
    }

    /// Close and wait for the listener task to return.
    pub async fn shutdown(mut self) -> Option<ListenerExit> {
        self.close();
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_listener(
    transport: Arc<dyn PushTransport>,
    order_id: String,
    mut router: UpdateRouter,
    mut shutdown: oneshot::Receiver<()>,
) -> ListenerExit {
    let endpoint = transport.endpoint();

    // A dropped sender also resolves `shutdown`, so a dropped handle stops
    // the task just like an explicit close.
    let mut frames = tokio::select! {
        biased;
        _ = &mut shutdown => return ListenerExit::Closed,
        opened = transport.open() => match opened {
            Ok(frames) => frames,
            Err(e) => {
                warn!(%order_id, %endpoint, error = %e, "push channel unavailable");
                return ListenerExit::ConnectFailed;
            }
        },
    };
    info!(%order_id, %endpoint, "push channel open");

    let exit = loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break ListenerExit::Closed,
            next = frames.next() => match next {
                Some(Ok(text)) => match router.dispatch(&text) {
                    Dispatch::Delivered { .. } => debug!(%order_id, "order update applied"),
                    Dispatch::NoMatch { order_id: other } => {
                        debug!(%order_id, %other, "update for another order ignored")
                    }
                    Dispatch::OtherEvent(event) => debug!(%event, "non-order event ignored"),
                    Dispatch::Malformed(e) => debug!(error = %e, "push frame dropped"),
                },
                Some(Err(e)) => {
                    warn!(%order_id, error = %e, "push channel failed");
                    break ListenerExit::ChannelFailed;
                }
                None => break ListenerExit::Ended,
            },
        }
    };

    drop(frames);
    info!(%order_id, exit = ?exit, "push channel closed");
    exit
}
