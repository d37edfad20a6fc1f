//! Scripted fetcher and transport doubles.
//!
//! Both record how they were used (fetch calls, channel opens and closes) and
//! expose `wait_*` helpers so scenario tests can sequence events without
//! sleeping.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::{mpsc, oneshot, Notify};
use trk_fetch::{FetchError, OrderFetcher};
use trk_live::{ChannelError, FrameStream, PushTransport};
use trk_schemas::Order;

use crate::fixtures::order_update_frame;

type FetchResult = Result<Order, FetchError>;

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

enum Scripted {
    Ready(FetchResult),
    Gated(oneshot::Receiver<FetchResult>),
}

/// Resolves one gated fetch.
pub struct FetchGate {
    tx: oneshot::Sender<FetchResult>,
}

impl FetchGate {
    /// Complete the pending fetch. Returns false if the fetch was never
    /// issued and its script was discarded.
    pub fn resolve(self, result: FetchResult) -> bool {
        self.tx.send(result).is_ok()
    }
}

/// [`OrderFetcher`] answering from per-id scripts.
///
/// Each script is consumed by one call, in the order it was queued. An id
/// with no script left answers 404 "Order not found".
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<String>>,
    called: Notify,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate answer for `order_id`.
    pub fn respond(&self, order_id: &str, result: FetchResult) -> &Self {
        self.push_script(order_id, Scripted::Ready(result));
        self
    }

    /// Queue an answer for `order_id` that waits until the gate resolves.
    pub fn gate(&self, order_id: &str) -> FetchGate {
        let (tx, rx) = oneshot::channel();
        self.push_script(order_id, Scripted::Gated(rx));
        FetchGate { tx }
    }

    fn push_script(&self, order_id: &str, script: Scripted) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry(order_id.to_string())
                .or_default()
                .push_back(script);
        }
    }

    /// Identifiers fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Wait until at least `n` fetches have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait::async_trait]
impl OrderFetcher for ScriptedFetcher {
    async fn fetch_order(&self, order_id: &str) -> FetchResult {
        let script = self
            .scripts
            .lock()
            .ok()
            .and_then(|mut s| s.get_mut(order_id).and_then(VecDeque::pop_front));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(order_id.to_string());
        }
        self.called.notify_waiters();

        match script {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Transport("fetch gate dropped".to_string()))),
            None => Err(FetchError::NotFoundOrInvalid {
                status: Some(404),
                message: "Order not found".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

type FrameSender = mpsc::UnboundedSender<Result<String, ChannelError>>;

#[derive(Default)]
struct TransportInner {
    refuse: AtomicBool,
    opens: AtomicUsize,
    closes: AtomicUsize,
    /// One sender per opened connection, indexed by open order.
    connections: Mutex<Vec<Option<FrameSender>>>,
    changed: Notify,
}

/// In-memory [`PushTransport`].
///
/// Every `open` creates a new connection fed from the test side. A
/// connection counts as closed when the listener drops its frame stream.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<TransportInner>,
}

/// Frame stream that records its own drop.
struct CountedStream {
    rx: mpsc::UnboundedReceiver<Result<String, ChannelError>>,
    inner: Arc<TransportInner>,
}

impl Stream for CountedStream {
    type Item = Result<String, ChannelError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for CountedStream {
    fn drop(&mut self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose every `open` fails with a connect error.
    pub fn refusing() -> Self {
        let t = Self::default();
        t.inner.refuse.store(true, Ordering::SeqCst);
        t
    }

    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Send a raw frame on connection `index` (0-based, in open order).
    /// Returns false if that connection is closed or never existed.
    pub fn send_raw(&self, index: usize, text: &str) -> bool {
        self.with_connection(index, |tx| tx.send(Ok(text.to_string())).is_ok())
    }

    /// Send an `order_update` frame on connection `index`.
    pub fn send_update(&self, index: usize, order: &Order) -> bool {
        self.send_raw(index, &order_update_frame(order))
    }

    /// Send `text` on every live connection; returns how many took it.
    pub fn broadcast_raw(&self, text: &str) -> usize {
        let Ok(conns) = self.inner.connections.lock() else {
            return 0;
        };
        conns
            .iter()
            .flatten()
            .filter(|tx| tx.send(Ok(text.to_string())).is_ok())
            .count()
    }

    pub fn broadcast_update(&self, order: &Order) -> usize {
        self.broadcast_raw(&order_update_frame(order))
    }

    /// Fail connection `index` with a receive error.
    pub fn fail(&self, index: usize, reason: &str) -> bool {
        self.with_connection(index, |tx| {
            tx.send(Err(ChannelError::Receive(reason.to_string()))).is_ok()
        })
    }

    /// End connection `index` from the server side.
    pub fn end(&self, index: usize) {
        if let Ok(mut conns) = self.inner.connections.lock() {
            if let Some(slot) = conns.get_mut(index) {
                slot.take();
            }
        }
    }

    fn with_connection(&self, index: usize, f: impl FnOnce(&FrameSender) -> bool) -> bool {
        let Ok(conns) = self.inner.connections.lock() else {
            return false;
        };
        match conns.get(index) {
            Some(Some(tx)) => f(tx),
            _ => false,
        }
    }

    pub async fn wait_for_opens(&self, n: usize) {
        self.wait_until(|t| t.opens() >= n).await;
    }

    pub async fn wait_for_closes(&self, n: usize) {
        self.wait_until(|t| t.closes() >= n).await;
    }

    async fn wait_until(&self, done: impl Fn(&Self) -> bool) {
        loop {
            let notified = self.inner.changed.notified();
            if done(self) {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait::async_trait]
impl PushTransport for ScriptedTransport {
    fn endpoint(&self) -> String {
        "scripted://push".to_string()
    }

    async fn open(&self) -> Result<FrameStream, ChannelError> {
        if self.inner.refuse.load(Ordering::SeqCst) {
            self.inner.changed.notify_waiters();
            return Err(ChannelError::Connect("connection refused".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut conns) = self.inner.connections.lock() {
            conns.push(Some(tx));
        }
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
        Ok(Box::pin(CountedStream {
            rx,
            inner: Arc::clone(&self.inner),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::order;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn fetcher_consumes_scripts_in_order_then_404s() {
        let f = ScriptedFetcher::new();
        f.respond("A", Ok(order("A", "pending")))
            .respond("A", Ok(order("A", "delivered")));

        assert_eq!(f.fetch_order("A").await.unwrap().status, "pending");
        assert_eq!(f.fetch_order("A").await.unwrap().status, "delivered");
        let err = f.fetch_order("A").await.unwrap_err();
        assert_eq!(err.user_message(), "Order not found");
        assert_eq!(f.calls(), vec!["A", "A", "A"]);
    }

    #[tokio::test]
    async fn gated_fetch_waits_for_resolve() {
        let f = Arc::new(ScriptedFetcher::new());
        let gate = f.gate("A");
        let f2 = Arc::clone(&f);
        let pending = tokio::spawn(async move { f2.fetch_order("A").await });

        f.wait_for_calls(1).await;
        assert!(!pending.is_finished());
        assert!(gate.resolve(Ok(order("A", "processing"))));
        assert_eq!(pending.await.unwrap().unwrap().status, "processing");
    }

    #[tokio::test]
    async fn transport_counts_open_and_close() {
        let t = ScriptedTransport::new();
        let mut stream = t.open().await.unwrap();
        assert_eq!((t.opens(), t.closes()), (1, 0));

        assert!(t.send_raw(0, "hello"));
        assert_eq!(stream.next().await, Some(Ok("hello".to_string())));

        drop(stream);
        assert_eq!(t.closes(), 1);
        assert!(!t.send_raw(0, "late"));
    }

    #[tokio::test]
    async fn refusing_transport_never_opens() {
        let t = ScriptedTransport::refusing();
        assert!(matches!(t.open().await, Err(ChannelError::Connect(_))));
        assert_eq!(t.opens(), 0);
    }
}
