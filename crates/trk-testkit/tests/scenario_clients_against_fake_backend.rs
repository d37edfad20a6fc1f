//! End-to-end: the real HTTP fetcher and WebSocket listener against the
//! fake backend on a local port.
//!
//! # Invariants under test
//! - The fetcher sends `orderId` as a query parameter and decodes the reply.
//! - A 404 surfaces the backend's own message.
//! - The listener applies updates for its order only.
//! - Closing the channel handle closes the socket on the server side.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use trk_fetch::{HttpOrderFetcher, OrderFetcher};
use trk_live::{ListenerExit, LiveUpdateListener, PushTransport, WsTransport};
use trk_testkit::{ord123, order, FakeBackend};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn http_fetcher_reads_order_and_404_message() {
    let backend = FakeBackend::start().await.unwrap();
    backend.state().put_order(ord123("processing")).await;
    let fetcher = HttpOrderFetcher::new(backend.base_url(), "/api/orders/track")
        .with_timeout(WAIT);

    let got = fetcher.fetch_order("ORD123").await.unwrap();
    assert_eq!(got, ord123("processing"));

    let err = fetcher.fetch_order("ORD999").await.unwrap_err();
    assert_eq!(err.user_message(), "Order not found");
}

#[tokio::test]
async fn ws_listener_delivers_matching_updates_and_closes_socket() {
    let backend = FakeBackend::start().await.unwrap();
    let transport: Arc<dyn PushTransport> = Arc::new(WsTransport::new(backend.push_url()));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = LiveUpdateListener::open(transport, "ORD123", move |o| {
        let _ = tx.send(o);
    });

    tokio::time::timeout(WAIT, backend.state().wait_for_sockets(1))
        .await
        .expect("socket never subscribed");

    backend.state().publish_raw("not json");
    backend.state().publish_update(&order("ORD999", "delivered"));
    backend.state().publish_update(&ord123("en_route"));

    let got = tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no update")
        .expect("listener gone");
    assert_eq!(got.order_id, "ORD123");
    assert_eq!(got.status, "en_route");

    assert_eq!(handle.shutdown().await, Some(ListenerExit::Closed));
    tokio::time::timeout(WAIT, backend.state().wait_for_sockets(0))
        .await
        .expect("server socket not released");
    assert!(rx.try_recv().is_err());
}
