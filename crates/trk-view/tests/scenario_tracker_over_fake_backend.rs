//! The tracker wired to the real HTTP fetcher and WebSocket transport,
//! served by the in-process fake backend.
//!
//! # Invariants under test
//! - A padded identifier is fetched, filtered and reduced under one key, so
//!   push updates for the fetched order replace it.
//! - Unmount releases the server-side socket.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use trk_fetch::HttpOrderFetcher;
use trk_live::WsTransport;
use trk_testkit::{ord123, FakeBackend};
use trk_view::{spawn_tracker, ViewState};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for(
    rx: &mut watch::Receiver<ViewState>,
    pred: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for view state")
        .expect("tracker stopped")
        .clone()
}

fn status_is(s: &ViewState, status: &str) -> bool {
    s.order.as_ref().map(|o| o.status.as_str()) == Some(status)
}

#[tokio::test]
async fn padded_id_receives_pushes_over_real_transports() {
    let backend = FakeBackend::start().await.unwrap();
    backend.state().put_order(ord123("processing")).await;

    let fetcher = HttpOrderFetcher::new(backend.base_url(), "/api/orders/track").with_timeout(WAIT);
    let transport = WsTransport::new(backend.push_url());
    let handle = spawn_tracker(Arc::new(fetcher), Arc::new(transport));
    let mut rx = handle.subscribe();

    handle.track(" ORD123").await.unwrap();
    let st = wait_for(&mut rx, |s| !s.loading && status_is(s, "processing")).await;
    assert_eq!(st.order.map(|o| o.order_id), Some("ORD123".to_string()));

    tokio::time::timeout(WAIT, backend.state().wait_for_sockets(1))
        .await
        .expect("push socket never subscribed");
    backend.state().publish_update(&ord123("delivered"));

    let st = wait_for(&mut rx, |s| status_is(s, "delivered")).await;
    assert_eq!(st.error, None);

    handle.unmount().await;
    tokio::time::timeout(WAIT, backend.state().wait_for_sockets(0))
        .await
        .expect("push socket not released");
}
