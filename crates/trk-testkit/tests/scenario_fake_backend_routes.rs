//! In-process tests for the fake backend's HTTP surface.
//!
//! The router is driven with `tower::ServiceExt::oneshot`; no socket is
//! bound.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot
use trk_testkit::backend::{build_router, BackendState};
use trk_testkit::ord123;

async fn get(st: &Arc<BackendState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = build_router(Arc::clone(st))
        .oneshot(req)
        .await
        .expect("oneshot failed");
    let status = resp.status();
    let body: bytes::Bytes = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    let json = serde_json::from_slice(&body).expect("body is not valid JSON");
    (status, json)
}

#[tokio::test]
async fn health_returns_200() {
    let st = Arc::new(BackendState::new());
    let (status, json) = get(&st, "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn known_order_is_returned_in_wire_shape() {
    let st = Arc::new(BackendState::new());
    st.put_order(ord123("processing")).await;

    let (status, json) = get(&st, "/api/orders/track?orderId=ORD123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orderId"], "ORD123");
    assert_eq!(json["status"], "processing");
    assert_eq!(json["items"][0]["productName"], "Paracetamol");
    assert_eq!(st.fetch_count(), 1);
}

#[tokio::test]
async fn unknown_order_is_404_with_message() {
    let st = Arc::new(BackendState::new());
    let (status, json) = get(&st, "/api/orders/track?orderId=NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Order not found");
}

#[tokio::test]
async fn missing_order_id_is_400() {
    let st = Arc::new(BackendState::new());
    let (status, json) = get(&st, "/api/orders/track").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "orderId is required");
}

#[tokio::test]
async fn held_fetch_completes_after_release() {
    let st = Arc::new(BackendState::new());
    st.put_order(ord123("pending")).await;
    st.hold_fetches();

    let st2 = Arc::clone(&st);
    let pending = tokio::spawn(async move { get(&st2, "/api/orders/track?orderId=ORD123").await });
    while st.fetch_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(!pending.is_finished());

    st.release_fetches();
    let (status, json) = pending.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
}
