//! In-process fake storefront backend.
//!
//! Serves the two surfaces the tracker talks to:
//!
//! - `GET /api/orders/track?orderId=<id>`: the order as JSON, or 404
//!   `{"message":"Order not found"}`.
//! - `GET /ws`: WebSocket push channel. Every frame published on the bus is
//!   sent to every connected client.
//!
//! `build_router` is usable without a socket (drive it with
//! `tower::ServiceExt::oneshot`); [`FakeBackend::start`] binds an ephemeral
//! local port for end-to-end tests of the real HTTP and WebSocket clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::{broadcast, watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use trk_schemas::{ApiErrorBody, Order};

use crate::fixtures::order_update_frame;

pub const TRACK_PATH: &str = "/api/orders/track";
pub const PUSH_PATH: &str = "/ws";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct BackendState {
    orders: RwLock<HashMap<String, Order>>,
    /// Raw push frames, fanned out to every socket.
    bus: broadcast::Sender<String>,
    /// `false` holds every tracking request until it flips back.
    fetch_open: watch::Sender<bool>,
    fetches: AtomicUsize,
    live_sockets: AtomicUsize,
    sockets_changed: Notify,
}

impl BackendState {
    pub fn new() -> Self {
        let (bus, _rx) = broadcast::channel(256);
        let (fetch_open, _rx) = watch::channel(true);
        Self {
            orders: RwLock::new(HashMap::new()),
            bus,
            fetch_open,
            fetches: AtomicUsize::new(0),
            live_sockets: AtomicUsize::new(0),
            sockets_changed: Notify::new(),
        }
    }

    pub async fn put_order(&self, order: Order) {
        self.orders
            .write()
            .await
            .insert(order.order_id.clone(), order);
    }

    /// Publish a raw frame; returns how many sockets were subscribed.
    pub fn publish_raw(&self, text: impl Into<String>) -> usize {
        self.bus.send(text.into()).unwrap_or(0)
    }

    pub fn publish_update(&self, order: &Order) -> usize {
        self.publish_raw(order_update_frame(order))
    }

    pub fn hold_fetches(&self) {
        self.fetch_open.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.fetch_open.send_replace(true);
    }

    /// Tracking requests received so far, held ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Sockets currently subscribed to the bus.
    pub fn live_sockets(&self) -> usize {
        self.live_sockets.load(Ordering::SeqCst)
    }

    pub async fn wait_for_sockets(&self, n: usize) {
        loop {
            let notified = self.sockets_changed.notified();
            if self.live_sockets() == n {
                return;
            }
            notified.await;
        }
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route(TRACK_PATH, get(track_order))
        .route(PUSH_PATH, get(push_socket))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "ok": true, "service": "trk-fake-backend" })),
    )
}

#[derive(Debug, Deserialize)]
struct TrackQuery {
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiErrorBody {
            message: Some(message.to_string()),
        }),
    )
        .into_response()
}

async fn track_order(
    State(st): State<Arc<BackendState>>,
    Query(q): Query<TrackQuery>,
) -> Response {
    st.fetches.fetch_add(1, Ordering::SeqCst);

    let mut open = st.fetch_open.subscribe();
    // Err only if the sender is gone, which cannot happen while `st` lives.
    let _ = open.wait_for(|open| *open).await;

    let order_id = q.order_id.unwrap_or_default();
    if order_id.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "orderId is required");
    }
    match st.orders.read().await.get(&order_id) {
        Some(order) => (StatusCode::OK, Json(order.clone())).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn push_socket(ws: WebSocketUpgrade, State(st): State<Arc<BackendState>>) -> Response {
    ws.on_upgrade(move |socket| push_session(socket, st))
}

async fn push_session(mut socket: WebSocket, st: Arc<BackendState>) {
    let mut frames = BroadcastStream::new(st.bus.subscribe());
    st.live_sockets.fetch_add(1, Ordering::SeqCst);
    st.sockets_changed.notify_waiters();
    debug!("push socket subscribed");

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Err(_lagged)) => continue,
                None => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    st.live_sockets.fetch_sub(1, Ordering::SeqCst);
    st.sockets_changed.notify_waiters();
    debug!("push socket closed");
}

// ---------------------------------------------------------------------------
// Bound server
// ---------------------------------------------------------------------------

/// The router served on `127.0.0.1:<ephemeral>`. Stops when dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(BackendState::new());
        let app = build_router(Arc::clone(&state)).layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        info!(%addr, "fake backend listening");

        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "fake backend stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn state(&self) -> &Arc<BackendState> {
        &self.state
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn push_url(&self) -> String {
        format!("ws://{}{}", self.addr, PUSH_PATH)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
