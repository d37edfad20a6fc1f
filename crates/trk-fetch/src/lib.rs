//! trk-fetch
//!
//! One-shot order fetch against the storefront tracking endpoint.
//!
//! This crate owns the fetch boundary only: no retry, no caching, no view
//! state. A failed fetch is returned to the caller as a [`FetchError`] and
//! the caller decides what to show.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};
use trk_config::ApiConfig;
use trk_schemas::{ApiErrorBody, Order};

/// Shown when the backend gave no usable `message`, or the request never
/// produced a response.
pub const GENERIC_FETCH_ERROR: &str = "Network error. Please try again.";

/// Shown when the caller asks for a blank identifier.
pub const MISSING_ORDER_ID: &str = "Order ID is required";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Blank identifier (`status == None`, nothing was sent) or a non-2xx
    /// response. `message` is the backend's own message when it sent one.
    NotFoundOrInvalid {
        status: Option<u16>,
        message: String,
    },
    /// The request did not complete (connect, TLS, timeout, body read).
    Transport(String),
    /// 2xx response whose body is not a valid order.
    Decode(String),
}

impl FetchError {
    /// Text for the error panel.
    pub fn user_message(&self) -> &str {
        match self {
            FetchError::NotFoundOrInvalid { message, .. } => message,
            FetchError::Transport(_) | FetchError::Decode(_) => GENERIC_FETCH_ERROR,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFoundOrInvalid {
                status: Some(code),
                message,
            } => write!(f, "order fetch failed status={code}: {message}"),
            FetchError::NotFoundOrInvalid {
                status: None,
                message,
            } => write!(f, "order fetch refused: {message}"),
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Fetcher trait
// ---------------------------------------------------------------------------

/// Source of order snapshots.
///
/// Object safe so the tracker can hold an `Arc<dyn OrderFetcher>` and tests
/// can substitute a scripted implementation.
#[async_trait::async_trait]
pub trait OrderFetcher: Send + Sync {
    async fn fetch_order(&self, order_id: &str) -> Result<Order, FetchError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// `GET <base_url><tracking_path>?orderId=<id>`.
#[derive(Debug, Clone)]
pub struct HttpOrderFetcher {
    http: reqwest::Client,
    base_url: String,
    tracking_path: String,
    timeout: Option<Duration>,
}

impl HttpOrderFetcher {
    pub fn new(base_url: impl Into<String>, tracking_path: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            tracking_path: tracking_path.into(),
            timeout: None,
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        let mut fetcher = Self::new(api.base_url.clone(), api.tracking_path.clone());
        fetcher.timeout = api.fetch_timeout();
        fetcher
    }

    /// Apply a per-request timeout. Without it requests wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tracking_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.tracking_path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl OrderFetcher for HttpOrderFetcher {
    async fn fetch_order(&self, order_id: &str) -> Result<Order, FetchError> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(FetchError::NotFoundOrInvalid {
                status: None,
                message: MISSING_ORDER_ID.to_string(),
            });
        }

        let mut req = self
            .http
            .get(self.tracking_url())
            .query(&[("orderId", order_id)]);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(order_id, error = %e, "order fetch transport failure");
            FetchError::Transport(e.to_string())
        })?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message_from_body(&body);
            warn!(order_id, status = status.as_u16(), %message, "order fetch rejected");
            return Err(FetchError::NotFoundOrInvalid {
                status: Some(status.as_u16()),
                message,
            });
        }

        let order: Order =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        order
            .validate()
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        debug!(order_id, status = %order.status, "order fetched");
        Ok(order)
    }
}

/// The body's `message` when it is a JSON object with a non-blank
/// `message`, otherwise [`GENERIC_FETCH_ERROR`].
fn error_message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FETCH_ERROR.to_string())
}
