//! Push-channel transports.
//!
//! A transport yields a stream of raw text frames. Dropping the stream
//! releases the underlying connection; the listener relies on that to close
//! the channel.

use std::fmt;
use std::pin::Pin;

use futures_util::{future, Stream, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Inbound text frames. The stream ends when the server closes the channel.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, ChannelError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The connection could not be established.
    Connect(String),
    /// The connection failed after it was open.
    Receive(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Connect(msg) => write!(f, "push connect failed: {msg}"),
            ChannelError::Receive(msg) => write!(f, "push receive failed: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

#[async_trait::async_trait]
pub trait PushTransport: Send + Sync {
    /// Where this transport connects, for logs.
    fn endpoint(&self) -> String;

    async fn open(&self) -> Result<FrameStream, ChannelError>;
}

/// WebSocket push channel. The client never writes application frames;
/// subscription is implicit on connect.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl PushTransport for WsTransport {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn open(&self) -> Result<FrameStream, ChannelError> {
        let (ws, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        // Pings are answered by tungstenite while reading; close frames end
        // the stream.
        let frames = ws.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Binary(bytes)) => String::from_utf8(bytes).ok().map(Ok),
                Ok(_) => None,
                Err(e) => Some(Err(ChannelError::Receive(e.to_string()))),
            })
        });

        Ok(Box::pin(frames))
    }
}
