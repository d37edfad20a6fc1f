//! trk-live
//!
//! Push-channel listener for order updates.
//!
//! The push server broadcasts every event to every connected client, so
//! filtering happens here, client-side, by order id:
//!
//! - [`frame`] decodes one text frame into an [`Inbound`] event or a
//!   [`MalformedMessage`].
//! - [`router`] is the subscribe-with-predicate primitive
//!   ([`UpdateRouter::on_update`]); it knows nothing about sockets.
//! - [`transport`] opens the raw frame stream ([`WsTransport`] in
//!   production, scripted streams in tests).
//! - [`listener`] ties them together in a task whose connection lifetime is
//!   owned by a [`ChannelHandle`].

pub mod frame;
pub mod listener;
pub mod router;
pub mod transport;

pub use frame::{decode_frame, Inbound, MalformedMessage};
pub use listener::{ChannelHandle, ListenerExit, LiveUpdateListener};
pub use router::{for_order, Dispatch, UpdateRouter};
pub use transport::{ChannelError, FrameStream, PushTransport, WsTransport};
