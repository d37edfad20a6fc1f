//! Subscribe-with-predicate over decoded push frames.
//!
//! Each subscription is a `(predicate, handler)` pair. [`UpdateRouter::dispatch`]
//! decodes a frame once and hands a copy of the order to every handler whose
//! predicate accepts it. Nothing here touches the network, so filtering is
//! tested directly against frame strings.

use trk_schemas::Order;

use crate::frame::{decode_frame, Inbound, MalformedMessage};

type Predicate = Box<dyn Fn(&Order) -> bool + Send>;
type Handler = Box<dyn FnMut(Order) + Send>;

struct Subscription {
    predicate: Predicate,
    handler: Handler,
}

/// Outcome of dispatching one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// An `order_update` reached `handlers` subscriptions (always >= 1).
    Delivered { order_id: String, handlers: usize },
    /// An `order_update` that no predicate accepted.
    NoMatch { order_id: String },
    /// A non-`order_update` event.
    OtherEvent(String),
    /// Undecodable frame; dropped.
    Malformed(MalformedMessage),
}

#[derive(Default)]
pub struct UpdateRouter {
    subs: Vec<Subscription>,
}

impl UpdateRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every order update accepted by `predicate`.
    pub fn on_update<P, H>(&mut self, predicate: P, handler: H) -> &mut Self
    where
        P: Fn(&Order) -> bool + Send + 'static,
        H: FnMut(Order) + Send + 'static,
    {
        self.subs.push(Subscription {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    pub fn dispatch(&mut self, frame: &str) -> Dispatch {
        match decode_frame(frame) {
            Ok(inbound) => self.dispatch_inbound(inbound),
            Err(e) => Dispatch::Malformed(e),
        }
    }

    pub fn dispatch_inbound(&mut self, inbound: Inbound) -> Dispatch {
        let order = match inbound {
            Inbound::OrderUpdate(order) => order,
            Inbound::OtherEvent(name) => return Dispatch::OtherEvent(name),
        };

        let mut handlers = 0;
        for sub in self.subs.iter_mut() {
            if (sub.predicate)(&order) {
                (sub.handler)(order.clone());
                handlers += 1;
            }
        }

        if handlers == 0 {
            Dispatch::NoMatch {
                order_id: order.order_id,
            }
        } else {
            Dispatch::Delivered {
                order_id: order.order_id,
                handlers,
            }
        }
    }
}

/// Predicate accepting only updates for `order_id` (exact match).
pub fn for_order(order_id: impl Into<String>) -> impl Fn(&Order) -> bool + Send + 'static {
    let order_id = order_id.into();
    move |order: &Order| order.order_id == order_id
}
