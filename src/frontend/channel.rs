use std::cell::{Cell, RefCell};
use serde::de::DeserializeOwned;
use crate::util::error;

type Handler<T> = Box<dyn FnMut(T) -> Result<(), error::Error>>;

/// Single-use, ordered, push-based delivery of the items streamed back by one request.
///
/// The consumer registers exactly one handler, then hands the channel to the request by value.
/// The producer calls [`Channel::send`] once per item; the handler runs synchronously, in
/// emission order, on the caller's execution context. There is no end-of-stream item: the
/// stream is over when the request that owns the channel completes.
pub struct Channel<T> {
    handler: RefCell<Option<Handler<T>>>,
    delivered: Cell<usize>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Channel {
            handler: RefCell::new(None),
            delivered: Cell::new(0),
        }
    }

    /// Creates a channel with its handler already registered.
    pub fn with_handler<F>(f: F) -> Self
    where
        F: FnMut(T) -> Result<(), error::Error> + 'static
    {
        return Channel {
            handler: RefCell::new(Some(Box::new(f))),
            delivered: Cell::new(0),
        };
    }

    /// Registers the handler. A channel accepts exactly one.
    pub fn on_message<F>(&self, f: F) -> Result<(), error::Error>
    where
        F: FnMut(T) -> Result<(), error::Error> + 'static
    {
        let mut handler = match self.handler.try_borrow_mut() {
            Ok(h) => h,
            Err(_) => { return Err(error::Error::ChannelError("Cannot register a handler while an item is being delivered.")); }
        };
        if handler.is_some() {
            return Err(error::Error::ChannelError("A handler is already registered for this channel."));
        }
        *handler = Some(Box::new(f));
        return Ok(());
    }

    /// Delivers one item to the handler.
    ///
    /// A failing handler only loses this item; later items are still delivered.
    pub fn send(&self, item: T) {
        let mut handler = match self.handler.try_borrow_mut() {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("item sent from inside its own channel handler was dropped");
                return;
            }
        };
        match handler.as_mut() {
            Some(f) => {
                self.delivered.set(self.delivered.get() + 1);
                if let Err(e) = f(item) {
                    tracing::warn!(error = %e, "channel handler failed for one item");
                }
            },
            None => {
                tracing::debug!("item sent to a channel with no handler was dropped");
            }
        }
    }

    /// Number of items that reached the handler.
    pub fn delivered(&self) -> usize {
        return self.delivered.get();
    }
}

impl<T: DeserializeOwned> Channel<T> {
    /// Decodes a JSON message body into an item and delivers it.
    /// Bodies that do not decode are dropped.
    pub fn send_json(&self, body: &str) {
        match serde_json::from_str::<T>(body) {
            Ok(item) => self.send(item),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable channel message was dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn delivers_in_emission_order() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let channel: Channel<i64> = Channel::new();
        channel.on_message(move |item| {
            sink.borrow_mut().push(item);
            return Ok(());
        }).unwrap();

        for i in [3, 1, 2] {
            channel.send(i);
        }
        assert_eq!(*received.borrow(), vec![3, 1, 2]);
        assert_eq!(channel.delivered(), 3);
    }

    #[test]
    fn second_handler_is_rejected() {
        let channel: Channel<i64> = Channel::with_handler(|_| Ok(()));
        assert!(channel.on_message(|_| Ok(())).is_err());
    }

    #[test]
    fn failing_item_does_not_end_the_stream() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let channel: Channel<i64> = Channel::with_handler(move |item| {
            if item == 2 {
                return Err(error::Error::AdhocError("bad item"));
            }
            sink.borrow_mut().push(item);
            return Ok(());
        });

        channel.send(1);
        channel.send(2);
        channel.send(3);
        assert_eq!(*received.borrow(), vec![1, 3]);
    }

    #[test]
    fn sends_from_inside_the_handler_are_dropped() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let channel: Rc<Channel<i64>> = Rc::new(Channel::new());
        let inner = Rc::downgrade(&channel);
        channel.on_message(move |item| {
            if item == 1 {
                if let Some(c) = inner.upgrade() {
                    c.send(99);
                }
            }
            sink.borrow_mut().push(item);
            return Ok(());
        }).unwrap();

        channel.send(1);
        channel.send(2);
        assert_eq!(*received.borrow(), vec![1, 2]);
        assert_eq!(channel.delivered(), 2);
    }

    #[test]
    fn items_without_handler_are_dropped() {
        let channel: Channel<i64> = Channel::new();
        channel.send(1);
        assert_eq!(channel.delivered(), 0);
    }

    #[test]
    fn json_bodies_are_decoded() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let channel: Channel<Vec<i64>> = Channel::with_handler(move |item| {
            sink.borrow_mut().push(item);
            return Ok(());
        });

        channel.send_json("[1, 2]");
        channel.send_json("not json");
        assert_eq!(*received.borrow(), vec![vec![1, 2]]);
    }
}
