//! In-process message bus
//!
//! Producers enqueue onto a shared pending queue from any thread. Routing is a
//! single-threaded step that copies every pending message into the inbox of
//! every live endpoint; each endpoint then drains its inbox into its own
//! subscriptions. Actors that only publish hold a [`MessageSender`], which has
//! no inbox and so never accumulates routed traffic.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::endpoint::MessageEndpoint;
use crate::messaging::MessageVariant;

pub(crate) type Inbox = Mutex<VecDeque<MessageVariant>>;

/// Shared message bus connecting any number of endpoints
#[derive(Debug, Default)]
pub struct MessageBus {
    pending: Mutex<Vec<MessageVariant>>,
    inboxes: Mutex<Vec<Weak<Inbox>>>,
}

impl MessageBus {
    /// Create a new bus with no endpoints
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create an endpoint attached to this bus
    pub fn create_endpoint(self: &Arc<Self>) -> MessageEndpoint {
        let inbox = Arc::new(Inbox::default());
        self.inboxes.lock().push(Arc::downgrade(&inbox));
        MessageEndpoint::attach(Arc::clone(self), inbox)
    }

    /// Create a send-only handle to this bus
    pub fn sender(self: &Arc<Self>) -> MessageSender {
        MessageSender {
            bus: Arc::clone(self),
        }
    }

    /// Enqueue a message; safe to call concurrently from many threads
    pub fn send_message(&self, message: MessageVariant) {
        self.pending.lock().push(message);
    }

    /// Number of messages waiting to be routed
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of endpoints still alive
    pub fn endpoint_count(&self) -> usize {
        self.inboxes
            .lock()
            .iter()
            .filter(|inbox| inbox.strong_count() > 0)
            .count()
    }

    /// Route pending messages to every endpoint in insertion order
    ///
    /// Returns the number of messages routed.
    pub fn route_messages(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock());
        self.deliver(batch)
    }

    /// Route pending messages after a stable sort by `key`
    ///
    /// Messages with equal keys keep their insertion order, so per-sender FIFO
    /// holds whenever the key is a function of the sender.
    pub fn route_messages_by<K, F>(&self, key: F) -> usize
    where
        K: Ord,
        F: FnMut(&MessageVariant) -> K,
    {
        let mut batch = std::mem::take(&mut *self.pending.lock());
        batch.sort_by_key(key);
        self.deliver(batch)
    }

    fn deliver(&self, batch: Vec<MessageVariant>) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let live: Vec<Arc<Inbox>> = {
            let mut inboxes = self.inboxes.lock();
            inboxes.retain(|inbox| inbox.strong_count() > 0);
            inboxes.iter().filter_map(Weak::upgrade).collect()
        };

        log::trace!("routing {} messages to {} endpoints", batch.len(), live.len());

        for inbox in &live {
            inbox.lock().extend(batch.iter().cloned());
        }
        batch.len()
    }
}

/// Send-only handle to a [`MessageBus`]
///
/// Routing skips senders entirely: nothing is buffered on their behalf.
#[derive(Debug, Clone)]
pub struct MessageSender {
    bus: Arc<MessageBus>,
}

impl MessageSender {
    /// Bus this handle publishes on
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Publish a message on the bus
    pub fn send_message(&self, message: impl Into<MessageVariant>) {
        self.bus.send_message(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{MessageHeader, SpikeMessage};
    use crate::Uid;

    fn spike(sender: u128, time: u64) -> MessageVariant {
        SpikeMessage::new(MessageHeader::new(Uid::from_u128(sender), time), vec![0]).into()
    }

    #[test]
    fn test_route_fans_out_to_all_endpoints() {
        let bus = MessageBus::new();
        let a = bus.create_endpoint();
        let b = bus.create_endpoint();
        assert_eq!(bus.endpoint_count(), 2);

        bus.send_message(spike(1, 0));
        assert_eq!(bus.pending_count(), 1);
        assert_eq!(bus.route_messages(), 1);
        assert_eq!(bus.pending_count(), 0);

        assert!(a.receive_message().is_some());
        assert!(b.receive_message().is_some());
        assert!(a.receive_message().is_none());
    }

    #[test]
    fn test_dropped_endpoints_are_pruned() {
        let bus = MessageBus::new();
        let keep = bus.create_endpoint();
        {
            let _gone = bus.create_endpoint();
        }
        bus.send_message(spike(1, 0));
        bus.route_messages();
        assert_eq!(bus.endpoint_count(), 1);
        assert!(keep.receive_message().is_some());
    }

    #[test]
    fn test_keyed_route_is_stable() {
        let bus = MessageBus::new();
        let ep = bus.create_endpoint();
        bus.send_message(spike(2, 0));
        bus.send_message(spike(1, 0));
        bus.send_message(spike(2, 1));
        bus.send_message(spike(1, 1));
        bus.route_messages_by(|m| m.sender_uid());

        let order: Vec<(u128, u64)> = std::iter::from_fn(|| ep.receive_message())
            .map(|m| (m.sender_uid().as_u128(), m.header().send_time))
            .collect();
        assert_eq!(order, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_sender_has_no_inbox() {
        let bus = MessageBus::new();
        let listener = bus.create_endpoint();
        let input = bus.sender();
        assert_eq!(bus.endpoint_count(), 1);

        for t in 0..1000 {
            input.send_message(spike(1, t));
            bus.send_message(spike(2, t));
            assert_eq!(bus.route_messages(), 2);
        }
        assert_eq!(bus.endpoint_count(), 1);
        assert_eq!(std::iter::from_fn(|| listener.receive_message()).count(), 2000);
    }

    #[test]
    fn test_concurrent_send() {
        let bus = MessageBus::new();
        let ep = bus.create_endpoint();
        std::thread::scope(|scope| {
            for sender in 0..8u128 {
                let bus = &bus;
                scope.spawn(move || {
                    for t in 0..100 {
                        bus.send_message(spike(sender, t));
                    }
                });
            }
        });
        assert_eq!(bus.route_messages(), 800);
        assert_eq!(std::iter::from_fn(|| ep.receive_message()).count(), 800);
    }
}
