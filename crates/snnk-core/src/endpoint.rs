//! Per-owner interface to the message bus

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::bus::{Inbox, MessageBus};
use crate::messaging::{Message, MessageKind, MessageVariant, SpikeMessage, SynapticImpactMessage};
use crate::subscription::{Subscription, SubscriptionVariant};
use crate::Uid;

/// An entity's interface to the bus: subscribe, send, receive and drain
///
/// Sending only needs `&self`, so an endpoint shared between worker threads
/// can publish concurrently; subscriptions are only touched through `&mut self`.
pub struct MessageEndpoint {
    bus: Arc<MessageBus>,
    inbox: Arc<Inbox>,
    subscriptions: HashMap<(Uid, MessageKind), SubscriptionVariant>,
}

impl MessageEndpoint {
    pub(crate) fn attach(bus: Arc<MessageBus>, inbox: Arc<Inbox>) -> Self {
        Self {
            bus,
            inbox,
            subscriptions: HashMap::new(),
        }
    }

    /// Bus this endpoint is attached to
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Subscribe `receiver` to messages of type `M` from `senders`
    ///
    /// Idempotent per (receiver, message type): if the subscription already
    /// exists it is returned unchanged and `senders` is ignored.
    pub fn subscribe<M: Message>(
        &mut self,
        receiver: Uid,
        senders: impl IntoIterator<Item = Uid>,
    ) -> &mut Subscription<M> {
        let entry = self
            .subscriptions
            .entry((receiver, M::KIND))
            .or_insert_with(|| {
                log::trace!("subscribing {} to {:?} messages", receiver, M::KIND);
                M::wrap_subscription(Subscription::new(receiver, senders))
            });
        match M::subscription_mut(entry) {
            Some(subscription) => subscription,
            None => unreachable!("subscriptions are keyed by message kind"),
        }
    }

    /// Subscribe to spikes
    pub fn subscribe_spikes(
        &mut self,
        receiver: Uid,
        senders: impl IntoIterator<Item = Uid>,
    ) -> &mut Subscription<SpikeMessage> {
        self.subscribe::<SpikeMessage>(receiver, senders)
    }

    /// Subscribe to synaptic impacts
    pub fn subscribe_impacts(
        &mut self,
        receiver: Uid,
        senders: impl IntoIterator<Item = Uid>,
    ) -> &mut Subscription<SynapticImpactMessage> {
        self.subscribe::<SynapticImpactMessage>(receiver, senders)
    }

    /// Remove the subscription of `receiver` for messages of type `M`
    pub fn unsubscribe<M: Message>(&mut self, receiver: Uid) -> bool {
        self.subscriptions.remove(&(receiver, M::KIND)).is_some()
    }

    /// Remove every subscription owned by `receiver`; returns how many
    pub fn remove_receiver(&mut self, receiver: Uid) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(owner, _), _| *owner != receiver);
        before - self.subscriptions.len()
    }

    /// Subscription of `receiver` for type `M`, if any
    pub fn subscription<M: Message>(&self, receiver: Uid) -> Option<&Subscription<M>> {
        self.subscriptions
            .get(&(receiver, M::KIND))
            .and_then(M::subscription)
    }

    /// Mutable subscription of `receiver` for type `M`, if any
    pub fn subscription_mut<M: Message>(&mut self, receiver: Uid) -> Option<&mut Subscription<M>> {
        self.subscriptions
            .get_mut(&(receiver, M::KIND))
            .and_then(M::subscription_mut)
    }

    /// Take the buffered messages of `receiver`'s subscription for type `M`
    pub fn unload_messages<M: Message>(&mut self, receiver: Uid) -> Vec<M> {
        self.subscription_mut::<M>(receiver)
            .map(Subscription::unload_messages)
            .unwrap_or_default()
    }

    /// Number of subscriptions held
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Publish a message on the bus
    pub fn send_message(&self, message: impl Into<MessageVariant>) {
        self.bus.send_message(message.into());
    }

    /// Pop one routed message from this endpoint's inbox
    pub fn receive_message(&self) -> Option<MessageVariant> {
        self.inbox.lock().pop_front()
    }

    /// Drain the inbox into matching subscriptions
    ///
    /// A message is copied into every subscription of its kind whose allow-list
    /// contains its sender; messages nobody listens to are dropped. Returns the
    /// number of messages drained.
    pub fn receive_all_messages(&mut self) -> usize {
        let mut count = 0;
        while let Some(message) = self.receive_message() {
            count += 1;
            self.deliver(&message);
        }
        count
    }

    fn deliver(&mut self, message: &MessageVariant) {
        let sender = message.sender_uid();
        let kind = message.kind();
        for subscription in self.subscriptions.values_mut() {
            match (subscription, message) {
                (SubscriptionVariant::Spike(s), MessageVariant::Spike(m)) if s.has_sender(&sender) => {
                    s.add_message(m.clone());
                }
                (SubscriptionVariant::SynapticImpact(s), MessageVariant::SynapticImpact(m))
                    if s.has_sender(&sender) =>
                {
                    s.add_message(m.clone());
                }
                _ => {}
            }
        }
        log::trace!("delivered {:?} message from {}", kind, sender);
    }
}

impl fmt::Debug for MessageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEndpoint")
            .field("subscriptions", &self.subscriptions.len())
            .field("inbox", &self.inbox.lock().len())
            .finish()
    }
}
