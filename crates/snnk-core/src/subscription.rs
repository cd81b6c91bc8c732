//! Receiver-owned message inboxes

use std::collections::BTreeSet;

use crate::messaging::{Message, MessageKind, SpikeMessage, SynapticImpactMessage};
use crate::Uid;

/// Filtered, ordered inbox of one message type for one receiver
///
/// The sender allow-list is fixed at creation. An empty allow-list is valid
/// and yields a subscription that never receives anything.
#[derive(Debug, Clone)]
pub struct Subscription<M> {
    receiver_uid: Uid,
    senders: BTreeSet<Uid>,
    messages: Vec<M>,
}

impl<M: Message> Subscription<M> {
    /// Create a subscription accepting messages from `senders`
    pub fn new(receiver_uid: Uid, senders: impl IntoIterator<Item = Uid>) -> Self {
        Self {
            receiver_uid,
            senders: senders.into_iter().collect(),
            messages: Vec::new(),
        }
    }

    /// Receiver owning this subscription
    pub fn receiver_uid(&self) -> Uid {
        self.receiver_uid
    }

    /// Allowed senders
    pub fn senders(&self) -> &BTreeSet<Uid> {
        &self.senders
    }

    /// Check if `sender` is on the allow-list
    pub fn has_sender(&self, sender: &Uid) -> bool {
        self.senders.contains(sender)
    }

    /// Append a message if its sender is allowed; returns whether it was kept
    pub fn add_message(&mut self, message: M) -> bool {
        if !self.has_sender(&message.header().sender_uid) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Buffered messages in arrival order
    pub fn get_messages(&self) -> &[M] {
        &self.messages
    }

    /// Take all buffered messages, leaving the buffer empty
    pub fn unload_messages(&mut self) -> Vec<M> {
        std::mem::take(&mut self.messages)
    }

    /// Drop all buffered messages
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Message kind accepted by this subscription
    pub fn kind(&self) -> MessageKind {
        M::KIND
    }
}

/// Storage variant for subscriptions of every supported message type
#[derive(Debug, Clone)]
pub enum SubscriptionVariant {
    /// Spike inbox
    Spike(Subscription<SpikeMessage>),
    /// Synaptic impact inbox
    SynapticImpact(Subscription<SynapticImpactMessage>),
}

impl SubscriptionVariant {
    /// Receiver owning the wrapped subscription
    pub fn receiver_uid(&self) -> Uid {
        match self {
            Self::Spike(s) => s.receiver_uid(),
            Self::SynapticImpact(s) => s.receiver_uid(),
        }
    }

    /// Message kind of the wrapped subscription
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Spike(_) => MessageKind::Spike,
            Self::SynapticImpact(_) => MessageKind::SynapticImpact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessageHeader;

    #[test]
    fn test_subscription_basics() {
        let receiver = Uid::from_u128(1);
        let sender = Uid::from_u128(2);
        let mut subs = Subscription::<SpikeMessage>::new(receiver, [sender]);

        assert_eq!(subs.receiver_uid(), receiver);
        assert!(subs.has_sender(&sender));
        assert_eq!(subs.kind(), MessageKind::Spike);

        assert!(subs.add_message(SpikeMessage::new(MessageHeader::new(sender, 0), vec![])));
        assert_eq!(subs.get_messages().len(), 1);
    }

    #[test]
    fn test_subscription_rejects_unknown_sender() {
        let mut subs = Subscription::<SpikeMessage>::new(Uid::from_u128(1), [Uid::from_u128(2)]);
        let stranger = SpikeMessage::new(MessageHeader::new(Uid::from_u128(3), 0), vec![1]);
        assert!(!subs.add_message(stranger));
        assert!(subs.get_messages().is_empty());
    }

    #[test]
    fn test_empty_allow_list_mutes() {
        let mut subs = Subscription::<SpikeMessage>::new(Uid::from_u128(1), std::iter::empty());
        assert!(!subs.add_message(SpikeMessage::new(MessageHeader::new(Uid::nil(), 0), vec![])));
        assert!(subs.get_messages().is_empty());
    }

    #[test]
    fn test_unload_clears() {
        let sender = Uid::from_u128(2);
        let mut subs = Subscription::<SpikeMessage>::new(Uid::from_u128(1), [sender]);
        subs.add_message(SpikeMessage::new(MessageHeader::new(sender, 0), vec![0]));
        subs.add_message(SpikeMessage::new(MessageHeader::new(sender, 1), vec![1]));

        let taken = subs.unload_messages();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].header.send_time, 0);
        assert!(subs.get_messages().is_empty());

        subs.add_message(SpikeMessage::new(MessageHeader::new(sender, 2), vec![2]));
        subs.clear_messages();
        assert!(subs.get_messages().is_empty());
    }
}
