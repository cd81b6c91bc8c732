//! Messages exchanged over the bus
//!
//! Every message carries a [`MessageHeader`] naming its sender and the step it
//! was sent at. The bus routes by sender: a subscription lists the senders it
//! accepts, never the other way round.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::subscription::{Subscription, SubscriptionVariant};
use crate::Uid;

pub mod codec;
mod impact;
mod spike;

pub use codec::{from_bytes, to_bytes};
pub use impact::{OutputType, SynapticImpact, SynapticImpactMessage};
pub use spike::{SpikeData, SpikeIndex, SpikeMessage};

/// Discrete simulation time
pub type Step = u64;

/// Impact messages scheduled for future delivery, keyed by delivery step
pub type SynapticMessageQueue = BTreeMap<Step, SynapticImpactMessage>;

/// Common header of every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Entity that sent the message
    pub sender_uid: Uid,
    /// Step at which the message was sent
    pub send_time: Step,
}

impl MessageHeader {
    /// Create a new header
    pub const fn new(sender_uid: Uid, send_time: Step) -> Self {
        Self {
            sender_uid,
            send_time,
        }
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sender_uid, self.send_time)
    }
}

impl FromStr for MessageHeader {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut reader = codec::TokenReader::new(s);
        let header = reader.header()?;
        reader.finish()?;
        Ok(header)
    }
}

/// Kind tag used to key subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    /// [`SpikeMessage`]
    Spike,
    /// [`SynapticImpactMessage`]
    SynapticImpact,
}

/// Any message the bus can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageVariant {
    /// Spikes emitted by a population or an input channel
    Spike(SpikeMessage),
    /// Impacts emitted by a projection
    SynapticImpact(SynapticImpactMessage),
}

impl MessageVariant {
    /// Header of the wrapped message
    pub fn header(&self) -> &MessageHeader {
        match self {
            Self::Spike(m) => &m.header,
            Self::SynapticImpact(m) => &m.header,
        }
    }

    /// Sender of the wrapped message
    pub fn sender_uid(&self) -> Uid {
        self.header().sender_uid
    }

    /// Kind of the wrapped message
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Spike(_) => MessageKind::Spike,
            Self::SynapticImpact(_) => MessageKind::SynapticImpact,
        }
    }
}

impl From<SpikeMessage> for MessageVariant {
    fn from(message: SpikeMessage) -> Self {
        Self::Spike(message)
    }
}

impl From<SynapticImpactMessage> for MessageVariant {
    fn from(message: SynapticImpactMessage) -> Self {
        Self::SynapticImpact(message)
    }
}

/// A concrete message type that can be subscribed to
pub trait Message: Clone + Send + Sync + Into<MessageVariant> + 'static {
    /// Kind tag for subscription lookup
    const KIND: MessageKind;

    /// Message header
    fn header(&self) -> &MessageHeader;

    /// Extract the concrete message from a variant
    fn from_variant(variant: &MessageVariant) -> Option<&Self>;

    /// Wrap a typed subscription into the endpoint's storage variant
    fn wrap_subscription(subscription: Subscription<Self>) -> SubscriptionVariant;

    /// View a stored subscription as this message type
    fn subscription(variant: &SubscriptionVariant) -> Option<&Subscription<Self>>;

    /// Mutable view of a stored subscription as this message type
    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>>;
}

impl Message for SpikeMessage {
    const KIND: MessageKind = MessageKind::Spike;

    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn from_variant(variant: &MessageVariant) -> Option<&Self> {
        match variant {
            MessageVariant::Spike(m) => Some(m),
            _ => None,
        }
    }

    fn wrap_subscription(subscription: Subscription<Self>) -> SubscriptionVariant {
        SubscriptionVariant::Spike(subscription)
    }

    fn subscription(variant: &SubscriptionVariant) -> Option<&Subscription<Self>> {
        match variant {
            SubscriptionVariant::Spike(s) => Some(s),
            _ => None,
        }
    }

    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>> {
        match variant {
            SubscriptionVariant::Spike(s) => Some(s),
            _ => None,
        }
    }
}

impl Message for SynapticImpactMessage {
    const KIND: MessageKind = MessageKind::SynapticImpact;

    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn from_variant(variant: &MessageVariant) -> Option<&Self> {
        match variant {
            MessageVariant::SynapticImpact(m) => Some(m),
            _ => None,
        }
    }

    fn wrap_subscription(subscription: Subscription<Self>) -> SubscriptionVariant {
        SubscriptionVariant::SynapticImpact(subscription)
    }

    fn subscription(variant: &SubscriptionVariant) -> Option<&Subscription<Self>> {
        match variant {
            SubscriptionVariant::SynapticImpact(s) => Some(s),
            _ => None,
        }
    }

    fn subscription_mut(variant: &mut SubscriptionVariant) -> Option<&mut Subscription<Self>> {
        match variant {
            SubscriptionVariant::SynapticImpact(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text_roundtrip() {
        let header = MessageHeader::new(Uid::from_u128(42), 12345);
        let text = header.to_string();
        let parsed: MessageHeader = text.parse().unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_trailing_garbage() {
        let text = format!("{} 5 extra", Uid::from_u128(1));
        assert!(text.parse::<MessageHeader>().is_err());
    }

    #[test]
    fn test_variant_accessors() {
        let uid = Uid::from_u128(3);
        let variant: MessageVariant = SpikeMessage::new(MessageHeader::new(uid, 2), vec![1]).into();
        assert_eq!(variant.kind(), MessageKind::Spike);
        assert_eq!(variant.sender_uid(), uid);
        assert!(SpikeMessage::from_variant(&variant).is_some());
        assert!(SynapticImpactMessage::from_variant(&variant).is_none());
    }
}
