//! Core types of the snnk spiking network execution kernel
//!
//! This crate provides identifiers, the two message types exchanged during a
//! simulation, the in-process message bus with its per-owner endpoints, and the
//! population and projection containers that backends step.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod uid;
pub mod messaging;
pub mod subscription;
pub mod bus;
pub mod endpoint;
pub mod neuron;
pub mod synapse;
pub mod population;
pub mod projection;

// Re-export essential types
pub use error::{CoreError, Result};
pub use uid::{RandomUidGenerator, SequentialUidGenerator, Uid, UidGenerator};
pub use messaging::{
    Message, MessageHeader, MessageKind, MessageVariant, OutputType, SpikeData, SpikeIndex,
    SpikeMessage, Step, SynapticImpact, SynapticImpactMessage, SynapticMessageQueue,
};
pub use subscription::{Subscription, SubscriptionVariant};
pub use bus::{MessageBus, MessageSender};
pub use endpoint::MessageEndpoint;
pub use neuron::{BlifatNeuron, LifNeuron, NeuronModel};
pub use synapse::{DeltaSynapse, StdpSynapse, SynapseModel};
pub use population::{AnyPopulation, Population};
pub use projection::{AnyProjection, Projection, ScheduledImpact, SynapseRecord};

/// Core crate version for compatibility checking
pub const CORE_VERSION: u32 = 1;
