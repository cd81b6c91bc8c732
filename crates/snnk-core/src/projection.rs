//! Synapse projections between populations

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::messaging::{SpikeMessage, Step, SynapticImpact};
use crate::synapse::{DeltaSynapse, StdpSynapse, SynapseModel};
use crate::uid::{Uid, UidGenerator};

/// One synapse: model record plus its endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct SynapseRecord<S> {
    /// Model parameters and state
    pub params: S,
    /// Neuron index in the presynaptic population
    pub source: u32,
    /// Neuron index in the postsynaptic population
    pub target: u32,
}

impl<S> SynapseRecord<S> {
    /// Create a synapse record
    pub fn new(params: S, source: u32, target: u32) -> Self {
        Self { params, source, target }
    }
}

/// Impact produced from a presynaptic spike, with its delivery step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledImpact {
    /// Step at which the impact must reach the postsynaptic population
    pub delivery_step: Step,
    /// The impact itself
    pub impact: SynapticImpact,
}

/// Directed group of synapses of one model
#[derive(Debug, Clone)]
pub struct Projection<S> {
    uid: Uid,
    presynaptic_uid: Uid,
    postsynaptic_uid: Uid,
    synapses: Vec<SynapseRecord<S>>,
    by_source: HashMap<u32, Vec<usize>>,
    by_target: HashMap<u32, Vec<usize>>,
    forcing: bool,
}

impl<S: SynapseModel> Projection<S> {
    /// Create a projection with explicit synapses
    pub fn new(uid: Uid, presynaptic_uid: Uid, postsynaptic_uid: Uid, synapses: Vec<SynapseRecord<S>>) -> Self {
        let mut projection = Self {
            uid,
            presynaptic_uid,
            postsynaptic_uid,
            synapses: Vec::new(),
            by_source: HashMap::new(),
            by_target: HashMap::new(),
            forcing: false,
        };
        projection.add_synapses(synapses);
        projection
    }

    /// Create a projection from a generator called for indexes `0..count`
    ///
    /// The generator returns `None` to skip an index.
    pub fn generate(
        uid_generator: &dyn UidGenerator,
        presynaptic_uid: Uid,
        postsynaptic_uid: Uid,
        count: usize,
        generator: impl FnMut(usize) -> Option<SynapseRecord<S>>,
    ) -> Self {
        let synapses = (0..count).filter_map(generator).collect();
        Self::new(uid_generator.generate(), presynaptic_uid, postsynaptic_uid, synapses)
    }

    /// Mark outgoing messages as forcing (subject to the synapse model policy)
    pub fn with_forcing(mut self, forcing: bool) -> Self {
        self.forcing = forcing;
        self
    }

    /// Append synapses and index them
    pub fn add_synapses(&mut self, synapses: impl IntoIterator<Item = SynapseRecord<S>>) {
        for synapse in synapses {
            let index = self.synapses.len();
            self.by_source.entry(synapse.source).or_default().push(index);
            self.by_target.entry(synapse.target).or_default().push(index);
            self.synapses.push(synapse);
        }
    }

    /// Projection identifier
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Population the projection reads spikes from
    pub fn presynaptic_uid(&self) -> Uid {
        self.presynaptic_uid
    }

    /// Population the projection sends impacts to
    pub fn postsynaptic_uid(&self) -> Uid {
        self.postsynaptic_uid
    }

    /// Number of synapses
    pub fn len(&self) -> usize {
        self.synapses.len()
    }

    /// Check if the projection has no synapses
    pub fn is_empty(&self) -> bool {
        self.synapses.is_empty()
    }

    /// Synapses in storage order
    pub fn synapses(&self) -> &[SynapseRecord<S>] {
        &self.synapses
    }

    /// Synapse at `index`
    pub fn get(&self, index: usize) -> Option<&SynapseRecord<S>> {
        self.synapses.get(index)
    }

    /// Forcing flag carried by outgoing messages
    pub fn is_forcing(&self) -> bool {
        S::forcing_policy(self.forcing)
    }

    /// Validate every synapse's parameters
    pub fn validate(&self) -> Result<()> {
        self.synapses.iter().try_for_each(|s| s.params.validate())
    }

    /// Check that every synapse targets a neuron below `population_size`
    pub fn check_targets(&self, population_size: usize) -> Result<()> {
        match self.synapses.iter().find(|s| s.target as usize >= population_size) {
            Some(s) => Err(CoreError::IndexOutOfRange {
                index: s.target,
                size: population_size,
            }),
            None => Ok(()),
        }
    }

    /// Compute the impacts caused by a presynaptic spike message
    ///
    /// Impacts are produced in spike order, then synapse storage order. The
    /// delivery step is `send_time + delay`, saturating at `Step::MAX` and never
    /// earlier than `current_step`.
    pub fn process_presynaptic(&mut self, message: &SpikeMessage, current_step: Step) -> Vec<ScheduledImpact> {
        let send_time = message.header.send_time;
        let mut scheduled = Vec::new();
        for neuron_index in &message.neuron_indexes {
            let Some(indexes) = self.by_source.get(neuron_index) else {
                continue;
            };
            for &synapse_index in indexes {
                let record = &mut self.synapses[synapse_index];
                let impact_value = record.params.compute_impact(send_time);
                let delivery_step = send_time
                    .saturating_add(record.params.delay() as Step)
                    .max(current_step);
                scheduled.push(ScheduledImpact {
                    delivery_step,
                    impact: SynapticImpact {
                        connection_index: synapse_index as u64,
                        impact_value,
                        synapse_type: record.params.output_type(),
                        presynaptic_neuron_index: record.source,
                        postsynaptic_neuron_index: record.target,
                    },
                });
            }
        }
        scheduled
    }

    /// Feed postsynaptic spikes to plastic synapses
    pub fn process_postsynaptic(&mut self, message: &SpikeMessage) {
        if !S::PLASTIC {
            return;
        }
        let send_time = message.header.send_time;
        for neuron_index in &message.neuron_indexes {
            if let Some(indexes) = self.by_target.get(neuron_index) {
                for &synapse_index in indexes {
                    self.synapses[synapse_index].params.on_postsynaptic_spike(send_time);
                }
            }
        }
    }

    /// Senders whose spikes this projection needs
    pub fn spike_sources(&self) -> Vec<Uid> {
        if S::PLASTIC && self.postsynaptic_uid != self.presynaptic_uid {
            vec![self.presynaptic_uid, self.postsynaptic_uid]
        } else {
            vec![self.presynaptic_uid]
        }
    }
}

/// Projection of any supported synapse model
#[derive(Debug, Clone)]
pub enum AnyProjection {
    /// Delta synapses
    Delta(Projection<DeltaSynapse>),
    /// Delta synapses with additive STDP
    AdditiveStdp(Projection<StdpSynapse>),
}

macro_rules! dispatch {
    ($value:expr, $p:ident => $body:expr) => {
        match $value {
            AnyProjection::Delta($p) => $body,
            AnyProjection::AdditiveStdp($p) => $body,
        }
    };
}

impl AnyProjection {
    /// Projection identifier
    pub fn uid(&self) -> Uid {
        dispatch!(self, p => p.uid())
    }

    /// Presynaptic population
    pub fn presynaptic_uid(&self) -> Uid {
        dispatch!(self, p => p.presynaptic_uid())
    }

    /// Postsynaptic population
    pub fn postsynaptic_uid(&self) -> Uid {
        dispatch!(self, p => p.postsynaptic_uid())
    }

    /// Number of synapses
    pub fn len(&self) -> usize {
        dispatch!(self, p => p.len())
    }

    /// Check if the projection has no synapses
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the synapse model
    pub fn synapse_model(&self) -> &'static str {
        match self {
            Self::Delta(_) => DeltaSynapse::NAME,
            Self::AdditiveStdp(_) => StdpSynapse::NAME,
        }
    }

    /// Whether the synapse model is plastic
    pub fn is_plastic(&self) -> bool {
        match self {
            Self::Delta(_) => DeltaSynapse::PLASTIC,
            Self::AdditiveStdp(_) => StdpSynapse::PLASTIC,
        }
    }

    /// Forcing flag carried by outgoing messages
    pub fn is_forcing(&self) -> bool {
        dispatch!(self, p => p.is_forcing())
    }

    /// Validate every synapse's parameters
    pub fn validate(&self) -> Result<()> {
        dispatch!(self, p => p.validate())
    }

    /// See [`Projection::check_targets`]
    pub fn check_targets(&self, population_size: usize) -> Result<()> {
        dispatch!(self, p => p.check_targets(population_size))
    }

    /// See [`Projection::process_presynaptic`]
    pub fn process_presynaptic(&mut self, message: &SpikeMessage, current_step: Step) -> Vec<ScheduledImpact> {
        dispatch!(self, p => p.process_presynaptic(message, current_step))
    }

    /// See [`Projection::process_postsynaptic`]
    pub fn process_postsynaptic(&mut self, message: &SpikeMessage) {
        dispatch!(self, p => p.process_postsynaptic(message))
    }

    /// See [`Projection::spike_sources`]
    pub fn spike_sources(&self) -> Vec<Uid> {
        dispatch!(self, p => p.spike_sources())
    }
}

impl From<Projection<DeltaSynapse>> for AnyProjection {
    fn from(projection: Projection<DeltaSynapse>) -> Self {
        Self::Delta(projection)
    }
}

impl From<Projection<StdpSynapse>> for AnyProjection {
    fn from(projection: Projection<StdpSynapse>) -> Self {
        Self::AdditiveStdp(projection)
    }
}
