//! Neuron populations

use crate::error::Result;
use crate::messaging::{SpikeData, SynapticImpactMessage};
use crate::neuron::{BlifatNeuron, LifNeuron, NeuronModel};
use crate::uid::{Uid, UidGenerator};

/// Group of neurons of one model
#[derive(Debug, Clone)]
pub struct Population<N> {
    uid: Uid,
    neurons: Vec<N>,
}

impl<N: NeuronModel> Population<N> {
    /// Create a population from explicit neuron records
    pub fn new(uid: Uid, neurons: Vec<N>) -> Self {
        Self { uid, neurons }
    }

    /// Create a population of `count` neurons produced by `generator`
    pub fn generate(
        uid_generator: &dyn UidGenerator,
        count: usize,
        generator: impl FnMut(usize) -> N,
    ) -> Self {
        Self::new(uid_generator.generate(), (0..count).map(generator).collect())
    }

    /// Population identifier
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Number of neurons
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// Check if the population has no neurons
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Neuron records in index order
    pub fn neurons(&self) -> &[N] {
        &self.neurons
    }

    /// Mutable neuron records
    pub fn neurons_mut(&mut self) -> &mut [N] {
        &mut self.neurons
    }

    /// Neuron at `index`
    pub fn get(&self, index: usize) -> Option<&N> {
        self.neurons.get(index)
    }

    /// Validate every neuron's parameters
    pub fn validate(&self) -> Result<()> {
        self.neurons.iter().try_for_each(N::validate)
    }

    /// Accumulate the impacts of one message; returns how many were dropped
    pub fn integrate(&mut self, message: &SynapticImpactMessage) -> usize {
        let mut dropped = 0;
        for impact in &message.impacts {
            match self.neurons.get_mut(impact.postsynaptic_neuron_index as usize) {
                Some(neuron) => {
                    neuron.integrate(impact);
                    if message.is_forcing {
                        neuron.force();
                    }
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            log::warn!(
                "population {}: dropped {} impacts from {} with out-of-range targets",
                self.uid,
                dropped,
                message.header.sender_uid
            );
        }
        dropped
    }

    /// Advance every neuron one step; returns firing indexes in ascending order
    pub fn update(&mut self) -> SpikeData {
        self.neurons
            .iter_mut()
            .enumerate()
            .filter_map(|(index, neuron)| neuron.emit().then_some(index as u32))
            .collect()
    }
}

/// Population of any supported neuron model
#[derive(Debug, Clone)]
pub enum AnyPopulation {
    /// BLIFAT neurons
    Blifat(Population<BlifatNeuron>),
    /// LIF neurons
    Lif(Population<LifNeuron>),
}

impl AnyPopulation {
    /// Population identifier
    pub fn uid(&self) -> Uid {
        match self {
            Self::Blifat(p) => p.uid(),
            Self::Lif(p) => p.uid(),
        }
    }

    /// Number of neurons
    pub fn len(&self) -> usize {
        match self {
            Self::Blifat(p) => p.len(),
            Self::Lif(p) => p.len(),
        }
    }

    /// Check if the population has no neurons
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the neuron model
    pub fn neuron_model(&self) -> &'static str {
        match self {
            Self::Blifat(_) => BlifatNeuron::NAME,
            Self::Lif(_) => LifNeuron::NAME,
        }
    }

    /// Validate every neuron's parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Blifat(p) => p.validate(),
            Self::Lif(p) => p.validate(),
        }
    }

    /// See [`Population::integrate`]
    pub fn integrate(&mut self, message: &SynapticImpactMessage) -> usize {
        match self {
            Self::Blifat(p) => p.integrate(message),
            Self::Lif(p) => p.integrate(message),
        }
    }

    /// See [`Population::update`]
    pub fn update(&mut self) -> SpikeData {
        match self {
            Self::Blifat(p) => p.update(),
            Self::Lif(p) => p.update(),
        }
    }
}

impl From<Population<BlifatNeuron>> for AnyPopulation {
    fn from(population: Population<BlifatNeuron>) -> Self {
        Self::Blifat(population)
    }
}

impl From<Population<LifNeuron>> for AnyPopulation {
    fn from(population: Population<LifNeuron>) -> Self {
        Self::Lif(population)
    }
}
