//! Single-threaded reference backend

use std::sync::Arc;

use parking_lot::Mutex;
use snnk_core::{
    AnyPopulation, AnyProjection, BlifatNeuron, DeltaSynapse, LifNeuron, Message, MessageBus,
    MessageEndpoint, NeuronModel, StdpSynapse, Step, Subscription, SynapseModel, Uid,
};

use crate::backend::{Backend, SharedBackend};
use crate::device::{CpuDevice, Device};
use crate::engine::{calculate_population, calculate_projection, Engine, Routing};
use crate::error::Result;

/// Registry name of the sequential backend
pub const SEQUENTIAL_BACKEND_NAME: &str = "cpu-single-threaded";

const NEURONS: &[&str] = &[BlifatNeuron::NAME, LifNeuron::NAME];
const SYNAPSES: &[&str] = &[DeltaSynapse::NAME, StdpSynapse::NAME];

/// Backend computing every entity in storage order on the calling thread
#[derive(Debug)]
pub struct SequentialBackend {
    engine: Engine,
    uid: Uid,
}

impl Default for SequentialBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            engine: Engine::new(SEQUENTIAL_BACKEND_NAME, Routing::Insertion),
            uid: Uid::new_random(),
        }
    }

    /// Create a shared backend handle
    pub fn create() -> SharedBackend {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Subscribe `receiver` on the backend's endpoint
    pub fn subscribe<M: Message>(
        &mut self,
        receiver: Uid,
        senders: impl IntoIterator<Item = Uid>,
    ) -> &mut Subscription<M> {
        self.engine.endpoint.subscribe::<M>(receiver, senders)
    }
}

impl Backend for SequentialBackend {
    fn name(&self) -> &'static str {
        SEQUENTIAL_BACKEND_NAME
    }

    fn plasticity_supported(&self) -> bool {
        true
    }

    fn supported_neurons(&self) -> &'static [&'static str] {
        NEURONS
    }

    fn supported_synapses(&self) -> &'static [&'static str] {
        SYNAPSES
    }

    fn load_populations(&mut self, populations: Vec<AnyPopulation>) -> Result<()> {
        self.engine.load_populations(populations, NEURONS)
    }

    fn load_projections(&mut self, projections: Vec<AnyProjection>) -> Result<()> {
        self.engine.load_projections(projections, SYNAPSES)
    }

    fn remove_populations(&mut self, uids: &[Uid]) {
        self.engine.ignore_removal("populations", uids);
    }

    fn remove_projections(&mut self, uids: &[Uid]) {
        self.engine.ignore_removal("projections", uids);
    }

    fn step(&mut self) {
        let step = self.engine.step_count();
        self.engine.begin_step();

        let inputs = self.engine.unload_projection_inputs();
        let engine = &mut self.engine;
        let mut impact_messages = 0;
        for (slot, messages) in engine.projections.iter_mut().zip(&inputs) {
            impact_messages += calculate_projection(slot, messages, &engine.endpoint, step) as usize;
        }

        self.engine.dispatch();

        let inputs = self.engine.unload_population_inputs();
        let engine = &mut self.engine;
        let mut spikes = 0;
        for (population, messages) in engine.populations.iter_mut().zip(&inputs) {
            spikes += calculate_population(population, messages, &engine.endpoint, step);
        }

        log::debug!(
            "{}: step {} sent {} impact messages, {} spikes",
            SEQUENTIAL_BACKEND_NAME,
            step,
            impact_messages,
            spikes
        );
        self.engine.advance();
    }

    fn step_count(&self) -> Step {
        self.engine.step_count()
    }

    fn message_bus(&self) -> &Arc<MessageBus> {
        &self.engine.bus
    }

    fn message_endpoint_mut(&mut self) -> &mut MessageEndpoint {
        &mut self.engine.endpoint
    }

    fn populations(&self) -> Box<dyn Iterator<Item = &AnyPopulation> + '_> {
        Box::new(self.engine.populations())
    }

    fn projections(&self) -> Box<dyn Iterator<Item = &AnyProjection> + '_> {
        Box::new(self.engine.projections())
    }

    fn devices(&self) -> Vec<Box<dyn Device>> {
        vec![Box::new(CpuDevice::new(self.uid, 1))]
    }
}
