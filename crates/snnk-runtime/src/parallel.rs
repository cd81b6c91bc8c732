//! Multi-threaded backend on a fixed-size rayon pool
//!
//! Each projection and each population is one unit of work. Subscriptions are
//! unloaded on the stepping thread before a phase starts, workers only send
//! onto the bus, and routing after each phase orders messages by the sender's
//! storage rank. Delivery order, and so every floating-point sum, matches the
//! sequential backend.

use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use snnk_core::{
    AnyPopulation, AnyProjection, BlifatNeuron, DeltaSynapse, LifNeuron, Message, MessageBus,
    MessageEndpoint, NeuronModel, Step, Subscription, SynapseModel, Uid,
};

use crate::backend::{Backend, SharedBackend};
use crate::config::ParallelConfig;
use crate::device::{CpuDevice, Device};
use crate::engine::{calculate_population, calculate_projection, Engine, Routing};
use crate::error::{BackendError, Result};

/// Registry name of the parallel backend
pub const PARALLEL_BACKEND_NAME: &str = "cpu-multi-threaded";

const NEURONS: &[&str] = &[BlifatNeuron::NAME, LifNeuron::NAME];
// STDP runs on the sequential backend only.
const SYNAPSES: &[&str] = &[DeltaSynapse::NAME];

/// Backend computing projections and populations concurrently
#[derive(Debug)]
pub struct ParallelBackend {
    engine: Engine,
    pool: ThreadPool,
    config: ParallelConfig,
    uid: Uid,
}

impl ParallelBackend {
    /// Create a backend with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ParallelConfig::default())
    }

    /// Create a backend with a validated configuration
    pub fn with_config(config: ParallelConfig) -> Result<Self> {
        config.validate()?;
        let prefix = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(move |index| format!("{}-{}", prefix, index))
            .build()
            .map_err(|e| BackendError::ThreadPool { reason: e.to_string() })?;

        log::info!("{}: started {} worker threads", PARALLEL_BACKEND_NAME, config.threads);
        Ok(Self {
            engine: Engine::new(PARALLEL_BACKEND_NAME, Routing::SenderRank),
            pool,
            config,
            uid: Uid::new_random(),
        })
    }

    /// Create a shared backend handle with the default configuration
    pub fn create() -> Result<SharedBackend> {
        Ok(Arc::new(Mutex::new(Self::new()?)))
    }

    /// Worker pool configuration
    pub fn config(&self) -> &ParallelConfig {
        &self.config
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

impl Backend for ParallelBackend {
    fn name(&self) -> &'static str {
        PARALLEL_BACKEND_NAME
    }

    fn plasticity_supported(&self) -> bool {
        false
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
        let endpoint = &engine.endpoint;
        let slots = &mut engine.projections;
        let impact_messages: usize = self.pool.install(|| {
            slots
                .par_iter_mut()
                .zip(inputs.par_iter())
                .map(|(slot, messages)| calculate_projection(slot, messages, endpoint, step) as usize)
                .sum()
        });

        self.engine.dispatch();

        let inputs = self.engine.unload_population_inputs();
        let engine = &mut self.engine;
        let endpoint = &engine.endpoint;
        let populations = &mut engine.populations;
        let spikes: usize = self.pool.install(|| {
            populations
                .par_iter_mut()
                .zip(inputs.par_iter())
                .map(|(population, messages)| calculate_population(population, messages, endpoint, step))
                .sum()
        });

        log::debug!(
            "{}: step {} sent {} impact messages, {} spikes",
            PARALLEL_BACKEND_NAME,
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
        vec![Box::new(CpuDevice::new(self.uid, self.config.threads))]
    }
}
