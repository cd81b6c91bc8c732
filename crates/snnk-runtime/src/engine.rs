//! Step engine shared by the backends
//!
//! A step runs `Dispatch → ComputeProjections → Dispatch → ComputePopulations
//! → Advance`. The second dispatch delivers impacts emitted this step to their
//! populations within the same step; the route at `Advance` lets external
//! endpoints observe this step's spikes before the next call to `step`.
//! Backends differ only in how the two compute phases are scheduled.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use snnk_core::{
    AnyPopulation, AnyProjection, MessageBus, MessageEndpoint, MessageHeader, SpikeMessage, Step,
    SynapticImpactMessage, SynapticMessageQueue, Uid,
};

use crate::error::{BackendError, Result};

/// Projection together with its private pending-message queue
#[derive(Debug)]
pub(crate) struct ProjectionSlot {
    pub(crate) projection: AnyProjection,
    pub(crate) queue: SynapticMessageQueue,
}

/// How pending bus messages are ordered before routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Routing {
    /// Order of enqueueing
    Insertion,
    /// Stable sort by the sender's storage rank; external senders last
    SenderRank,
}

/// Network state and the phase barriers common to every backend
#[derive(Debug)]
pub(crate) struct Engine {
    pub(crate) name: &'static str,
    pub(crate) bus: Arc<MessageBus>,
    pub(crate) endpoint: MessageEndpoint,
    pub(crate) populations: Vec<AnyPopulation>,
    pub(crate) projections: Vec<ProjectionSlot>,
    step: Step,
    initialized: bool,
    uids: HashSet<Uid>,
    ranks: HashMap<Uid, usize>,
    routing: Routing,
}

impl Engine {
    pub(crate) fn new(name: &'static str, routing: Routing) -> Self {
        let bus = MessageBus::new();
        let endpoint = bus.create_endpoint();
        Self {
            name,
            bus,
            endpoint,
            populations: Vec::new(),
            projections: Vec::new(),
            step: 0,
            initialized: false,
            uids: HashSet::new(),
            ranks: HashMap::new(),
            routing,
        }
    }

    pub(crate) fn step_count(&self) -> Step {
        self.step
    }

    fn ensure_open(&self) -> Result<()> {
        if self.initialized {
            return Err(BackendError::NetworkSealed { step: self.step });
        }
        Ok(())
    }

    fn reserve_uids(&self, uids: impl IntoIterator<Item = Uid>) -> Result<()> {
        let mut batch = HashSet::new();
        for uid in uids {
            if self.uids.contains(&uid) || !batch.insert(uid) {
                return Err(BackendError::invalid_configuration(format!("duplicate uid {}", uid)));
            }
        }
        Ok(())
    }

    pub(crate) fn load_populations(&mut self, populations: Vec<AnyPopulation>, supported: &[&str]) -> Result<()> {
        self.ensure_open()?;
        for population in &populations {
            if !supported.contains(&population.neuron_model()) {
                return Err(BackendError::unsupported_model(population.neuron_model(), self.name));
            }
            population.validate()?;
        }
        self.reserve_uids(populations.iter().map(AnyPopulation::uid))?;

        log::info!("{}: loading {} populations", self.name, populations.len());
        self.uids.extend(populations.iter().map(AnyPopulation::uid));
        self.populations.extend(populations);
        Ok(())
    }

    pub(crate) fn load_projections(&mut self, projections: Vec<AnyProjection>, supported: &[&str]) -> Result<()> {
        self.ensure_open()?;
        for projection in &projections {
            if !supported.contains(&projection.synapse_model()) {
                return Err(BackendError::unsupported_model(projection.synapse_model(), self.name));
            }
            projection.validate()?;
        }
        self.reserve_uids(projections.iter().map(AnyProjection::uid))?;

        log::info!("{}: loading {} projections", self.name, projections.len());
        self.uids.extend(projections.iter().map(AnyProjection::uid));
        self.projections.extend(projections.into_iter().map(|projection| ProjectionSlot {
            projection,
            queue: SynapticMessageQueue::new(),
        }));
        Ok(())
    }

    pub(crate) fn ignore_removal(&self, kind: &str, uids: &[Uid]) {
        if !uids.is_empty() {
            log::debug!("{}: removal of {} {} ignored", self.name, uids.len(), kind);
        }
    }

    pub(crate) fn populations(&self) -> impl Iterator<Item = &AnyPopulation> {
        self.populations.iter()
    }

    pub(crate) fn projections(&self) -> impl Iterator<Item = &AnyProjection> {
        self.projections.iter().map(|slot| &slot.projection)
    }

    /// Seal the network and create the entities' subscriptions
    fn initialize(&mut self) {
        for slot in &self.projections {
            let projection = &slot.projection;
            self.endpoint
                .subscribe_spikes(projection.uid(), projection.spike_sources());

            match self.populations.iter().find(|p| p.uid() == projection.postsynaptic_uid()) {
                Some(population) => {
                    if let Err(e) = projection.check_targets(population.len()) {
                        log::warn!("{}: projection {}: {}", self.name, projection.uid(), e);
                    }
                }
                None => log::warn!(
                    "{}: projection {} targets unknown population {}",
                    self.name,
                    projection.uid(),
                    projection.postsynaptic_uid()
                ),
            }
        }

        for population in &self.populations {
            let senders: Vec<Uid> = self
                .projections
                .iter()
                .map(|slot| &slot.projection)
                .filter(|projection| projection.postsynaptic_uid() == population.uid())
                .map(AnyProjection::uid)
                .collect();
            self.endpoint.subscribe_impacts(population.uid(), senders);
        }

        self.ranks = self
            .projections()
            .map(AnyProjection::uid)
            .chain(self.populations.iter().map(AnyPopulation::uid))
            .enumerate()
            .map(|(rank, uid)| (uid, rank))
            .collect();

        self.initialized = true;
        log::info!(
            "{}: network sealed with {} populations and {} projections",
            self.name,
            self.populations.len(),
            self.projections.len()
        );
    }

    fn route(&self) -> usize {
        match self.routing {
            Routing::Insertion => self.bus.route_messages(),
            Routing::SenderRank => self
                .bus
                .route_messages_by(|message| self.ranks.get(&message.sender_uid()).copied().unwrap_or(usize::MAX)),
        }
    }

    /// Route pending messages and drain them into subscriptions
    pub(crate) fn dispatch(&mut self) -> usize {
        self.route();
        self.endpoint.receive_all_messages()
    }

    /// Initialize on first use, then dispatch inputs for this step
    pub(crate) fn begin_step(&mut self) {
        if !self.initialized {
            self.initialize();
        }
        let received = self.dispatch();
        log::debug!("{}: step {} dispatched {} messages", self.name, self.step, received);
    }

    /// Presynaptic input of every projection, in storage order
    pub(crate) fn unload_projection_inputs(&mut self) -> Vec<Vec<SpikeMessage>> {
        self.projections
            .iter()
            .map(|slot| self.endpoint.unload_messages::<SpikeMessage>(slot.projection.uid()))
            .collect()
    }

    /// Impact input of every population, in storage order
    pub(crate) fn unload_population_inputs(&mut self) -> Vec<Vec<SynapticImpactMessage>> {
        self.populations
            .iter()
            .map(|population| {
                self.endpoint
                    .unload_messages::<SynapticImpactMessage>(population.uid())
            })
            .collect()
    }

    /// Publish this step's spikes and move to the next step
    pub(crate) fn advance(&mut self) {
        self.route();
        self.step += 1;
    }
}

/// Process one projection's presynaptic input and emit at most one message
///
/// Returns true if an impact message was sent.
pub(crate) fn calculate_projection(
    slot: &mut ProjectionSlot,
    messages: &[SpikeMessage],
    endpoint: &MessageEndpoint,
    step: Step,
) -> bool {
    let projection = &mut slot.projection;
    let uid = projection.uid();
    let presynaptic_uid = projection.presynaptic_uid();
    let postsynaptic_uid = projection.postsynaptic_uid();
    let is_forcing = projection.is_forcing();

    for message in messages {
        let sender = message.header.sender_uid;
        if sender == presynaptic_uid {
            for scheduled in projection.process_presynaptic(message, step) {
                slot.queue
                    .entry(scheduled.delivery_step)
                    .or_insert_with(|| SynapticImpactMessage {
                        header: MessageHeader::new(uid, scheduled.delivery_step),
                        presynaptic_population_uid: presynaptic_uid,
                        postsynaptic_population_uid: postsynaptic_uid,
                        is_forcing,
                        impacts: Vec::new(),
                    })
                    .impacts
                    .push(scheduled.impact);
            }
        }
        if sender == postsynaptic_uid {
            projection.process_postsynaptic(message);
        }
    }

    match slot.queue.remove(&step) {
        Some(mut message) => {
            message.header = MessageHeader::new(uid, step);
            endpoint.send_message(message);
            true
        }
        None => false,
    }
}

/// Integrate one population's impacts, update it and emit its spikes
///
/// Returns the number of neurons that fired.
pub(crate) fn calculate_population(
    population: &mut AnyPopulation,
    messages: &[SynapticImpactMessage],
    endpoint: &MessageEndpoint,
    step: Step,
) -> usize {
    for message in messages {
        population.integrate(message);
    }
    let fired = population.update();
    let count = fired.len();
    if count > 0 {
        endpoint.send_message(SpikeMessage::new(MessageHeader::new(population.uid(), step), fired));
    }
    count
}
