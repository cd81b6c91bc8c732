//! Backend capability set

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use snnk_core::{AnyPopulation, AnyProjection, MessageBus, MessageEndpoint, Step, Uid};

use crate::device::Device;
use crate::error::Result;

/// Shared handle to a loaded backend
pub type SharedBackend = Arc<Mutex<dyn Backend>>;

/// A backend owns a network and advances it one step at a time
///
/// Populations and projections are bulk-loaded before the first step.
/// External actors talk to the network only through endpoints created on
/// [`Backend::message_bus`].
pub trait Backend: fmt::Debug + Send {
    /// Backend name, as registered in the backend registry
    fn name(&self) -> &'static str;

    /// Whether plastic synapse models can be loaded
    fn plasticity_supported(&self) -> bool;

    /// Names of the neuron models this backend accepts
    fn supported_neurons(&self) -> &'static [&'static str];

    /// Names of the synapse models this backend accepts
    fn supported_synapses(&self) -> &'static [&'static str];

    /// Append populations to the network
    fn load_populations(&mut self, populations: Vec<AnyPopulation>) -> Result<()>;

    /// Append projections to the network
    fn load_projections(&mut self, projections: Vec<AnyProjection>) -> Result<()>;

    /// Remove populations by UID
    ///
    /// Currently a no-op: loaded entities stay for the lifetime of the
    /// backend. Unknown UIDs are ignored.
    fn remove_populations(&mut self, uids: &[Uid]);

    /// Remove projections by UID
    ///
    /// Currently a no-op, see [`Backend::remove_populations`].
    fn remove_projections(&mut self, uids: &[Uid]);

    /// Advance the network by one step
    fn step(&mut self);

    /// Number of completed steps
    fn step_count(&self) -> Step;

    /// Step while `predicate` holds for the current step count
    ///
    /// Returns the step count when the predicate first fails.
    fn run(&mut self, predicate: &mut dyn FnMut(Step) -> bool) -> Step {
        while predicate(self.step_count()) {
            self.step();
        }
        self.step_count()
    }

    /// Bus shared by the backend and external channel endpoints
    fn message_bus(&self) -> &Arc<MessageBus>;

    /// The backend's own endpoint
    fn message_endpoint_mut(&mut self) -> &mut MessageEndpoint;

    /// Loaded populations in storage order
    fn populations(&self) -> Box<dyn Iterator<Item = &AnyPopulation> + '_>;

    /// Loaded projections in storage order
    fn projections(&self) -> Box<dyn Iterator<Item = &AnyProjection> + '_>;

    /// Population with the given UID
    fn population(&self, uid: Uid) -> Option<&AnyPopulation> {
        self.populations().find(|p| p.uid() == uid)
    }

    /// Projection with the given UID
    fn projection(&self, uid: Uid) -> Option<&AnyProjection> {
        self.projections().find(|p| p.uid() == uid)
    }

    /// Devices this backend runs on
    fn devices(&self) -> Vec<Box<dyn Device>>;
}
