//! Synapse models
//!
//! The supported set is closed: [`DeltaSynapse`] and [`StdpSynapse`].

use core::fmt;

use crate::error::{require_positive, CoreError, Result};
use crate::messaging::{OutputType, Step};

/// Per-synapse impact capability
pub trait SynapseModel: Clone + fmt::Debug + Send + Sync + 'static {
    /// Model name reported by backends
    const NAME: &'static str;

    /// Whether the model changes its own state from spike timing
    const PLASTIC: bool = false;

    /// Steps between a presynaptic spike and the delivery of its impact
    fn delay(&self) -> u32;

    /// How the impact is applied by the postsynaptic neuron
    fn output_type(&self) -> OutputType;

    /// Impact value for a presynaptic spike sent at `spike_step`
    fn compute_impact(&mut self, spike_step: Step) -> f32;

    /// Notify the synapse that its postsynaptic neuron spiked
    fn on_postsynaptic_spike(&mut self, _spike_step: Step) {}

    /// Forcing flag of outgoing messages, given the projection's own flag
    fn forcing_policy(projection_forcing: bool) -> bool {
        projection_forcing
    }

    /// Validate parameters
    fn validate(&self) -> Result<()>;
}

/// Fixed-weight synapse with a transmission delay
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSynapse {
    /// Synaptic weight
    pub weight: f32,
    /// Transmission delay (steps)
    pub delay: u32,
    /// Output type
    pub output_type: OutputType,
}

impl Default for DeltaSynapse {
    fn default() -> Self {
        Self {
            weight: 0.0,
            delay: 1,
            output_type: OutputType::Excitatory,
        }
    }
}

impl DeltaSynapse {
    /// Create an excitatory synapse
    pub fn new(weight: f32, delay: u32) -> Self {
        Self {
            weight,
            delay,
            output_type: OutputType::Excitatory,
        }
    }

    /// Set the output type
    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }
}

impl SynapseModel for DeltaSynapse {
    const NAME: &'static str = "DeltaSynapse";

    fn delay(&self) -> u32 {
        self.delay
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }

    fn compute_impact(&mut self, _spike_step: Step) -> f32 {
        self.weight
    }

    fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() {
            return Err(CoreError::invalid_parameter("weight", self.weight.to_string(), "finite"));
        }
        Ok(())
    }
}

/// Delta synapse with nearest-spike additive STDP
///
/// A presynaptic spike following a postsynaptic one depresses the weight, a
/// postsynaptic spike following a presynaptic one potentiates it, both with an
/// exponential dependence on the step distance. The weight stays in
/// `[w_min, w_max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StdpSynapse {
    /// Synaptic weight
    pub weight: f32,
    /// Transmission delay (steps)
    pub delay: u32,
    /// Output type
    pub output_type: OutputType,
    /// Learning rate for potentiation (weight increase)
    pub a_plus: f32,
    /// Learning rate for depression (weight decrease)
    pub a_minus: f32,
    /// Time constant for potentiation (steps)
    pub tau_plus: f32,
    /// Time constant for depression (steps)
    pub tau_minus: f32,
    /// Minimum weight value
    pub w_min: f32,
    /// Maximum weight value
    pub w_max: f32,

    /// Step of the last presynaptic spike
    pub last_presynaptic_spike: Option<Step>,
    /// Step of the last postsynaptic spike
    pub last_postsynaptic_spike: Option<Step>,
}

impl Default for StdpSynapse {
    fn default() -> Self {
        Self {
            weight: 0.5,
            delay: 1,
            output_type: OutputType::Excitatory,
            a_plus: 0.01,
            a_minus: 0.012,
            tau_plus: 20.0,
            tau_minus: 20.0,
            w_min: 0.0,
            w_max: 1.0,
            last_presynaptic_spike: None,
            last_postsynaptic_spike: None,
        }
    }
}

impl StdpSynapse {
    /// Create an excitatory plastic synapse with default learning parameters
    pub fn new(weight: f32, delay: u32) -> Result<Self> {
        let synapse = Self {
            weight,
            delay,
            ..Default::default()
        };
        synapse.validate()?;
        Ok(synapse)
    }

    fn clamp(&mut self) {
        self.weight = self.weight.clamp(self.w_min, self.w_max);
    }
}

impl SynapseModel for StdpSynapse {
    const NAME: &'static str = "AdditiveSTDPDeltaSynapse";
    const PLASTIC: bool = true;

    fn delay(&self) -> u32 {
        self.delay
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }

    fn compute_impact(&mut self, spike_step: Step) -> f32 {
        if let Some(post) = self.last_postsynaptic_spike {
            if spike_step > post {
                let dt = (spike_step - post) as f32;
                self.weight -= self.a_minus * (-dt / self.tau_minus).exp();
                self.clamp();
            }
        }
        self.last_presynaptic_spike = Some(spike_step);
        self.weight
    }

    fn on_postsynaptic_spike(&mut self, spike_step: Step) {
        if let Some(pre) = self.last_presynaptic_spike {
            if spike_step >= pre {
                let dt = (spike_step - pre) as f32;
                self.weight += self.a_plus * (-dt / self.tau_plus).exp();
                self.clamp();
            }
        }
        self.last_postsynaptic_spike = Some(spike_step);
    }

    // Plastic projections never force: a forced spike would train on itself.
    fn forcing_policy(_projection_forcing: bool) -> bool {
        false
    }

    fn validate(&self) -> Result<()> {
        require_positive("a_plus", self.a_plus)?;
        require_positive("a_minus", self.a_minus)?;
        require_positive("tau_plus", self.tau_plus)?;
        require_positive("tau_minus", self.tau_minus)?;
        if !self.w_min.is_finite() || !self.w_max.is_finite() || self.w_max <= self.w_min {
            return Err(CoreError::invalid_parameter(
                "w_max",
                format!("{} (with w_min={})", self.w_max, self.w_min),
                "> w_min",
            ));
        }
        if !(self.w_min..=self.w_max).contains(&self.weight) {
            return Err(CoreError::invalid_parameter(
                "weight",
                self.weight.to_string(),
                format!("in [{}, {}]", self.w_min, self.w_max),
            ));
        }
        Ok(())
    }
}
