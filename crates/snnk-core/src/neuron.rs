//! Neuron models
//!
//! The supported set is closed: [`BlifatNeuron`] and [`LifNeuron`]. Each model
//! keeps its parameters and its runtime state in one record so that a
//! population is a plain `Vec` of records.

use core::fmt;

use crate::error::{require_positive, CoreError, Result};
use crate::messaging::{OutputType, SynapticImpact};

/// Per-neuron update capability
pub trait NeuronModel: Clone + fmt::Debug + Send + Sync + 'static {
    /// Model name reported by backends
    const NAME: &'static str;

    /// Accumulate one synaptic impact into this step's input
    fn integrate(&mut self, impact: &SynapticImpact);

    /// Make the neuron fire at the next `emit`
    fn force(&mut self);

    /// Advance one step using the accumulated input; returns true on a spike
    fn emit(&mut self) -> bool;

    /// Validate parameters
    fn validate(&self) -> Result<()>;
}

/// Binary leaky integrate-and-fire neuron with adaptive extras
///
/// The potential is multiplied by `potential_decay` every step before the new
/// input is added, so a decay of `0.0` makes the neuron memoryless.
#[derive(Debug, Clone, PartialEq)]
pub struct BlifatNeuron {
    /// Firing threshold
    pub activation_threshold: f32,
    /// Fraction of the potential kept from one step to the next
    pub potential_decay: f32,
    /// Potential after a spike
    pub potential_reset_value: f32,
    /// Lower bound of the potential
    pub min_potential: f32,
    /// Steps after a spike during which the neuron cannot fire
    pub absolute_refractory_period: u32,

    /// Membrane potential
    pub potential: f32,
    /// Input accumulated during the current step
    pub pending_input: f32,
    /// Dopamine received during the last completed step
    pub dopamine_value: f32,
    /// Steps since the last spike
    pub steps_since_firing: u32,
    /// Remaining steps during which firing is blocked
    pub blocked_steps: u32,
    pending_dopamine: f32,
    forced: bool,
}

impl Default for BlifatNeuron {
    fn default() -> Self {
        Self {
            activation_threshold: 1.0,
            potential_decay: 0.0,
            potential_reset_value: 0.0,
            min_potential: -1.0e9,
            absolute_refractory_period: 0,
            potential: 0.0,
            pending_input: 0.0,
            dopamine_value: 0.0,
            steps_since_firing: u32::MAX,
            blocked_steps: 0,
            pending_dopamine: 0.0,
            forced: false,
        }
    }
}

impl BlifatNeuron {
    /// Create a neuron with the given threshold and decay
    pub fn new(activation_threshold: f32, potential_decay: f32) -> Result<Self> {
        let neuron = Self {
            activation_threshold,
            potential_decay,
            ..Default::default()
        };
        neuron.validate()?;
        Ok(neuron)
    }

    /// Set the refractory period
    pub fn with_refractory_period(mut self, steps: u32) -> Self {
        self.absolute_refractory_period = steps;
        self
    }

    /// Set the reset potential
    pub fn with_reset_value(mut self, value: f32) -> Self {
        self.potential_reset_value = value;
        self
    }

    fn is_refractory(&self) -> bool {
        self.steps_since_firing <= self.absolute_refractory_period
    }
}

impl NeuronModel for BlifatNeuron {
    const NAME: &'static str = "BLIFATNeuron";

    fn integrate(&mut self, impact: &SynapticImpact) {
        match impact.synapse_type {
            OutputType::Excitatory => self.pending_input += impact.impact_value,
            OutputType::InhibitoryCurrent => self.pending_input -= impact.impact_value,
            OutputType::Dopamine => self.pending_dopamine += impact.impact_value,
            OutputType::Blocking => {
                let steps = impact.impact_value.max(0.0) as u32;
                self.blocked_steps = self.blocked_steps.max(steps);
            }
        }
    }

    fn force(&mut self) {
        self.forced = true;
    }

    fn emit(&mut self) -> bool {
        self.potential = (self.potential * self.potential_decay + self.pending_input).max(self.min_potential);
        self.pending_input = 0.0;
        self.steps_since_firing = self.steps_since_firing.saturating_add(1);

        let blocked = self.blocked_steps > 0;
        self.blocked_steps = self.blocked_steps.saturating_sub(1);

        let fired = self.forced
            || (!blocked && !self.is_refractory() && self.potential >= self.activation_threshold);
        self.forced = false;
        self.dopamine_value = std::mem::take(&mut self.pending_dopamine);

        if fired {
            self.potential = self.potential_reset_value;
            self.steps_since_firing = 0;
        }
        fired
    }

    fn validate(&self) -> Result<()> {
        if !self.activation_threshold.is_finite() {
            return Err(CoreError::invalid_parameter(
                "activation_threshold",
                self.activation_threshold.to_string(),
                "finite",
            ));
        }
        if !(0.0..=1.0).contains(&self.potential_decay) {
            return Err(CoreError::invalid_parameter(
                "potential_decay",
                self.potential_decay.to_string(),
                "in [0.0, 1.0]",
            ));
        }
        if !self.potential_reset_value.is_finite()
            || self.potential_reset_value >= self.activation_threshold
        {
            return Err(CoreError::invalid_parameter(
                "potential_reset_value",
                format!("{} (with activation_threshold={})", self.potential_reset_value, self.activation_threshold),
                "< activation_threshold",
            ));
        }
        Ok(())
    }
}

/// Leaky integrate-and-fire neuron, Euler-integrated once per step
#[derive(Debug, Clone, PartialEq)]
pub struct LifNeuron {
    /// Membrane time constant (steps)
    pub tau_m: f32,
    /// Resting potential (mV)
    pub v_rest: f32,
    /// Reset potential (mV)
    pub v_reset: f32,
    /// Threshold potential (mV)
    pub v_thresh: f32,
    /// Refractory period (steps)
    pub t_refrac: u32,
    /// Membrane resistance (MΩ)
    pub r_m: f32,

    /// Membrane potential (mV)
    pub v_m: f32,
    /// Input current accumulator (nA)
    pub i_input: f32,
    /// Remaining refractory steps
    pub refractory_remaining: u32,
    forced: bool,
}

impl Default for LifNeuron {
    fn default() -> Self {
        Self {
            tau_m: 20.0,
            v_rest: -70.0,
            v_reset: -70.0,
            v_thresh: -50.0,
            t_refrac: 2,
            r_m: 10.0,
            v_m: -70.0,
            i_input: 0.0,
            refractory_remaining: 0,
            forced: false,
        }
    }
}

impl LifNeuron {
    /// Create a new LIF neuron with validation
    pub fn new(tau_m: f32, v_rest: f32, v_reset: f32, v_thresh: f32, t_refrac: u32, r_m: f32) -> Result<Self> {
        let neuron = Self {
            tau_m,
            v_rest,
            v_reset,
            v_thresh,
            t_refrac,
            r_m,
            v_m: v_rest,
            ..Default::default()
        };
        neuron.validate()?;
        Ok(neuron)
    }

    /// Check if neuron is in refractory period
    pub fn is_refractory(&self) -> bool {
        self.refractory_remaining > 0
    }
}

impl NeuronModel for LifNeuron {
    const NAME: &'static str = "LIFNeuron";

    fn integrate(&mut self, impact: &SynapticImpact) {
        match impact.synapse_type {
            OutputType::Excitatory => self.i_input += impact.impact_value,
            OutputType::InhibitoryCurrent => self.i_input -= impact.impact_value,
            // No neuromodulation in this model
            OutputType::Dopamine | OutputType::Blocking => {}
        }
    }

    fn force(&mut self) {
        self.forced = true;
    }

    fn emit(&mut self) -> bool {
        let forced = std::mem::take(&mut self.forced);

        if self.is_refractory() && !forced {
            self.refractory_remaining -= 1;
            self.i_input = 0.0;
            return false;
        }

        // dV/dt = (v_rest - v_m + R*I) / tau_m, dt = 1 step
        let dv = (self.v_rest - self.v_m + self.r_m * self.i_input) / self.tau_m;
        self.v_m += dv;
        self.i_input = 0.0;

        if forced || self.v_m >= self.v_thresh {
            self.v_m = self.v_reset;
            self.refractory_remaining = self.t_refrac;
            true
        } else {
            false
        }
    }

    fn validate(&self) -> Result<()> {
        require_positive("tau_m", self.tau_m)?;
        if !self.v_rest.is_finite() || !self.v_thresh.is_finite() || self.v_thresh <= self.v_rest {
            return Err(CoreError::invalid_parameter(
                "v_thresh",
                format!("{} (with v_rest={})", self.v_thresh, self.v_rest),
                "> v_rest",
            ));
        }
        require_positive("r_m", self.r_m)
    }
}
