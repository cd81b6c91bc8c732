//! Synaptic impact messages

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codec::TokenReader;
use super::MessageHeader;
use crate::error::{CoreError, Result};
use crate::Uid;

/// Modulatory kind of a synaptic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputType {
    /// Raises the membrane potential
    #[default]
    Excitatory,
    /// Lowers the membrane potential
    InhibitoryCurrent,
    /// Neuromodulatory reward signal
    Dopamine,
    /// Suppresses firing for a number of steps
    Blocking,
}

impl OutputType {
    /// Stable numeric code used by the text form
    pub const fn code(self) -> u8 {
        match self {
            Self::Excitatory => 0,
            Self::InhibitoryCurrent => 1,
            Self::Dopamine => 2,
            Self::Blocking => 3,
        }
    }

    /// Decode a numeric code
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Excitatory),
            1 => Ok(Self::InhibitoryCurrent),
            2 => Ok(Self::Dopamine),
            3 => Ok(Self::Blocking),
            other => Err(CoreError::deserialization(format!("unknown output type {}", other))),
        }
    }
}

/// Contribution of one synapse to its postsynaptic neuron
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SynapticImpact {
    /// Index of the synapse inside its projection
    pub connection_index: u64,
    /// Value delivered to the postsynaptic neuron
    pub impact_value: f32,
    /// How the value is applied
    pub synapse_type: OutputType,
    /// Source neuron index in the presynaptic population
    pub presynaptic_neuron_index: u32,
    /// Target neuron index in the postsynaptic population
    pub postsynaptic_neuron_index: u32,
}

impl SynapticImpact {
    fn read(reader: &mut TokenReader<'_>) -> Result<Self> {
        Ok(Self {
            connection_index: reader.parse("connection index")?,
            impact_value: reader.parse("impact value")?,
            synapse_type: OutputType::from_code(reader.parse("synapse type")?)?,
            presynaptic_neuron_index: reader.parse("presynaptic neuron index")?,
            postsynaptic_neuron_index: reader.parse("postsynaptic neuron index")?,
        })
    }
}

impl fmt::Display for SynapticImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.connection_index,
            self.impact_value,
            self.synapse_type.code(),
            self.presynaptic_neuron_index,
            self.postsynaptic_neuron_index
        )
    }
}

/// Impacts emitted by one projection at one step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SynapticImpactMessage {
    /// Message header
    pub header: MessageHeader,
    /// Population the projection reads spikes from
    pub presynaptic_population_uid: Uid,
    /// Population the impacts are meant for
    pub postsynaptic_population_uid: Uid,
    /// Targeted neurons fire regardless of their state
    pub is_forcing: bool,
    /// Impacts, in application order
    pub impacts: Vec<SynapticImpact>,
}

impl SynapticImpactMessage {
    pub(crate) fn read(reader: &mut TokenReader<'_>) -> Result<Self> {
        let header = reader.header()?;
        let presynaptic_population_uid = reader.uid()?;
        let postsynaptic_population_uid = reader.uid()?;
        let is_forcing = match reader.parse::<u8>("forcing flag")? {
            0 => false,
            1 => true,
            other => {
                return Err(CoreError::deserialization(format!("bad forcing flag {}", other)))
            }
        };
        let count = reader.count("impact count")?;
        let mut impacts = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            impacts.push(SynapticImpact::read(reader)?);
        }
        Ok(Self {
            header,
            presynaptic_population_uid,
            postsynaptic_population_uid,
            is_forcing,
            impacts,
        })
    }
}

impl fmt::Display for SynapticImpactMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.header,
            self.presynaptic_population_uid,
            self.postsynaptic_population_uid,
            u8::from(self.is_forcing),
            self.impacts.len()
        )?;
        for impact in &self.impacts {
            write!(f, " {}", impact)?;
        }
        Ok(())
    }
}

impl FromStr for SynapticImpactMessage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut reader = TokenReader::new(s);
        let message = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}
