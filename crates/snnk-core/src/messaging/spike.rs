//! Spike messages

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codec::TokenReader;
use super::MessageHeader;
use crate::error::{CoreError, Result};

/// Index of a neuron within its population
pub type SpikeIndex = u32;

/// Indexes of neurons that spiked
pub type SpikeData = Vec<SpikeIndex>;

/// Spikes emitted by one sender at one step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpikeMessage {
    /// Message header
    pub header: MessageHeader,
    /// Indexes of the recently spiked neurons, ascending for population output
    pub neuron_indexes: SpikeData,
}

impl SpikeMessage {
    /// Create a new spike message
    pub fn new(header: MessageHeader, neuron_indexes: SpikeData) -> Self {
        Self {
            header,
            neuron_indexes,
        }
    }

    /// Number of spikes carried
    pub fn len(&self) -> usize {
        self.neuron_indexes.len()
    }

    /// Check if the message carries no spikes
    pub fn is_empty(&self) -> bool {
        self.neuron_indexes.is_empty()
    }

    pub(crate) fn read(reader: &mut TokenReader<'_>) -> Result<Self> {
        let header = reader.header()?;
        let count = reader.count("spike count")?;
        let mut neuron_indexes = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            neuron_indexes.push(reader.parse::<SpikeIndex>("neuron index")?);
        }
        Ok(Self {
            header,
            neuron_indexes,
        })
    }
}

impl fmt::Display for SpikeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.header, self.neuron_indexes.len())?;
        for index in &self.neuron_indexes {
            write!(f, " {}", index)?;
        }
        Ok(())
    }
}

impl FromStr for SpikeMessage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut reader = TokenReader::new(s);
        let message = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Uid;

    #[test]
    fn test_spike_text_roundtrip() {
        let message = SpikeMessage::new(MessageHeader::new(Uid::from_u128(9), 7), vec![1, 2, 3, 4, 5]);
        let text = message.to_string();
        let parsed: SpikeMessage = text.parse().unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_empty_spike_message() {
        let message = SpikeMessage::new(MessageHeader::new(Uid::from_u128(1), 0), vec![]);
        assert!(message.is_empty());
        let parsed: SpikeMessage = message.to_string().parse().unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_truncated_spike_message() {
        // Declares three indexes, carries two
        let text = format!("{} 7 3 1 2", Uid::from_u128(9));
        let err = text.parse::<SpikeMessage>().unwrap_err();
        assert!(matches!(err, CoreError::Deserialization { .. }));
    }
}
