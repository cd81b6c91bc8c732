//! Compute devices a backend runs on

use core::fmt;

use snnk_core::Uid;

/// Kind of compute device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// General-purpose processor
    Cpu,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("CPU"),
        }
    }
}

/// Descriptor of a device usable by a backend
pub trait Device: fmt::Debug + Send + Sync {
    /// Device kind
    fn device_type(&self) -> DeviceType;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Power consumption estimate (W), zero when unknown
    fn power(&self) -> f32;

    /// Device identifier
    fn uid(&self) -> Uid;
}

/// The host processor, possibly with several worker threads
#[derive(Debug, Clone, PartialEq)]
pub struct CpuDevice {
    uid: Uid,
    name: String,
    threads: usize,
}

impl CpuDevice {
    /// Describe the host processor used with `threads` workers
    pub fn new(uid: Uid, threads: usize) -> Self {
        Self {
            uid,
            name: format!("CPU ({} threads)", threads),
            threads,
        }
    }

    /// Worker threads used on this device
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Device for CpuDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn power(&self) -> f32 {
        0.0
    }

    fn uid(&self) -> Uid {
        self.uid
    }
}
