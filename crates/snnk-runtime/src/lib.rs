//! Step backends for the snnk spiking network execution kernel
//!
//! A backend owns a loaded network and advances it one discrete step at a
//! time. The sequential backend is the reference; the parallel backend runs
//! the same step on a rayon worker pool and produces identical output.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod config;
pub mod device;
pub mod backend;
mod engine;
pub mod sequential;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod registry;

// Re-export essential types
pub use error::{BackendError, Result};
pub use config::ParallelConfig;
pub use device::{CpuDevice, Device, DeviceType};
pub use backend::{Backend, SharedBackend};
pub use sequential::{SequentialBackend, SEQUENTIAL_BACKEND_NAME};
#[cfg(feature = "parallel")]
pub use parallel::{ParallelBackend, PARALLEL_BACKEND_NAME};
pub use registry::{BackendFactory, BackendRegistry};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;
