//! Backend configuration

use crate::error::{BackendError, Result};

/// Upper bound on worker threads
pub const MAX_THREADS: usize = 1024;

/// Worker pool settings of the parallel backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub threads: usize,
    /// Prefix of worker thread names
    pub thread_name: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            thread_name: "snnk-worker".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Create a configuration with a fixed number of threads
    pub fn new(threads: usize) -> Result<Self> {
        let config = Self {
            threads,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the number of worker threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the worker thread name prefix
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(BackendError::invalid_configuration("threads must be > 0"));
        }
        if self.threads > MAX_THREADS {
            return Err(BackendError::invalid_configuration(format!(
                "threads must be <= {} (got {})",
                MAX_THREADS, self.threads
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ParallelConfig::default();
        assert!(config.threads >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(ParallelConfig::new(0).is_err());
        assert!(ParallelConfig::new(MAX_THREADS + 1).is_err());
        assert_eq!(ParallelConfig::new(4).unwrap().threads, 4);
        assert!(ParallelConfig::default().with_threads(0).validate().is_err());
    }
}
