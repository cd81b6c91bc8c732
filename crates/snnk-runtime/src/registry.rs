//! Backend selection by name

use std::collections::BTreeMap;

use crate::backend::SharedBackend;
use crate::error::{BackendError, Result};
use crate::sequential::{SequentialBackend, SEQUENTIAL_BACKEND_NAME};

/// Factory producing a fresh backend instance
pub type BackendFactory = Box<dyn Fn() -> Result<SharedBackend> + Send + Sync>;

/// Name-to-factory table used to pick a backend at runtime
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Create a registry holding the backends built into this crate
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SEQUENTIAL_BACKEND_NAME, || Ok(SequentialBackend::create()));
        #[cfg(feature = "parallel")]
        registry.register(
            crate::parallel::PARALLEL_BACKEND_NAME,
            crate::parallel::ParallelBackend::create,
        );
        registry
    }

    /// Register a factory, replacing any factory of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<SharedBackend> + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("registering backend {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Registered backend names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Check if a backend name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the backend registered as `name`
    pub fn load(&self, name: &str) -> Result<SharedBackend> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| BackendError::load(name, "no backend registered under this name"))?;
        let backend = factory().map_err(|e| BackendError::load(name, e.to_string()))?;
        log::info!("loaded backend {}", name);
        Ok(backend)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
