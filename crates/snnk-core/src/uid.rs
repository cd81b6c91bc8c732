//! Entity identifiers and generator strategies

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Unique identifier of a network entity (population, projection, channel)
///
/// UIDs double as bus addresses: a message is routed by the UID of its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Uid(Uuid);

impl Uid {
    /// The "no entity" identifier
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Create a UID from its raw 128-bit value
    pub const fn from_u128(raw: u128) -> Self {
        Self(Uuid::from_u128(raw))
    }

    /// Wrap an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random UID
    pub fn new_random() -> Self {
        RandomUidGenerator.generate()
    }

    /// Get the raw 128-bit value
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Check if this is the nil identifier
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Uid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::deserialization(format!("bad uid '{}': {}", s, e)))
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.to_string()
    }
}

/// Strategy for producing fresh identifiers
pub trait UidGenerator: Send + Sync {
    /// Produce the next identifier
    fn generate(&self) -> Uid;
}

/// Counter-based generator: deterministic, for tests and reproducible runs
#[derive(Debug)]
pub struct SequentialUidGenerator {
    next: AtomicU64,
}

impl SequentialUidGenerator {
    /// Create a generator whose first UID has the raw value 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a generator starting at `initial_value`
    pub fn starting_at(initial_value: u64) -> Self {
        Self {
            next: AtomicU64::new(initial_value),
        }
    }

    /// Reset the counter
    pub fn reset(&self, initial_value: u64) {
        self.next.store(initial_value, Ordering::SeqCst);
    }
}

impl Default for SequentialUidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UidGenerator for SequentialUidGenerator {
    fn generate(&self) -> Uid {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        Uid::from_u128(value as u128)
    }
}

/// Random (version 4) UUID generator
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUidGenerator;

impl UidGenerator for RandomUidGenerator {
    fn generate(&self) -> Uid {
        let bytes: [u8; 16] = rand::random();
        Uid(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_generator() {
        let gen = SequentialUidGenerator::new();
        let a = gen.generate();
        let b = gen.generate();
        assert_eq!(a.as_u128(), 1);
        assert_eq!(b.as_u128(), 2);
        assert!(a < b);

        gen.reset(10);
        assert_eq!(gen.generate().as_u128(), 10);
    }

    #[test]
    fn test_random_generator_unique() {
        let gen = RandomUidGenerator;
        let a = gen.generate();
        let b = gen.generate();
        assert_ne!(a, b);
        assert!(!a.is_nil());
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_string_roundtrip() {
        let uid = Uid::from_u128(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        let text = uid.to_string();
        assert_eq!(text, "01234567-89ab-cdef-0011-223344556677");
        assert_eq!(text.parse::<Uid>().unwrap(), uid);
    }

    #[test]
    fn test_bad_string() {
        let err = "not-a-uid".parse::<Uid>().unwrap_err();
        assert!(matches!(err, CoreError::Deserialization { .. }));
    }

    #[test]
    fn test_nil() {
        assert!(Uid::nil().is_nil());
        assert_eq!(Uid::default(), Uid::nil());
    }
}
