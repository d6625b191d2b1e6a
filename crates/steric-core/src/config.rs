// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Detector settings and the storage port they persist through.
//!
//! Lengths in [`DetectorConfig`] are exact decimals. They are stored as JSON
//! strings (`"1.001"`); plain JSON numbers are accepted on load and read
//! through their shortest decimal spelling, never floored.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use steric_geom::Fixed;
use thiserror::Error;

use crate::aggregate::DedupPolicy;
use crate::detect::Method;

/// Key under which [`DetectorConfig`] is stored.
pub const DETECTOR_CONFIG_KEY: &str = "detector";

/// Settings for one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Radius shared by every atom, in Ångström. The clash threshold is twice this.
    #[serde(with = "decimal")]
    pub atom_radius: Fixed,
    /// Detection strategy.
    pub method: Method,
    /// Deduplication policy for the final list.
    pub dedup: DedupPolicy,
    /// Padding added around the indexed set's bounds.
    #[serde(with = "decimal")]
    pub bounds_margin: Fixed,
    /// Also run brute force and fail when the results differ.
    pub verify: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            atom_radius: Fixed::from_int(2),
            method: Method::Grid,
            dedup: DedupPolicy::Full,
            bounds_margin: Fixed::from_raw(1_000_000),
            verify: false,
        }
    }
}

/// Serde adapter writing [`Fixed`] as a decimal string.
mod decimal {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use steric_geom::Fixed;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Literal {
        Text(String),
        Number(f64),
    }

    pub(super) fn serialize<S: Serializer>(value: &Fixed, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(value)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Fixed, D::Error> {
        let text = match Literal::deserialize(de)? {
            Literal::Text(text) => text,
            Literal::Number(n) => n.to_string(),
        };
        text.parse().map_err(de::Error::custom)
    }
}

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Serializes config values as JSON and delegates storage to a `ConfigStore`.
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Load and deserialize the value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist the value for `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Stored detector settings, or the defaults when none were saved.
    pub fn detector(&self) -> Result<DetectorConfig, ConfigError> {
        Ok(self.load(DETECTOR_CONFIG_KEY)?.unwrap_or_default())
    }

    /// Persists detector settings.
    pub fn save_detector(&self, config: &DetectorConfig) -> Result<(), ConfigError> {
        self.save(DETECTOR_CONFIG_KEY, config)
    }
}
