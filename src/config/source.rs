//! Where configuration comes from at decision time.

use super::engine::EngineConfig;
use crate::core::error::{CapacityError, CapacityResult};

/// Supplies the configuration for a decision.
///
/// The engine calls [`ConfigSource::load`] at most once per decision and keeps
/// the result in the decision cache.
pub trait ConfigSource {
    /// Current configuration.
    ///
    /// # Errors
    /// The configuration could not be read or is invalid.
    fn load(&self) -> CapacityResult<EngineConfig>;
}

impl ConfigSource for EngineConfig {
    fn load(&self) -> CapacityResult<EngineConfig> {
        Ok(self.clone())
    }
}

/// Reads configuration from the environment on every decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> CapacityResult<EngineConfig> {
        EngineConfig::from_env().map_err(CapacityError::InvalidConfig)
    }
}
