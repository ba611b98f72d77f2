//! Organisation-wide configuration consumed by the engine.

pub mod engine;
pub mod source;

pub use engine::{CapacityPolicy, EngineConfig};
pub use source::{ConfigSource, EnvConfigSource};
