//! Storage adapters implementing the collaborator traits.

pub mod snapshot;

pub use snapshot::InMemorySnapshot;
