//! Point-in-time snapshots of the cooperative's data.

pub mod memory;

pub use memory::InMemorySnapshot;
