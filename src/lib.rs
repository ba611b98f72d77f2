//! # Coop Capacity
//!
//! Capacity admission control for a community-supported agriculture cooperative.
//!
//! Members hold recurring subscriptions to products and collect them at pickup
//! locations with finite capacity. Before a new or changed order is accepted,
//! the engine answers one question: would it overflow any capacity from its
//! start date until the last date at which usage can still change?
//!
//! ## Core Problem Solved
//!
//! - **Temporal projection**: usage counts subscriptions that will exist under
//!   auto-renewal, not only the ones in the store today
//! - **Two accounting policies**: continuous share units per product type, or
//!   discrete baskets per named basket size
//! - **Self-replacement**: a member changing their own order is not charged twice
//! - **Waiting list**: unconfirmed demand can hold capacity back
//! - **Global ceilings**: organisation-wide limits per product type and period
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coop_capacity::core::{CandidateOrder, CapacityEngine, DecisionCache, OrderContext};
//! use coop_capacity::config::EngineConfig;
//! use coop_capacity::infra::InMemorySnapshot;
//!
//! let snapshot = InMemorySnapshot::from_json_file("snapshot.json")?;
//! let engine = CapacityEngine::new(&snapshot, &snapshot, EngineConfig::default());
//!
//! let order = CandidateOrder::from([("veg-m".into(), 2)]);
//! let ctx = OrderContext::new(&order, start_date).for_member(Some(&member));
//! let mut cache = DecisionCache::new();
//! let fits = engine.check_pickup_location_capacity(&location, &ctx, &mut cache)?;
//! ```
//!
//! Every decision gets its own [`core::DecisionCache`]; nothing is shared or
//! invalidated between decisions.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Capacity accounting: records, projection, scanning and checkers.
pub mod core;
/// Engine configuration and where it is loaded from.
pub mod config;
/// Builders to construct engines from configuration.
pub mod builders;
/// Storage adapters implementing the collaborator traits.
pub mod infra;
/// Request/response surface and batch evaluation.
pub mod runtime;
/// Shared utilities.
pub mod util;
