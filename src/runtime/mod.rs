//! Caller-facing request/response surface and batch evaluation.

pub mod api;
pub mod batch;

pub use api::{evaluate_request, AdmissionDecision, AdmissionRequest};
pub use batch::evaluate_batch;
