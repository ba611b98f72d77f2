//! Error types for capacity decisions.

use chrono::NaiveDate;
use thiserror::Error;

use crate::util::ids::ProductId;

/// Errors that abort a capacity decision.
///
/// A missing basket-size equivalence, a missing capacity record or a missing
/// growing period are not errors: they resolve to zero usage, zero capacity and
/// "no renewal projection" respectively.
#[derive(Debug, Error)]
pub enum CapacityError {
    /// A product has no price record effective at the date, so its size is unknown.
    #[error("no size defined for product {product} as of {date}")]
    MissingProductSize {
        /// Product without an effective price.
        product: ProductId,
        /// Date the size was resolved for.
        date: NaiveDate,
    },
    /// A product referenced by an order, subscription or wish does not exist.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
    /// Usage of a product no longer fits a decimal; its size or quantity is absurd.
    #[error("capacity arithmetic overflowed for product {0}")]
    Overflow(ProductId),
    /// Engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A collaborator failed to answer a read query.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result of engine operations.
pub type CapacityResult<T> = Result<T, CapacityError>;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
