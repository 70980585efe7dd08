//! Domain model for the impermanent loss calculator.
//!
//! This crate holds the pure pieces of the calculation:
//! - Tokens and the value objects exchanged with the price index
//! - Constant-product rebalancing math
//! - Impermanent loss and interest accrual metrics

/// Prelude module for convenient imports.
pub mod prelude;

/// Token entities.
pub mod entities;
/// Enumerations shared across crates.
pub mod enums;
/// Domain error types.
pub mod error;
/// Pool math.
pub mod math;
/// Valuation metrics.
pub mod metrics;
/// Value objects.
pub mod value_objects;

pub use error::DomainError;
