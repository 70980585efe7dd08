//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use il_calc_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::{Token, TokenId};

// Enums
pub use crate::enums::RateMode;

// Errors
pub use crate::error::DomainError;

// Math
pub use crate::math::constant_product::{balance_quantity, calculate_k, rebalance};

// Metrics
pub use crate::metrics::impermanent_loss::{calculate_il, il_ratio, value_of};
pub use crate::metrics::interest::{DAYS_PER_YEAR, calculate_interest};
pub use crate::metrics::{ImpermanentLoss, InterestAccrual};

// Value objects
pub use crate::value_objects::percentage::Percentage;
pub use crate::value_objects::price::Price;
