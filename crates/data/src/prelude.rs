//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use il_calc_data::prelude::*;
//! ```

pub use crate::catalog::TokenCatalog;
pub use crate::config::CoinGeckoConfig;
pub use crate::errors::ResolverError;
pub use crate::providers::{CoinGeckoProvider, PriceResolver, StaticFailure, StaticPriceProvider};
