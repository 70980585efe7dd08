//! Price index access for the impermanent loss calculator.
//!
//! This crate provides the price resolver collaborator:
//! - The [`PriceResolver`] trait consumed by the calculation stages
//! - A CoinGecko HTTP provider
//! - An in-memory provider for tests and offline use
//! - A read-only token catalog loaded once at startup

/// Prelude module for convenient imports.
pub mod prelude;

/// Token catalog.
pub mod catalog;
/// Provider configuration.
pub mod config;
/// Error types.
pub mod errors;
/// Price resolver implementations.
pub mod providers;

pub use catalog::TokenCatalog;
pub use config::CoinGeckoConfig;
pub use errors::ResolverError;
pub use providers::PriceResolver;
