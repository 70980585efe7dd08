//! Reactive calculation graph for the impermanent loss calculator.
//!
//! This crate wires the domain math to the calculator's input fields:
//! - Entry valuation: sizes a balanced two-token position at historical prices
//! - Projection: rebalances the position at hypothesized future prices and
//!   compares it with holding, including accrued yield
//! - Calculation session: owns the inputs of one user, recomputes dependent
//!   outputs on every change and discards superseded price lookups
//! - Display formatting for the derived fields

/// Prelude module for convenient imports.
pub mod prelude;

/// Display formatting.
pub mod display;
/// Entry valuation stage.
pub mod entry;
/// Error types.
pub mod error;
/// Input change events.
pub mod event;
/// Projection stage.
pub mod projection;
/// Calculation session.
pub mod session;
/// Calculator input state.
pub mod state;

pub use error::{CalcError, ErrorKind};
pub use session::CalculationSession;
