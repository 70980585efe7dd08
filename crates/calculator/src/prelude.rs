//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use il_calc_calculator::prelude::*;
//! ```

// Display
pub use crate::display::{
    EntryDisplay, ProjectionDisplay, format_percent, format_price, format_quantity, format_usd,
};

// Entry stage
pub use crate::entry::{EntryInputs, EntryValuation, compute_entry_valuation, size_position};

// Errors
pub use crate::error::{CalcError, ErrorKind};

// Events
pub use crate::event::{InputEvent, Recompute};

// Projection stage
pub use crate::projection::{
    ProjectionInputs, ProjectionValuation, compute_projection, elapsed_days,
};

// Session
pub use crate::session::{
    CalculationSession, Completion, EntryOutcome, EntryRequest, SessionSnapshot,
};

// State
pub use crate::state::{EntryState, ProjectionState};
