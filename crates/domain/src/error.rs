//! Errors raised by the pure calculation functions.

use thiserror::Error;

/// Errors that can occur in domain math.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An input is outside its valid range (negative quantity, negative rate, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A denominator was zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    /// The operation has no real result or overflowed the decimal range.
    #[error("Arithmetic domain error: {0}")]
    ArithmeticDomain(String),
}

impl DomainError {
    pub(crate) fn overflow(operation: &str) -> Self {
        Self::ArithmeticDomain(format!("overflow in {operation}"))
    }
}
