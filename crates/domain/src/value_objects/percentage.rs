use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A value in percentage points: `Percentage(dec!(12.5))` is 12.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(points: Decimal) -> Self {
        Self(points)
    }

    /// The value as a plain fraction (12.5% -> 0.125).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Converts a plain fraction to points (0.125 -> 12.5%).
    pub fn from_fraction(fraction: Decimal) -> Result<Self, DomainError> {
        fraction
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(Self)
            .ok_or_else(|| DomainError::overflow("percentage from fraction"))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}
