use crate::value_objects::percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod impermanent_loss;
pub mod interest;

/// Shortfall of a rebalanced position against holding.
/// Positive values are a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImpermanentLoss {
    pub absolute_loss_usd: Decimal,
    pub percentage_loss: Percentage,
}

/// Yield accrued on a position over a holding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterestAccrual {
    pub interest_usd: Decimal,
    pub interest_percent: Percentage,
    pub days: u32,
}
