use crate::enums::RateMode;
use crate::error::DomainError;
use crate::metrics::InterestAccrual;
use crate::value_objects::percentage::Percentage;
use rust_decimal::{Decimal, MathematicalOps};

/// Day count used to annualize rates.
pub const DAYS_PER_YEAR: u32 = 365;

/// Calculates the interest accrued on `principal` over `days`.
///
/// APR: principal * rate * days / 365
/// APY: principal * ((1 + rate / 365) ^ days - 1), compounded daily
pub fn calculate_interest(
    principal: Decimal,
    rate: Percentage,
    mode: RateMode,
    days: u32,
) -> Result<InterestAccrual, DomainError> {
    if principal < Decimal::ZERO {
        return Err(DomainError::InvalidInput(format!(
            "principal cannot be negative: {principal}"
        )));
    }
    if rate.0 < Decimal::ZERO {
        return Err(DomainError::InvalidInput(format!(
            "yield rate cannot be negative: {}",
            rate.0
        )));
    }

    let year_days = Decimal::from(DAYS_PER_YEAR);
    let period_days = Decimal::from(days);

    let interest_usd = match mode {
        RateMode::Apr => principal
            .checked_mul(rate.as_fraction())
            .and_then(|v| v.checked_mul(period_days))
            .map(|v| v / year_days)
            .ok_or_else(|| DomainError::overflow("simple interest"))?,
        RateMode::Apy => {
            let daily_factor = Decimal::ONE + rate.as_fraction() / year_days;
            let growth = daily_factor
                .checked_powu(u64::from(days))
                .ok_or_else(|| DomainError::overflow("daily compounding"))?;
            principal
                .checked_mul(growth - Decimal::ONE)
                .ok_or_else(|| DomainError::overflow("compound interest"))?
        }
    };

    let interest_percent = if principal.is_zero() {
        Percentage::ZERO
    } else {
        let fraction = interest_usd
            .checked_div(principal)
            .ok_or_else(|| DomainError::overflow("interest ratio"))?;
        Percentage::from_fraction(fraction)?
    };

    Ok(InterestAccrual {
        interest_usd,
        interest_percent,
        days,
    })
}
