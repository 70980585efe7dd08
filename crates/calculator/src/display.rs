//! Display formatting.
//!
//! Valuations keep full precision; rounding to two decimal places happens
//! here and nowhere else.

use il_calc_domain::value_objects::{Percentage, Price};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::entry::EntryValuation;
use crate::projection::ProjectionValuation;

const USD_DECIMALS: u32 = 2;
const QUANTITY_DECIMALS: u32 = 6;

/// Formats a USD amount as `$1,234.57` (or `-$1,234.57`).
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(USD_DECIMALS);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    format!("{sign}${}", group_thousands(&digits))
}

/// Formats a unit price.
#[must_use]
pub fn format_price(price: Price) -> String {
    format_usd(price.value)
}

/// Formats a token quantity with up to six decimals and no trailing zeros.
#[must_use]
pub fn format_quantity(quantity: Decimal) -> String {
    let rounded = quantity.round_dp(QUANTITY_DECIMALS).normalize();
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = rounded.abs().to_string();
    format!("{sign}{}", group_thousands(&digits))
}

/// Formats percentage points as `2.02%`.
#[must_use]
pub fn format_percent(percent: Percentage) -> String {
    format!("{:.2}%", percent.0.round_dp(USD_DECIMALS))
}

/// Inserts `,` between groups of three integer digits.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Entry valuation rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDisplay {
    pub start_date: String,
    pub price_a: String,
    pub price_b: String,
    pub qty_a: String,
    pub qty_b: String,
    pub total_value: String,
}

impl From<&EntryValuation> for EntryDisplay {
    fn from(entry: &EntryValuation) -> Self {
        Self {
            start_date: entry.start_date.to_string(),
            price_a: format_price(entry.price_a),
            price_b: format_price(entry.price_b),
            qty_a: format_quantity(entry.qty_a),
            qty_b: format_quantity(entry.qty_b),
            total_value: format_usd(entry.total_value_usd),
        }
    }
}

/// Projection rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionDisplay {
    pub days: String,
    pub qty_a_future: String,
    pub qty_b_future: String,
    pub value_before_interest: String,
    pub value_a_held: String,
    pub value_b_held: String,
    pub value_if_held: String,
    pub il_percent: String,
    pub il_dollar: String,
    pub interest_percent: String,
    pub interest_dollar: String,
    pub value_with_interest: String,
    pub diff_vs_holding: String,
}

impl From<&ProjectionValuation> for ProjectionDisplay {
    fn from(projection: &ProjectionValuation) -> Self {
        Self {
            days: projection.days.to_string(),
            qty_a_future: format_quantity(projection.qty_a_future),
            qty_b_future: format_quantity(projection.qty_b_future),
            value_before_interest: format_usd(projection.value_before_interest),
            value_a_held: format_usd(projection.value_a_held),
            value_b_held: format_usd(projection.value_b_held),
            value_if_held: format_usd(projection.value_if_held),
            il_percent: format_percent(projection.il_percent),
            il_dollar: format_usd(projection.il_dollar),
            interest_percent: format_percent(projection.interest_percent),
            interest_dollar: format_usd(projection.interest_dollar),
            value_with_interest: format_usd(projection.value_with_interest),
            diff_vs_holding: format_usd(projection.diff_vs_holding),
        }
    }
}
