use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a yield rate accrues over the holding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RateMode {
    /// Annual percentage rate: simple, linear in elapsed days.
    #[default]
    Apr,
    /// Annual percentage yield: compounded daily.
    Apy,
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apr => f.write_str("APR"),
            Self::Apy => f.write_str("APY"),
        }
    }
}

impl FromStr for RateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apr" => Ok(Self::Apr),
            "apy" => Ok(Self::Apy),
            other => Err(format!("unknown rate mode '{other}', expected APR or APY")),
        }
    }
}
