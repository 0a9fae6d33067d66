use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Commission applied when the caller supplies no rate at all (first-run UX).
/// Never used to repair an invalid rate.
pub const DEFAULT_COMMISSION_RATE_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionKind {
    Percentage,
    FlatRate,
}

/// A validated commission.
///
/// The percentage variant keeps the user-facing 0-100 rate; conversion to a
/// decimal multiplier happens only inside the fee stack, so the UI can always
/// redisplay the rate the seller typed without floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommissionSpec {
    Percentage { rate_percent: f64 },
    Flat { amount_cents: i64 },
}

impl CommissionSpec {
    pub fn resolve(
        kind: CommissionKind,
        rate_percent: Option<f64>,
        flat_cents: Option<i64>,
    ) -> AppResult<Self> {
        match kind {
            CommissionKind::Percentage => {
                let rate = match rate_percent {
                    None => DEFAULT_COMMISSION_RATE_PERCENT,
                    Some(rate) if !rate.is_finite() => {
                        return Err(AppError::InvalidInput(
                            "commission rate must be a finite number".to_string(),
                        ));
                    }
                    Some(rate) if !(0.0..=100.0).contains(&rate) => {
                        return Err(AppError::InvalidInput(format!(
                            "commission rate must be between 0 and 100, got {rate}"
                        )));
                    }
                    Some(rate) => rate,
                };
                Ok(Self::Percentage { rate_percent: rate })
            }
            CommissionKind::FlatRate => {
                let amount_cents = flat_cents.unwrap_or(0);
                if amount_cents < 0 {
                    return Err(AppError::InvalidInput(format!(
                        "flat commission must be non-negative, got {amount_cents} cents"
                    )));
                }
                Ok(Self::Flat { amount_cents })
            }
        }
    }

    pub fn kind(&self) -> CommissionKind {
        match self {
            Self::Percentage { .. } => CommissionKind::Percentage,
            Self::Flat { .. } => CommissionKind::FlatRate,
        }
    }

    pub fn rate_percent(&self) -> Option<f64> {
        match self {
            Self::Percentage { rate_percent } => Some(*rate_percent),
            Self::Flat { .. } => None,
        }
    }

    pub fn flat_cents(&self) -> Option<i64> {
        match self {
            Self::Percentage { .. } => None,
            Self::Flat { amount_cents } => Some(*amount_cents),
        }
    }
}

/// Suggested commission tiers for a given ask, by price bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTiers {
    pub low_percent: f64,
    pub medium_percent: f64,
    pub high_percent: f64,
}

pub fn recommended_rates(seller_ask_cents: i64) -> RateTiers {
    if seller_ask_cents < 5_000 {
        RateTiers {
            low_percent: 15.0,
            medium_percent: 25.0,
            high_percent: 40.0,
        }
    } else if seller_ask_cents < 20_000 {
        RateTiers {
            low_percent: 10.0,
            medium_percent: 20.0,
            high_percent: 35.0,
        }
    } else {
        RateTiers {
            low_percent: 5.0,
            medium_percent: 15.0,
            high_percent: 25.0,
        }
    }
}
