use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::pricing::commission::{CommissionKind, CommissionSpec};
use crate::pricing::schedule::FeeSchedule;

/// Full decomposition of a listing price.
///
/// Invariant: `seller + affiliate + stripe_fee + platform_fee ==
/// listing_price` to the cent, for every value this module constructs.
/// The trailing commission fields echo the seller's original input for
/// display; they never feed back into the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub seller_cents: i64,
    pub affiliate_cents: i64,
    pub stripe_fee_cents: i64,
    pub platform_fee_cents: i64,
    pub listing_price_cents: i64,
    pub commission_kind: CommissionKind,
    pub commission_rate: Option<f64>,
    pub flat_commission_cents: Option<i64>,
}

/// Price a seller ask by stacking commission, processor fee, and platform
/// fee onto running subtotals.
///
/// Each stage is rounded to whole cents before the next stage reads it, so a
/// form preview and a server-side write reproduce identical numbers. No
/// stage depends on the final price, which keeps the computation closed-form:
/// the seller nets exactly `seller_ask_cents` no matter how the schedule is
/// configured, and `processor_rate + platform_rate < 1` is not required.
pub fn quote(
    seller_ask_cents: i64,
    commission: &CommissionSpec,
    fees: &FeeSchedule,
) -> AppResult<PricingBreakdown> {
    if seller_ask_cents <= 0 {
        return Err(AppError::InvalidInput(format!(
            "seller ask must be positive, got {seller_ask_cents} cents"
        )));
    }
    fees.validate()?;

    let affiliate_cents = match *commission {
        CommissionSpec::Flat { amount_cents } => amount_cents,
        CommissionSpec::Percentage { rate_percent } => {
            round_cents(seller_ask_cents as f64 * (rate_percent / 100.0))?
        }
    };

    let stripe_base_cents = seller_ask_cents + affiliate_cents;
    let stripe_fee_cents = round_cents(
        stripe_base_cents as f64 * fees.processor_rate + fees.processor_fixed_cents as f64,
    )?;

    let subtotal_cents = seller_ask_cents + affiliate_cents + stripe_fee_cents;
    let platform_fee_cents = round_cents(subtotal_cents as f64 * fees.platform_rate)?;
    let listing_price_cents = subtotal_cents + platform_fee_cents;

    Ok(PricingBreakdown {
        seller_cents: seller_ask_cents,
        affiliate_cents,
        stripe_fee_cents,
        platform_fee_cents,
        listing_price_cents,
        commission_kind: commission.kind(),
        commission_rate: commission.rate_percent(),
        flat_commission_cents: commission.flat_cents(),
    })
}

/// Half-cent amounts round up. A non-finite value here can only come from a
/// malformed schedule, so it surfaces as a configuration error rather than
/// an input error.
pub(crate) fn round_cents(value: f64) -> AppResult<i64> {
    if !value.is_finite() {
        return Err(AppError::Config(format!(
            "non-finite amount in fee computation: {value}"
        )));
    }
    Ok((value + 0.5).floor() as i64)
}
