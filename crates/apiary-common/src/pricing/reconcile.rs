use serde::{Deserialize, Serialize};

use crate::pricing::commission::{CommissionKind, CommissionSpec};
use crate::pricing::quote::{quote, round_cents, PricingBreakdown};
use crate::pricing::schedule::FeeSchedule;

/// Flattened persisted form of a breakdown.
///
/// The storage layer is schema-tolerant and may have dropped any non-primary
/// column during a staged rollout, so every field is optional on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredBreakdown {
    pub seller_cents: Option<i64>,
    pub affiliate_cents: Option<i64>,
    pub stripe_fee_cents: Option<i64>,
    pub platform_fee_cents: Option<i64>,
    pub listing_price_cents: Option<i64>,
    pub commission_kind: Option<CommissionKind>,
    pub commission_rate: Option<f64>,
    pub flat_commission_cents: Option<i64>,
}

impl From<&PricingBreakdown> for StoredBreakdown {
    fn from(breakdown: &PricingBreakdown) -> Self {
        Self {
            seller_cents: Some(breakdown.seller_cents),
            affiliate_cents: Some(breakdown.affiliate_cents),
            stripe_fee_cents: Some(breakdown.stripe_fee_cents),
            platform_fee_cents: Some(breakdown.platform_fee_cents),
            listing_price_cents: Some(breakdown.listing_price_cents),
            commission_kind: Some(breakdown.commission_kind),
            commission_rate: breakdown.commission_rate,
            flat_commission_cents: breakdown.flat_commission_cents,
        }
    }
}

/// Where a reconciled breakdown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownSource {
    /// Persisted financial facts, trusted verbatim.
    Persisted,
    /// Nothing usable persisted; recomputed fresh from the fallback inputs.
    Recomputed,
    /// A primary field was lost; numbers are best-effort and the UI should
    /// present them as approximate.
    Approximate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReconciledBreakdown {
    pub breakdown: PricingBreakdown,
    pub source: BreakdownSource,
}

/// Inputs for recomputing a breakdown when the persisted one is unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteInputs {
    pub seller_ask_cents: i64,
    pub commission: CommissionSpec,
}

/// Rebuild a canonical breakdown from whatever the store still has.
///
/// Persisted seller and listing amounts are never recomputed: a product may
/// have been priced under an older fee schedule, and silently repricing it on
/// reload would change historical records. Only when the primaries are gone
/// does the engine compute anything anew.
pub fn reconcile(
    stored: &StoredBreakdown,
    fallback: Option<&QuoteInputs>,
    fees: &FeeSchedule,
) -> ReconciledBreakdown {
    if let (Some(seller), Some(listing)) = (stored.seller_cents, stored.listing_price_cents) {
        return from_trusted(seller, listing, stored, fees);
    }

    // The listing survived but the seller amount did not: derive the ask by
    // bisecting the forward computation, and flag the result as approximate
    // since a primary field was lost.
    if let Some(listing) = stored.listing_price_cents {
        if let Some(commission) = stored_commission(stored) {
            if let Some(ask) = derive_seller_ask_cents(listing, &commission, fees) {
                if let Ok(breakdown) = quote(ask, &commission, fees) {
                    return ReconciledBreakdown {
                        breakdown,
                        source: BreakdownSource::Approximate,
                    };
                }
            }
        }
    }

    if let Some(inputs) = fallback {
        if let Ok(breakdown) = quote(inputs.seller_ask_cents, &inputs.commission, fees) {
            return ReconciledBreakdown {
                breakdown,
                source: BreakdownSource::Recomputed,
            };
        }
    }

    best_effort(stored)
}

fn from_trusted(
    seller_cents: i64,
    listing_price_cents: i64,
    stored: &StoredBreakdown,
    fees: &FeeSchedule,
) -> ReconciledBreakdown {
    let commission_kind = stored.commission_kind.unwrap_or({
        if stored.flat_commission_cents.is_some() {
            CommissionKind::FlatRate
        } else {
            CommissionKind::Percentage
        }
    });

    let affiliate_cents = stored
        .affiliate_cents
        .unwrap_or_else(|| match commission_kind {
            CommissionKind::FlatRate => stored.flat_commission_cents.unwrap_or(0),
            CommissionKind::Percentage => stored
                .commission_rate
                .and_then(|rate| round_cents(seller_cents as f64 * (rate / 100.0)).ok())
                .unwrap_or(0),
        });

    // Whatever the lost fee columns held, their sum is pinned by the trusted
    // primaries: listing - seller - affiliate.
    let remainder = listing_price_cents - seller_cents - affiliate_cents;
    let (stripe_fee_cents, platform_fee_cents) =
        match (stored.stripe_fee_cents, stored.platform_fee_cents) {
            (Some(stripe), Some(platform)) => (stripe, platform),
            (Some(stripe), None) => (stripe, remainder - stripe),
            (None, Some(platform)) => (remainder - platform, platform),
            (None, None) => {
                // The processor fee is fully determined by seller + affiliate,
                // both trusted, so re-derive it and let the platform fee take
                // the residue. Additivity against the historical listing
                // price is preserved even if the schedule has since changed.
                let stripe = round_cents(
                    (seller_cents + affiliate_cents) as f64 * fees.processor_rate
                        + fees.processor_fixed_cents as f64,
                )
                .unwrap_or(0)
                .clamp(0, remainder.max(0));
                (stripe, remainder - stripe)
            }
        };

    ReconciledBreakdown {
        breakdown: PricingBreakdown {
            seller_cents,
            affiliate_cents,
            stripe_fee_cents,
            platform_fee_cents,
            listing_price_cents,
            commission_kind,
            commission_rate: stored.commission_rate,
            flat_commission_cents: stored.flat_commission_cents,
        },
        source: BreakdownSource::Persisted,
    }
}

fn stored_commission(stored: &StoredBreakdown) -> Option<CommissionSpec> {
    let kind = stored.commission_kind?;
    match kind {
        CommissionKind::Percentage => {
            let rate = stored.commission_rate?;
            CommissionSpec::resolve(kind, Some(rate), None).ok()
        }
        CommissionKind::FlatRate => {
            let amount = stored.flat_commission_cents.or(stored.affiliate_cents)?;
            CommissionSpec::resolve(kind, None, Some(amount)).ok()
        }
    }
}

/// Invert the forward computation for a known listing price.
///
/// Per-stage rounding makes the closed-form inverse inexact, so bisect over
/// the monotonic forward function instead: the result is the largest ask
/// whose listing price does not exceed the target.
fn derive_seller_ask_cents(
    listing_price_cents: i64,
    commission: &CommissionSpec,
    fees: &FeeSchedule,
) -> Option<i64> {
    if listing_price_cents <= 0 {
        return None;
    }

    let mut low = 1_i64;
    let mut high = listing_price_cents;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        match quote(mid, commission, fees) {
            Ok(candidate) if candidate.listing_price_cents <= listing_price_cents => low = mid,
            Ok(_) => high = mid - 1,
            Err(_) => return None,
        }
    }
    Some(low)
}

/// Soft reconciliation-gap outcome: neither primaries nor fallback inputs
/// are available. Never an error, so a page load can still render with the
/// degraded-data flag set.
fn best_effort(stored: &StoredBreakdown) -> ReconciledBreakdown {
    let seller_cents = stored.seller_cents.unwrap_or(0);
    let affiliate_cents = stored
        .affiliate_cents
        .or(stored.flat_commission_cents)
        .unwrap_or(0);
    let stripe_fee_cents = stored.stripe_fee_cents.unwrap_or(0);
    let (platform_fee_cents, listing_price_cents) = match stored.listing_price_cents {
        // A surviving listing price is kept; the platform residue absorbs
        // whatever the missing fields would have held.
        Some(listing) => (
            stored
                .platform_fee_cents
                .unwrap_or(listing - seller_cents - affiliate_cents - stripe_fee_cents),
            listing,
        ),
        None => {
            let platform = stored.platform_fee_cents.unwrap_or(0);
            (
                platform,
                seller_cents + affiliate_cents + stripe_fee_cents + platform,
            )
        }
    };

    ReconciledBreakdown {
        breakdown: PricingBreakdown {
            seller_cents,
            affiliate_cents,
            stripe_fee_cents,
            platform_fee_cents,
            listing_price_cents,
            commission_kind: stored.commission_kind.unwrap_or(CommissionKind::Percentage),
            commission_rate: stored.commission_rate,
            flat_commission_cents: stored.flat_commission_cents,
        },
        source: BreakdownSource::Approximate,
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, BreakdownSource, QuoteInputs, StoredBreakdown};
    use crate::pricing::commission::{CommissionKind, CommissionSpec};
    use crate::pricing::quote::quote;
    use crate::pricing::schedule::FeeSchedule;

    fn percent(rate_percent: f64) -> CommissionSpec {
        CommissionSpec::Percentage { rate_percent }
    }

    #[test]
    fn full_snapshot_round_trips_without_drift() {
        let fees = FeeSchedule::default();
        let breakdown = quote(10_000, &percent(20.0), &fees).expect("quote");
        let stored = StoredBreakdown::from(&breakdown);

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(reconciled.source, BreakdownSource::Persisted);
        assert_eq!(reconciled.breakdown, breakdown);
    }

    #[test]
    fn persisted_facts_survive_a_fee_schedule_change() {
        let old_fees = FeeSchedule::default();
        let breakdown = quote(10_000, &percent(20.0), &old_fees).expect("quote");
        let stored = StoredBreakdown::from(&breakdown);

        let new_fees = FeeSchedule {
            processor_rate: 0.05,
            processor_fixed_cents: 100,
            platform_rate: 0.25,
        };
        let reconciled = reconcile(&stored, None, &new_fees);

        assert_eq!(reconciled.source, BreakdownSource::Persisted);
        assert_eq!(reconciled.breakdown, breakdown);
    }

    #[test]
    fn lost_fee_columns_are_filled_from_the_remainder() {
        let fees = FeeSchedule::default();
        let breakdown = quote(10_000, &percent(20.0), &fees).expect("quote");

        let mut stored = StoredBreakdown::from(&breakdown);
        stored.stripe_fee_cents = None;
        stored.platform_fee_cents = None;

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(reconciled.source, BreakdownSource::Persisted);
        assert_eq!(reconciled.breakdown.stripe_fee_cents, breakdown.stripe_fee_cents);
        assert_eq!(
            reconciled.breakdown.platform_fee_cents,
            breakdown.platform_fee_cents
        );
        assert_eq!(
            reconciled.breakdown.listing_price_cents,
            breakdown.listing_price_cents
        );
    }

    #[test]
    fn one_surviving_fee_column_pins_the_other() {
        let fees = FeeSchedule::default();
        let breakdown = quote(20_000, &percent(25.0), &fees).expect("quote");

        let mut stored = StoredBreakdown::from(&breakdown);
        stored.platform_fee_cents = None;

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(
            reconciled.breakdown.platform_fee_cents,
            breakdown.platform_fee_cents
        );
    }

    #[test]
    fn missing_affiliate_is_rebuilt_from_the_stored_rate() {
        let fees = FeeSchedule::default();
        let breakdown = quote(10_000, &percent(20.0), &fees).expect("quote");

        let mut stored = StoredBreakdown::from(&breakdown);
        stored.affiliate_cents = None;

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(reconciled.breakdown.affiliate_cents, 2_000);
    }

    #[test]
    fn empty_row_recomputes_from_fallback() {
        let fees = FeeSchedule::default();
        let fallback = QuoteInputs {
            seller_ask_cents: 5_000,
            commission: CommissionSpec::Flat {
                amount_cents: 1_000,
            },
        };

        let reconciled = reconcile(&StoredBreakdown::default(), Some(&fallback), &fees);
        assert_eq!(reconciled.source, BreakdownSource::Recomputed);
        assert_eq!(reconciled.breakdown.listing_price_cents, 6_864);
    }

    #[test]
    fn lost_seller_amount_is_derived_from_the_listing_price() {
        let fees = FeeSchedule::default();
        let breakdown = quote(10_000, &percent(20.0), &fees).expect("quote");

        let stored = StoredBreakdown {
            listing_price_cents: Some(breakdown.listing_price_cents),
            commission_kind: Some(CommissionKind::Percentage),
            commission_rate: Some(20.0),
            ..StoredBreakdown::default()
        };

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(reconciled.source, BreakdownSource::Approximate);
        assert_eq!(reconciled.breakdown.seller_cents, 10_000);
        assert_eq!(
            reconciled.breakdown.listing_price_cents,
            breakdown.listing_price_cents
        );
    }

    #[test]
    fn nothing_usable_yields_a_degraded_breakdown_not_an_error() {
        let fees = FeeSchedule::default();
        let stored = StoredBreakdown {
            affiliate_cents: Some(1_000),
            ..StoredBreakdown::default()
        };

        let reconciled = reconcile(&stored, None, &fees);
        assert_eq!(reconciled.source, BreakdownSource::Approximate);
        assert_eq!(reconciled.breakdown.affiliate_cents, 1_000);
        assert_eq!(reconciled.breakdown.listing_price_cents, 1_000);
    }
}
