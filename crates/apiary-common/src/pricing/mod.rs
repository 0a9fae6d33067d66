//! Seller-ask pricing engine.
//!
//! A seller names the net amount they must receive per sale; the engine
//! stacks the affiliate commission, the payment-processor fee, and the
//! platform fee on top of it and produces the customer-facing listing price.
//! Every function here is pure and synchronous: the same inputs always yield
//! the same cents, which is what lets a form preview and the server-side
//! write agree without coordination.

pub mod commission;
pub mod quote;
pub mod reconcile;
pub mod schedule;

pub use commission::{
    recommended_rates, CommissionKind, CommissionSpec, RateTiers, DEFAULT_COMMISSION_RATE_PERCENT,
};
pub use quote::{quote, PricingBreakdown};
pub use reconcile::{
    reconcile, BreakdownSource, QuoteInputs, ReconciledBreakdown, StoredBreakdown,
};
pub use schedule::FeeSchedule;
