use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::commission::{CommissionKind, RateTiers};
use crate::pricing::quote::PricingBreakdown;
use crate::pricing::reconcile::BreakdownSource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub ok: bool,
    pub boot_id: Option<String>,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingPreviewRequest {
    pub seller_ask_cents: i64,
    pub commission_type: CommissionKind,
    pub commission_rate: Option<f64>,
    pub flat_commission_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingPreviewResponse {
    pub breakdown: PricingBreakdown,
    pub recommended_rates: RateTiers,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub seller_ask_cents: i64,
    pub commission_type: CommissionKind,
    pub commission_rate: Option<f64>,
    pub flat_commission_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateProductResponse {
    pub product_id: Uuid,
    pub breakdown: PricingBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductEditResponse {
    pub product_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub breakdown: PricingBreakdown,
    pub breakdown_source: BreakdownSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}
