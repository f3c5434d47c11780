use crate::communication::{ApiError, DataResponse};
use crate::core::AppState;
use crate::pricing::{price_order, utils::round_cents, CustomerTier, LineItem, PricedOrder};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

const CALCULATION_FAILED: &str = "PRICING_CALCULATION_FAILED";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricingRequest {
    /// Each item carries `price` and `quantity`
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    /// B2B customers identified by a company get the company discount
    #[serde(default)]
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<Value>,
    pub price: f64,
    pub quantity: u64,
    pub item_total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricingBreakdown {
    pub base_total: f64,
    pub total_quantity: u64,
    pub bulk_discount_percent: u32,
    pub bulk_discount: f64,
    pub company_discount_percent: f64,
    pub company_discount: f64,
    /// subtotal after all discounts
    pub subtotal: f64,
    pub tax: f64,
    pub tax_rate: f64,
    pub shipping: f64,
    pub total: f64,
    pub items_with_pricing: Vec<OrderPricedItem>,
    pub savings: f64,
    pub currency: String,
    pub calculated_at: DateTime<Utc>,
}

pub fn assemble_breakdown(order: &PricedOrder, calculated_at: DateTime<Utc>) -> OrderPricingBreakdown {
    let adjustments = &order.adjustments;
    let charges = &order.charges;

    OrderPricingBreakdown {
        base_total: round_cents(adjustments.subtotal),
        total_quantity: adjustments.total_quantity,
        bulk_discount_percent: adjustments.bulk_discount_percentage,
        bulk_discount: round_cents(adjustments.bulk_discount),
        company_discount_percent: adjustments.company_discount_percentage,
        company_discount: round_cents(adjustments.company_discount),
        subtotal: round_cents(adjustments.subtotal_after_discount),
        tax: round_cents(charges.tax_amount),
        tax_rate: charges.tax_rate,
        shipping: round_cents(charges.shipping_cost),
        total: round_cents(charges.final_total),
        items_with_pricing: order
            .items
            .iter()
            .map(|item| OrderPricedItem {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                price: item.base_unit_price,
                quantity: item.quantity,
                item_total: round_cents(item.total_price),
            })
            .collect(),
        savings: round_cents(adjustments.bulk_discount + adjustments.company_discount),
        currency: order.currency.clone(),
        calculated_at,
    }
}

pub async fn calculate_order_pricing(
    State(state): State<AppState>,
    payload: Result<Json<OrderPricingRequest>, JsonRejection>,
) -> Result<Json<DataResponse<OrderPricingBreakdown>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(CALCULATION_FAILED, &e))?;

    let items = request.items.unwrap_or_default();
    let company = request
        .company_id
        .as_deref()
        .filter(|id| !id.trim().is_empty());
    info!(
        company_id = company.unwrap_or("none"),
        items = items.len(),
        "Calculating order pricing"
    );

    let order = price_order(
        &state.order_profile,
        &items,
        CustomerTier::Standard,
        company.is_some(),
    )
    .map_err(|e| ApiError::from_pricing(CALCULATION_FAILED, &e))?;

    Ok(DataResponse::new(assemble_breakdown(&order, Utc::now())))
}
