use crate::communication::{ApiError, DataResponse};
use crate::core::AppState;
use crate::pricing::{price_order, utils::format_amount, PricedOrder};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

mod status;
mod types;

pub use status::{status_patch, update_quotation_status};
pub use types::*;

const CALCULATION_FAILED: &str = "QUOTATION_CALCULATION_FAILED";

/// Renders a priced order as the quotation payload. Money is rounded only
/// here, at the edge, as fixed two decimal strings.
pub fn assemble_quotation(order: &PricedOrder, calculated_at: DateTime<Utc>) -> QuotationTotals {
    let items = order
        .items
        .iter()
        .map(|item| QuotedLineItem {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: format_amount(item.adjusted_unit_price),
            subtotal: format_amount(item.adjusted_subtotal),
            discount_percentage: item.discount_percentage,
            discount_amount: format_amount(item.discount_amount),
            total_price: format_amount(item.total_price),
            customizations: item.customizations.clone(),
            customization_premium: format_amount(item.customization_premium),
        })
        .collect();

    let adjustments = &order.adjustments;
    let charges = &order.charges;

    QuotationTotals {
        items,
        subtotal: format_amount(adjustments.subtotal),
        order_level_discount: format_amount(adjustments.order_level_discount),
        tier_discount: format_amount(adjustments.tier_discount),
        total_discount: format_amount(adjustments.total_discount),
        subtotal_after_discount: format_amount(adjustments.subtotal_after_discount),
        tax_rate: format_amount(charges.tax_rate),
        tax_amount: format_amount(charges.tax_amount),
        shipping_cost: format_amount(charges.shipping_cost),
        final_total: format_amount(charges.final_total),
        currency: order.currency.clone(),
        total_quantity: adjustments.total_quantity,
        customer_tier: order.customer_tier,
        calculated_at,
    }
}

pub async fn calculate_quotation(
    State(state): State<AppState>,
    payload: Result<Json<QuotationRequest>, JsonRejection>,
) -> Result<Json<DataResponse<QuotationTotals>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(CALCULATION_FAILED, &e))?;

    let items = request.items.unwrap_or_default();
    let customer_tier = request.customer_tier.unwrap_or_default();
    info!(
        customer_id = %request.customer_id.as_ref().unwrap_or(&serde_json::Value::from("anonymous")),
        customer_tier = ?customer_tier,
        items = items.len(),
        "Calculating quotation"
    );

    let order = price_order(&state.quotation_profile, &items, customer_tier, false)
        .map_err(|e| ApiError::from_pricing(CALCULATION_FAILED, &e))?;

    Ok(DataResponse::new(assemble_quotation(&order, Utc::now())))
}
