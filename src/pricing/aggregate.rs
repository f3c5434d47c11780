use super::line_item::bulk_discount_percentage;
use super::profile::{BulkDiscountScope, PricingProfile};
use super::types::{CustomerTier, OrderAdjustments, PricedLineItem};
use super::utils::round_cents;
use super::PricingError;

/// Folds priced line items into order level discounts.
///
/// With `round_item_totals` the subtotal is the sum of the item totals rounded
/// to cents, so that it agrees with the per item figures shown on a quotation.
/// Otherwise the raw item totals are summed. Every
/// order level discount is taken against that subtotal, except the company
/// discount which applies after the order wide bulk discount.
pub fn aggregate(
    items: &[PricedLineItem],
    profile: &PricingProfile,
    customer_tier: CustomerTier,
    company_discount: bool,
) -> Result<OrderAdjustments, PricingError> {
    if items.is_empty() {
        return Err(PricingError::Validation("Items array is required".to_string()));
    }

    let subtotal: f64 = items
        .iter()
        .map(|item| {
            if profile.round_item_totals {
                round_cents(item.total_price)
            } else {
                item.total_price
            }
        })
        .sum();
    let total_quantity: u64 = items.iter().map(|item| item.quantity).sum();

    let bulk_discount_percentage = match profile.bulk_discount {
        BulkDiscountScope::OrderQuantity => bulk_discount_percentage(total_quantity),
        BulkDiscountScope::PerItem => 0,
    };
    let bulk_discount = subtotal * bulk_discount_percentage as f64 / 100.0;

    let order_level_discount = match &profile.order_volume_discount {
        Some(volume) if total_quantity >= volume.min_quantity => {
            subtotal * volume.percentage / 100.0
        }
        _ => 0.0,
    };

    let tier_discount = if profile.customer_tier_discounts {
        subtotal * customer_tier.discount_percentage() / 100.0
    } else {
        0.0
    };

    let company_discount_percentage = match profile.company_discount_percentage {
        Some(percentage) if company_discount => percentage,
        _ => 0.0,
    };
    let company_discount = (subtotal - bulk_discount) * company_discount_percentage / 100.0;

    let total_discount = bulk_discount + order_level_discount + tier_discount + company_discount;

    Ok(OrderAdjustments {
        subtotal,
        total_quantity,
        bulk_discount_percentage,
        bulk_discount,
        order_level_discount,
        tier_discount,
        company_discount_percentage,
        company_discount,
        total_discount,
        subtotal_after_discount: subtotal - total_discount,
    })
}
