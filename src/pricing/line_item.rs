use super::profile::{BulkDiscountScope, PricingProfile};
use super::types::{Customizations, LineItem, PricedLineItem};
use super::PricingError;

const MATERIAL_PREMIUMS: [(&str, f64); 3] = [
    ("premium_leather", 0.25),
    ("high_grade_wood", 0.20),
    ("fabric_upgrade", 0.10),
];

const SIZE_PREMIUMS: [(&str, f64); 3] = [("executive", 0.30), ("large", 0.20), ("custom", 0.25)];

const CUSTOM_COLOR_PREMIUM: f64 = 0.10;

/// Bulk discount percentage for a quantity. Highest threshold wins.
pub fn bulk_discount_percentage(quantity: u64) -> u32 {
    match quantity {
        q if q >= 51 => 15,
        q if q >= 21 => 10,
        q if q >= 6 => 5,
        _ => 0,
    }
}

fn option_rate(table: &[(&str, f64)], selected: Option<&str>) -> f64 {
    selected
        .and_then(|value| table.iter().find(|(option, _)| *option == value))
        .map(|(_, rate)| *rate)
        .unwrap_or(0.0)
}

/// Sum of all customization premiums, each taken against the original unit price.
/// Options outside the known tables add nothing.
pub fn customization_premium(unit_price: f64, customizations: &Customizations) -> f64 {
    let material = unit_price * option_rate(&MATERIAL_PREMIUMS, customizations.material.as_deref());

    let color = match customizations.color.as_deref() {
        Some(color) if !color.is_empty() && color != "standard" => {
            unit_price * CUSTOM_COLOR_PREMIUM
        }
        _ => 0.0,
    };

    let size = unit_price * option_rate(&SIZE_PREMIUMS, customizations.size.as_deref());

    material + color + size
}

/// Largest quantity an f64 still holds as an exact integer (2^53)
const MAX_QUANTITY: f64 = 9_007_199_254_740_992.0;

fn validate_quantity(index: usize, quantity: Option<f64>) -> Result<u64, PricingError> {
    let quantity = quantity.ok_or_else(|| {
        PricingError::Validation(format!("Item {}: quantity is required", index + 1))
    })?;

    if !quantity.is_finite() || quantity < 1.0 || quantity.fract() != 0.0 || quantity > MAX_QUANTITY {
        return Err(PricingError::Validation(format!(
            "Item {}: quantity must be a positive integer, got {}",
            index + 1,
            quantity
        )));
    }

    Ok(quantity as u64)
}

fn validate_unit_price(index: usize, unit_price: Option<f64>) -> Result<f64, PricingError> {
    let unit_price = unit_price.ok_or_else(|| {
        PricingError::Validation(format!("Item {}: unitPrice is required", index + 1))
    })?;

    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(PricingError::Validation(format!(
            "Item {}: unitPrice must be a non-negative number, got {}",
            index + 1,
            unit_price
        )));
    }

    Ok(unit_price)
}

/// Prices a single line item. `index` is only used to point at the offending
/// item in validation messages.
pub fn price_line_item(
    index: usize,
    item: &LineItem,
    profile: &PricingProfile,
) -> Result<PricedLineItem, PricingError> {
    let quantity = validate_quantity(index, item.quantity)?;
    let unit_price = validate_unit_price(index, item.unit_price)?;
    let customizations = item.customizations.clone().unwrap_or_default();

    let customization_premium = if profile.apply_customizations {
        customization_premium(unit_price, &customizations)
    } else {
        0.0
    };

    let adjusted_unit_price = unit_price + customization_premium;
    let adjusted_subtotal = adjusted_unit_price * quantity as f64;

    let discount_percentage = match profile.bulk_discount {
        BulkDiscountScope::PerItem => bulk_discount_percentage(quantity),
        BulkDiscountScope::OrderQuantity => 0,
    };
    let discount_amount = adjusted_subtotal * discount_percentage as f64 / 100.0;

    Ok(PricedLineItem {
        product_id: item.product_id.clone(),
        product_name: item.product_name.clone(),
        quantity,
        base_unit_price: unit_price,
        customizations,
        customization_premium,
        adjusted_unit_price,
        adjusted_subtotal,
        discount_percentage,
        discount_amount,
        total_price: adjusted_subtotal - discount_amount,
    })
}
