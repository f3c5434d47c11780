use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Optional furniture customizations selected for a line item
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Customizations {
    #[serde(default, deserialize_with = "option_label", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "option_label", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "option_label", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Reads any JSON value as a customization label. Falsy values (`null`,
/// `false`, `0`, `""`) select nothing, other non-string values keep their
/// JSON text and never match a known option.
fn option_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(label) if label.is_empty() => None,
        Value::String(label) => Some(label),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    })
}

/// Customizations that are not an object select nothing
fn lenient_customizations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Customizations>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// One product line as submitted by the caller. Numeric fields stay optional
/// here so that a missing value is reported as a validation error by the
/// pricer instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<Value>,
    #[serde(default)]
    pub product_name: Option<Value>,
    #[serde(default)]
    pub quantity: Option<f64>,
    /// `price` is the field name used by the order pricing calculator
    #[serde(default, alias = "price")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_customizations")]
    pub customizations: Option<Customizations>,
}

impl LineItem {
    pub fn new(quantity: f64, unit_price: f64) -> Self {
        Self {
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Default::default()
        }
    }

    pub fn with_customizations(mut self, customizations: Customizations) -> Self {
        self.customizations = Some(customizations);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum CustomerTier {
    #[default]
    Standard,
    Premium,
    Enterprise,
}

impl CustomerTier {
    /// Unrecognised labels get the standard tier (no discount)
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "premium" => CustomerTier::Premium,
            "enterprise" => CustomerTier::Enterprise,
            _ => CustomerTier::Standard,
        }
    }

    /// Discount on the order subtotal, in percent
    pub fn discount_percentage(self) -> f64 {
        match self {
            CustomerTier::Standard => 0.0,
            CustomerTier::Premium => 5.0,
            CustomerTier::Enterprise => 8.0,
        }
    }
}

impl From<Value> for CustomerTier {
    /// Non-string tiers are unrecognised and get the standard tier
    fn from(value: Value) -> Self {
        value.as_str().map(CustomerTier::from_label).unwrap_or_default()
    }
}

/// A line item after customization premiums and its bulk discount tier have
/// been applied. Amounts are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLineItem {
    pub product_id: Option<Value>,
    pub product_name: Option<Value>,
    pub quantity: u64,
    pub base_unit_price: f64,
    pub customizations: Customizations,
    pub customization_premium: f64,
    pub adjusted_unit_price: f64,
    pub adjusted_subtotal: f64,
    pub discount_percentage: u32,
    pub discount_amount: f64,
    pub total_price: f64,
}

/// Order level figures folded from the priced line items
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAdjustments {
    pub subtotal: f64,
    pub total_quantity: u64,
    pub bulk_discount_percentage: u32,
    pub bulk_discount: f64,
    pub order_level_discount: f64,
    pub tier_discount: f64,
    pub company_discount_percentage: f64,
    pub company_discount: f64,
    pub total_discount: f64,
    pub subtotal_after_discount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charges {
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub shipping_cost: f64,
    pub final_total: f64,
}

/// Complete result of running an order through a pricing profile
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<PricedLineItem>,
    pub adjustments: OrderAdjustments,
    pub charges: Charges,
    pub customer_tier: CustomerTier,
    pub currency: String,
}
