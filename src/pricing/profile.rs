/// Which quantity selects the bulk discount tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkDiscountScope {
    /// Each line item is discounted by the tier of its own quantity
    PerItem,
    /// The whole subtotal is discounted by the tier of the order's total quantity
    OrderQuantity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeDiscount {
    pub min_quantity: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShippingSchedule {
    /// Half-open bands: the first band whose `below` limit exceeds the amount
    /// applies, `beyond` covers everything past the last band.
    Tiered {
        bands: Vec<ShippingBand>,
        beyond: f64,
    },
    /// Flat fee unless the amount is strictly greater than the threshold
    FreeAbove { threshold: f64, fee: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingBand {
    pub below: f64,
    pub cost: f64,
}

impl ShippingSchedule {
    pub fn cost_for(&self, amount: f64) -> f64 {
        match self {
            ShippingSchedule::Tiered { bands, beyond } => bands
                .iter()
                .find(|band| amount < band.below)
                .map(|band| band.cost)
                .unwrap_or(*beyond),
            ShippingSchedule::FreeAbove { threshold, fee } => {
                if amount > *threshold {
                    0.0
                } else {
                    *fee
                }
            }
        }
    }
}

/// Parameters for one variant of the pricing pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PricingProfile {
    pub apply_customizations: bool,
    pub bulk_discount: BulkDiscountScope,
    pub order_volume_discount: Option<VolumeDiscount>,
    pub customer_tier_discounts: bool,
    pub company_discount_percentage: Option<f64>,
    /// Sum item totals rounded to cents into the subtotal instead of the raw totals
    pub round_item_totals: bool,
    /// in percent, eg. 17.0 means 17%
    pub tax_rate: f64,
    pub shipping: ShippingSchedule,
    pub currency: String,
}

impl PricingProfile {
    /// Quotation pricing: customizations, per item tiers, 17% GST, tiered shipping
    pub fn quotation(currency: &str) -> Self {
        Self {
            apply_customizations: true,
            bulk_discount: BulkDiscountScope::PerItem,
            order_volume_discount: Some(VolumeDiscount {
                min_quantity: 100,
                percentage: 5.0,
            }),
            customer_tier_discounts: true,
            company_discount_percentage: None,
            round_item_totals: true,
            tax_rate: 17.0,
            shipping: ShippingSchedule::Tiered {
                bands: vec![
                    ShippingBand {
                        below: 100_000.0,
                        cost: 2_500.0,
                    },
                    ShippingBand {
                        below: 500_000.0,
                        cost: 5_000.0,
                    },
                ],
                beyond: 0.0,
            },
            currency: currency.to_string(),
        }
    }

    /// Storefront order pricing: plain prices, order wide tier, 2% GST
    pub fn order(currency: &str) -> Self {
        Self {
            apply_customizations: false,
            bulk_discount: BulkDiscountScope::OrderQuantity,
            order_volume_discount: None,
            customer_tier_discounts: false,
            company_discount_percentage: Some(5.0),
            round_item_totals: false,
            tax_rate: 2.0,
            shipping: ShippingSchedule::FreeAbove {
                threshold: 100_000.0,
                fee: 5_000.0,
            },
            currency: currency.to_string(),
        }
    }
}
