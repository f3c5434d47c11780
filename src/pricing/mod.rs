mod aggregate;
mod charges;
mod line_item;
mod profile;
mod types;
pub mod utils;

pub use aggregate::aggregate;
pub use charges::apply_charges;
pub use line_item::{bulk_discount_percentage, customization_premium, price_line_item};
pub use profile::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("{0}")]
    Validation(String),

    #[error("Computation error: {0}")]
    Computation(String),
}

/// Runs line items through a pricing profile: line item pricing, order level
/// discounts, then tax and shipping. Pure; the same input always gives the
/// same amounts.
pub fn price_order(
    profile: &PricingProfile,
    items: &[LineItem],
    customer_tier: CustomerTier,
    company_discount: bool,
) -> Result<PricedOrder, PricingError> {
    if items.is_empty() {
        return Err(PricingError::Validation("Items array is required".to_string()));
    }

    let priced_items = items
        .iter()
        .enumerate()
        .map(|(index, item)| price_line_item(index, item, profile))
        .collect::<Result<Vec<_>, _>>()?;

    let adjustments = aggregate(&priced_items, profile, customer_tier, company_discount)?;
    let charges = apply_charges(adjustments.subtotal_after_discount, profile);

    if !charges.final_total.is_finite() || !charges.tax_amount.is_finite() {
        return Err(PricingError::Computation(
            "order total is out of range".to_string(),
        ));
    }

    Ok(PricedOrder {
        items: priced_items,
        adjustments,
        charges,
        customer_tier,
        currency: profile.currency.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customized(material: &str, color: &str, size: &str) -> Customizations {
        Customizations {
            material: Some(material.to_string()),
            color: Some(color.to_string()),
            size: Some(size.to_string()),
        }
    }

    #[test]
    fn test_premium_customer_example() {
        let profile = PricingProfile::quotation("PKR");
        let order = price_order(
            &profile,
            &[LineItem::new(10.0, 5000.0)],
            CustomerTier::Premium,
            false,
        )
        .unwrap();

        assert_eq!(order.adjustments.subtotal, 47_500.0);
        assert_eq!(order.adjustments.order_level_discount, 0.0);
        assert_eq!(order.adjustments.tier_discount, 2_375.0);
        assert_eq!(order.adjustments.subtotal_after_discount, 45_125.0);
        assert!((order.charges.tax_amount - 7_671.25).abs() < 1e-9);
        assert_eq!(order.charges.shipping_cost, 2_500.0);
        assert!((order.charges.final_total - 55_296.25).abs() < 1e-9);
        assert_eq!(order.currency, "PKR");
    }

    #[test]
    fn test_final_total_invariant_holds() {
        let profile = PricingProfile::quotation("PKR");
        let baskets = vec![
            vec![LineItem::new(1.0, 0.0)],
            vec![LineItem::new(3.0, 19_999.99)],
            vec![
                LineItem::new(120.0, 2_750.5)
                    .with_customizations(customized("high_grade_wood", "walnut", "large")),
                LineItem::new(7.0, 12_000.0),
            ],
            vec![LineItem::new(51.0, 99_999.0)],
        ];

        for items in baskets {
            for tier in [CustomerTier::Standard, CustomerTier::Premium, CustomerTier::Enterprise] {
                let order = price_order(&profile, &items, tier, false).unwrap();
                let adjustments = &order.adjustments;
                let charges = &order.charges;

                assert!(
                    (charges.final_total
                        - (adjustments.subtotal_after_discount
                            + charges.tax_amount
                            + charges.shipping_cost))
                        .abs()
                        < 0.01
                );
                assert!(
                    (adjustments.subtotal_after_discount
                        - (adjustments.subtotal
                            - adjustments.order_level_discount
                            - adjustments.tier_discount))
                        .abs()
                        < 0.01
                );
                for item in &order.items {
                    assert!(
                        (item.total_price - (item.adjusted_subtotal - item.discount_amount)).abs()
                            < 0.01
                    );
                }
            }
        }
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let profile = PricingProfile::quotation("PKR");
        let items = vec![
            LineItem::new(25.0, 3_333.33)
                .with_customizations(customized("premium_leather", "red", "custom")),
            LineItem::new(80.0, 1_250.0),
        ];

        let first = price_order(&profile, &items, CustomerTier::Enterprise, false).unwrap();
        let second = price_order(&profile, &items, CustomerTier::Enterprise, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_customization_option_is_free() {
        let profile = PricingProfile::quotation("PKR");
        let item = LineItem::new(1.0, 1000.0).with_customizations(Customizations {
            material: Some("unobtanium".to_string()),
            ..Default::default()
        });

        let order = price_order(&profile, &[item], CustomerTier::Standard, false).unwrap();
        assert_eq!(order.items[0].customization_premium, 0.0);
        assert_eq!(order.adjustments.subtotal, 1000.0);
    }

    #[test]
    fn test_invalid_item_fails_whole_order() {
        let profile = PricingProfile::quotation("PKR");
        let items = vec![
            LineItem::new(1.0, 1000.0),
            LineItem {
                quantity: Some(1.0),
                ..Default::default()
            },
        ];

        let result = price_order(&profile, &items, CustomerTier::Standard, false);
        assert_eq!(
            result,
            Err(PricingError::Validation(
                "Item 2: unitPrice is required".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_order_rejected() {
        let profile = PricingProfile::order("PKR");
        assert!(matches!(
            price_order(&profile, &[], CustomerTier::Standard, true),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_overflowing_amounts_are_computation_errors() {
        let profile = PricingProfile::quotation("PKR");
        let items = vec![LineItem::new(4_000_000_000.0, f64::MAX / 2.0)];

        let result = price_order(&profile, &items, CustomerTier::Standard, false);
        assert!(matches!(result, Err(PricingError::Computation(_))));
    }
}
