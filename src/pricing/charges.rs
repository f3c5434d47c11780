use super::profile::PricingProfile;
use super::types::Charges;

/// Tax and shipping on the discounted subtotal
pub fn apply_charges(subtotal_after_discount: f64, profile: &PricingProfile) -> Charges {
    let tax_amount = subtotal_after_discount * profile.tax_rate / 100.0;
    let shipping_cost = profile.shipping.cost_for(subtotal_after_discount);

    Charges {
        tax_rate: profile.tax_rate,
        tax_amount,
        shipping_cost,
        final_total: subtotal_after_discount + tax_amount + shipping_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotation_charges() {
        let charges = apply_charges(45_125.0, &PricingProfile::quotation("PKR"));

        assert_eq!(charges.tax_rate, 17.0);
        assert!((charges.tax_amount - 7_671.25).abs() < 1e-9);
        assert_eq!(charges.shipping_cost, 2_500.0);
        assert!((charges.final_total - 55_296.25).abs() < 1e-9);
    }

    #[test]
    fn test_shipping_at_exact_band_limit() {
        let charges = apply_charges(100_000.0, &PricingProfile::quotation("PKR"));
        assert_eq!(charges.shipping_cost, 5_000.0);
        assert_eq!(charges.final_total, 100_000.0 + 17_000.0 + 5_000.0);
    }

    #[test]
    fn test_order_charges() {
        let profile = PricingProfile::order("PKR");

        let small = apply_charges(9_025.0, &profile);
        assert_eq!(small.tax_rate, 2.0);
        assert!((small.tax_amount - 180.5).abs() < 1e-9);
        assert_eq!(small.shipping_cost, 5_000.0);

        let large = apply_charges(150_000.0, &profile);
        assert_eq!(large.shipping_cost, 0.0);
        assert_eq!(large.final_total, 153_000.0);
    }
}
