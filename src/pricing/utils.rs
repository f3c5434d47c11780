/// Rounds a monetary amount to two decimal places
pub fn round_cents(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    // avoid rendering "-0.00"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Fixed two decimal rendering used in API responses
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", round_cents(amount))
}
