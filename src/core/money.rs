//! Price formatting helpers
//!
//! All amounts in the system are integer minor units (cents), which is also
//! what the Telegram payments API expects in `LabeledPrice`.

/// Returns the display symbol for a currency code, if we know one.
fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "RUB" => Some("₽"),
        _ => None,
    }
}

/// Formats an amount of minor units as a human-readable price.
///
/// Known currencies are rendered with their symbol ("$12.50"), everything
/// else falls back to "12.50 XYZ".
pub fn format_price(amount_cents: i64, currency: &str) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    let major = abs / 100;
    let minor = abs % 100;

    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{major}.{minor:02}"),
        None => format!("{sign}{major}.{minor:02} {currency}"),
    }
}

/// Applies a fractional discount (0.0..1.0) to an amount, rounding to the
/// nearest cent.
pub fn apply_discount(amount_cents: i64, discount: f64) -> i64 {
    let discounted = amount_cents as f64 * (1.0 - discount);
    discounted.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_known_currency_with_symbol() {
        assert_eq!(format_price(1250, "USD"), "$12.50");
        assert_eq!(format_price(5, "EUR"), "€0.05");
        assert_eq!(format_price(99900, "RUB"), "₽999.00");
    }

    #[test]
    fn formats_unknown_currency_with_code() {
        assert_eq!(format_price(1250, "PLN"), "12.50 PLN");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_price(-150, "USD"), "-$1.50");
    }

    #[test]
    fn discount_rounds_to_nearest_cent() {
        // 10% off 999 cents = 899.1 -> 899
        assert_eq!(apply_discount(999, 0.10), 899);
        // 25% off 1000 = 750
        assert_eq!(apply_discount(1000, 0.25), 750);
        // zero discount is identity
        assert_eq!(apply_discount(1234, 0.0), 1234);
    }
}
