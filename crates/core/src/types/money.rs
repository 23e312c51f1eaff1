//! Money helpers.
//!
//! The backend carries prices as JSON floats in a single implicit currency.
//! Amounts are held as [`Decimal`] so that sums and discounts display without
//! binary floating point noise; they cross the wire through
//! `rust_decimal::serde::float`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount for display (e.g., `$19.99`).
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${rounded:.2}")
    }
}

/// Price after applying a percentage discount.
///
/// Mirrors the backend's cart arithmetic: `price * (1 - discount / 100)`.
#[must_use]
pub fn discounted_price(price: Decimal, discount_percentage: Decimal) -> Decimal {
    price * (Decimal::ONE - discount_percentage / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_pads_cents() {
        assert_eq!(format_money(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_money(Decimal::new(1999, 2)), "$19.99");
    }

    #[test]
    fn test_format_money_rounds() {
        assert_eq!(format_money(Decimal::new(10005, 3)), "$10.01");
    }

    #[test]
    fn test_format_money_negative() {
        assert_eq!(format_money(Decimal::new(-250, 2)), "-$2.50");
    }

    #[test]
    fn test_discounted_price() {
        let price = Decimal::new(200, 0);
        let discount = Decimal::new(25, 0);
        assert_eq!(discounted_price(price, discount), Decimal::new(150, 0));
    }
}
