//! Pricing
//!
//! Amounts are carried as minor units (paise) and only become [`Money`] at the
//! edges, for display and read models.

use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Currency every amount in the shop is quoted in.
pub const CURRENCY: &Currency = iso::INR;

/// Flat base price of a custom blend, in minor units (₹599.00).
pub const BASE_PRICE: u64 = 599_00;

/// Price of `quantity` units at `unit_price`, saturating instead of wrapping.
pub fn line_total(unit_price: u64, quantity: u32) -> u64 {
    unit_price.saturating_mul(u64::from(quantity))
}

/// Convert minor units into [`Money`].
pub fn money(minor: u64) -> Money<'static, Currency> {
    Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_unit_price() {
        assert_eq!(line_total(BASE_PRICE, 3), 1797_00);
    }

    #[test]
    fn line_total_saturates() {
        assert_eq!(line_total(u64::MAX, 2), u64::MAX);
    }

    #[test]
    fn money_uses_rupees() {
        let amount = money(1797_00);

        assert_eq!(amount, Money::from_minor(179_700, iso::INR));
        assert_eq!(amount.currency(), iso::INR);
    }
}
