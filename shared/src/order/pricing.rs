//! Pricing formula
//!
//! `(price + Σ option.price_adjustment) * quantity`, integer arithmetic in the
//! smallest currency unit. Cart lines and server order items both go through
//! these functions so the two totals can never drift apart.

use crate::models::ItemOption;

/// Unit price of an item with the given options applied
pub fn unit_price(base_price: i64, options: &[ItemOption]) -> i64 {
    base_price + options.iter().map(|o| o.price_adjustment).sum::<i64>()
}

/// Line total for `quantity` units
pub fn line_total(base_price: i64, options: &[ItemOption], quantity: u32) -> i64 {
    unit_price(base_price, options) * i64::from(quantity)
}

/// Format an amount for display (yen, no minor unit)
///
/// ```
/// use shared::order::pricing::format_amount;
///
/// assert_eq!(format_amount(880), "¥880");
/// assert_eq!(format_amount(12500), "¥12,500");
/// assert_eq!(format_amount(-50), "-¥50");
/// ```
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(id: i64, adj: i64) -> ItemOption {
        ItemOption {
            id,
            name: format!("opt-{}", id),
            price_adjustment: adj,
        }
    }

    #[test]
    fn test_unit_price_with_options() {
        assert_eq!(unit_price(780, &[]), 780);
        assert_eq!(unit_price(780, &[opt(101, 100)]), 880);
        // Discount options are negative
        assert_eq!(unit_price(780, &[opt(101, 100), opt(102, -50)]), 830);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(780, &[opt(101, 100)], 1), 880);
        assert_eq!(line_total(350, &[], 3), 1050);
        assert_eq!(line_total(350, &[], 0), 0);
    }

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(0), "¥0");
        assert_eq!(format_amount(999), "¥999");
        assert_eq!(format_amount(1000), "¥1,000");
        assert_eq!(format_amount(1234567), "¥1,234,567");
    }
}
