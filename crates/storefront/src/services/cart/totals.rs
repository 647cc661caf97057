//! Cart totals.

use serde::Serialize;

use suds_core::{Money, ProductId};

use crate::models::CartLine;

/// One priced line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// `unit_price * quantity`, unrounded.
    pub line_total: Money,
}

/// Priced contents of a cart.
///
/// All amounts keep full precision; round with [`Money::display`] when
/// presenting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub lines: Vec<TotalLine>,
    pub total_price: Money,
}

impl CartTotals {
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let lines: Vec<TotalLine> = lines
            .into_iter()
            .map(|line| TotalLine {
                line_total: line.line_total(),
                product_id: line.product_id,
                name: line.name,
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();
        let total_price = lines.iter().map(|line| line.line_total).sum();
        Self { lines, total_price }
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: i32, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Soap {id}"),
            unit_price: Money::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_totals_sum_line_totals() {
        let totals = CartTotals::from_lines(vec![line(7, 350, 2), line(9, 1_199, 3)]);
        assert_eq!(totals.lines[0].line_total.display(), "7.00");
        assert_eq!(totals.lines[1].line_total.amount(), Decimal::new(3_597, 2));
        assert_eq!(totals.total_price.amount(), Decimal::new(4_297, 2));
        assert_eq!(totals.item_count(), 5);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let totals = CartTotals::from_lines(Vec::new());
        assert!(totals.is_empty());
        assert_eq!(totals.total_price.display(), "0.00");
        assert_eq!(totals.item_count(), 0);
    }
}
