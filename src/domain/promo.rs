//! Promotions and derived cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The promotion currently applied to a cart. At most one is active at a
/// time; applying another replaces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    /// Percentage discount (0-100).
    pub discount: Decimal,
    /// Absolute discount, authoritative over the percentage when present.
    pub discount_amount: Option<Decimal>,
}

impl AppliedPromo {
    pub fn percent(code: impl Into<String>, discount: Decimal) -> Self {
        Self { code: code.into(), discount, discount_amount: None }
    }

    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        match self.discount_amount {
            Some(amount) => amount,
            None => subtotal * self.discount / Decimal::from(100),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    pub fn derive(subtotal: Decimal, promo: Option<&AppliedPromo>) -> Self {
        let discount = promo.map(|p| p.discount_for(subtotal)).unwrap_or(Decimal::ZERO);
        Self { subtotal, discount, total: subtotal - discount }
    }
}
