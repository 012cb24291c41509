//! Coupon codes and discount math.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Discount {
    /// Percentage of the subtotal, expressed as 0..=100.
    Percentage(BigDecimal),
    /// Fixed amount in BRL.
    Fixed(BigDecimal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    #[serde(flatten)]
    pub discount: Discount,
    #[serde(default)]
    pub min_subtotal: Option<BigDecimal>,
    /// Audience marker from the storefront copy (e.g. "first_purchase").
    /// Carried as data; checkout does not enforce it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
}

impl Coupon {
    pub fn percentage(code: impl Into<String>, percent: impl Into<BigDecimal>) -> Self {
        Self {
            code: code.into(),
            discount: Discount::Percentage(percent.into()),
            min_subtotal: None,
            applies_to: None,
        }
    }

    pub fn fixed(code: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            code: code.into(),
            discount: Discount::Fixed(amount),
            min_subtotal: None,
            applies_to: None,
        }
    }

    pub fn meets_minimum(&self, subtotal: &BigDecimal) -> bool {
        match &self.min_subtotal {
            Some(minimum) => subtotal >= minimum,
            None => true,
        }
    }

    /// Discount amount for a given subtotal, rounded to cents and
    /// clamped so an order can never go negative.
    pub fn discount_for(&self, subtotal: &BigDecimal) -> BigDecimal {
        if !self.meets_minimum(subtotal) {
            return BigDecimal::from(0);
        }

        let raw = match &self.discount {
            Discount::Percentage(percent) => (subtotal * percent / BigDecimal::from(100)).round(2),
            Discount::Fixed(amount) => amount.clone(),
        };

        if raw > *subtotal {
            subtotal.clone()
        } else if raw < BigDecimal::from(0) {
            BigDecimal::from(0)
        } else {
            raw
        }
    }
}

/// The storefront's active coupon codes, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    pub fn lookup(&self, code: &str) -> Option<&Coupon> {
        let wanted = code.trim();
        if wanted.is_empty() {
            return None;
        }
        self.coupons
            .iter()
            .find(|coupon| coupon.code.eq_ignore_ascii_case(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).expect("valid decimal")
    }

    fn book() -> CouponBook {
        CouponBook::new(vec![
            Coupon::percentage("BEMVINDO20", 20),
            Coupon::fixed("BARCA49", decimal("49.90")),
        ])
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let book = book();
        assert!(book.lookup("bemvindo20").is_some());
        assert!(book.lookup("  BARCA49  ").is_some());
        assert!(book.lookup("NADA").is_none());
        assert!(book.lookup("").is_none());
    }

    #[test]
    fn percentage_discount_rounds_to_cents() {
        let coupon = Coupon::percentage("BEMVINDO20", 20);
        assert_eq!(coupon.discount_for(&decimal("45.90")), decimal("9.18"));
        assert_eq!(coupon.discount_for(&decimal("100.00")), decimal("20.00"));
    }

    #[test]
    fn fixed_discount_is_clamped_to_subtotal() {
        let coupon = Coupon::fixed("BARCA49", decimal("49.90"));
        assert_eq!(coupon.discount_for(&decimal("30.00")), decimal("30.00"));
        assert_eq!(coupon.discount_for(&decimal("80.00")), decimal("49.90"));
    }

    #[test]
    fn minimum_subtotal_gates_the_discount() {
        let mut coupon = Coupon::percentage("BEMVINDO20", 20);
        coupon.min_subtotal = Some(decimal("50.00"));

        assert_eq!(coupon.discount_for(&decimal("40.00")), BigDecimal::from(0));
        assert_eq!(coupon.discount_for(&decimal("50.00")), decimal("10.00"));
    }

    #[test]
    fn audience_marker_is_carried_but_not_enforced() {
        let mut coupon = Coupon::percentage("BEMVINDO20", 20);
        coupon.applies_to = Some("first_purchase".to_string());

        assert_eq!(coupon.discount_for(&decimal("45.90")), decimal("9.18"));

        let parsed: Coupon = serde_json::from_str(
            r#"{"code":"BEMVINDO20","type":"percentage","value":"20","applies_to":"first_purchase"}"#,
        )
        .expect("valid coupon");
        assert_eq!(parsed.applies_to.as_deref(), Some("first_purchase"));
    }
}
