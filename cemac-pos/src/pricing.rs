//! Sale Total Calculator
//!
//! ```text
//! subtotal       = Σ price × quantity
//! discountAmount = subtotal × d / 100
//! afterDiscount  = subtotal − discountAmount
//! ivaAmount      = afterDiscount × t / 100
//! total          = afterDiscount + ivaAmount
//! ```
//!
//! Totals are plain `f64`, recomputed from the cart on every read. Rounding
//! to cents only happens when a value is formatted for display.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PosError, PosResult};

/// Decimal places shown to the user
const DECIMAL_PLACES: u32 = 2;

/// Percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);

    /// Validated percentage; NaN, infinities and values outside `[0, 100]` are rejected
    pub fn new(value: f64) -> PosResult<Self> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PosError::validation(format!(
                "El porcentaje debe estar entre 0 y 100 (recibido {value})"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `amount × self / 100`
    pub fn of(self, amount: f64) -> f64 {
        amount * self.0 / 100.0
    }
}

impl TryFrom<f64> for Percent {
    type Error = PosError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> f64 {
        p.0
    }
}

/// Result of a sale total calculation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub iva_amount: f64,
    pub total: f64,
}

/// Compute totals from `(price, quantity)` pairs
pub fn compute_totals<I>(lines: I, discount: Percent, iva: Percent) -> SaleTotals
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let subtotal: f64 = lines
        .into_iter()
        .map(|(price, quantity)| price * f64::from(quantity))
        .sum();
    let discount_amount = discount.of(subtotal);
    let after_discount = subtotal - discount_amount;
    let iva_amount = iva.of(after_discount);

    SaleTotals {
        subtotal,
        discount_amount,
        after_discount,
        iva_amount,
        total: after_discount + iva_amount,
    }
}

/// Round to cents, half away from zero
pub fn round_money(value: f64) -> f64 {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `$1,234.50`
pub fn format_money(value: f64) -> String {
    let rounded = Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(v: f64) -> Percent {
        Percent::new(v).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    // ==================== Totals ====================

    #[test]
    fn test_reference_sale() {
        // 2 × $100, 10% discount, 16% IVA
        let t = compute_totals([(100.0, 2)], pct(10.0), pct(16.0));
        assert_close(t.subtotal, 200.0);
        assert_close(t.discount_amount, 20.0);
        assert_close(t.after_discount, 180.0);
        assert_close(t.iva_amount, 28.8);
        assert_close(t.total, 208.8);
    }

    #[test]
    fn test_empty_cart_is_zero() {
        let t = compute_totals(std::iter::empty(), pct(25.0), pct(16.0));
        assert_eq!(t, SaleTotals::default());
    }

    #[test]
    fn test_total_matches_closed_form() {
        let lines = [(12.5, 3), (0.99, 7), (149.0, 1), (3.333, 11)];
        for d in [0.0, 5.0, 12.5, 50.0, 100.0] {
            for t in [0.0, 8.0, 16.0, 100.0] {
                let totals = compute_totals(lines, pct(d), pct(t));
                let sum: f64 = lines.iter().map(|(p, q)| p * f64::from(*q)).sum();
                let expected = sum * (1.0 - d / 100.0) * (1.0 + t / 100.0);
                assert!((totals.total - expected).abs() < 1e-9 * expected.max(1.0));
            }
        }
    }

    #[test]
    fn test_full_discount() {
        let t = compute_totals([(80.0, 1)], pct(100.0), pct(16.0));
        assert_close(t.total, 0.0);
    }

    // ==================== Percent ====================

    #[test]
    fn test_percent_bounds() {
        assert!(Percent::new(0.0).is_ok());
        assert!(Percent::new(100.0).is_ok());
        assert!(Percent::new(-0.1).is_err());
        assert!(Percent::new(100.01).is_err());
        assert!(Percent::new(f64::NAN).is_err());
        assert!(Percent::new(f64::INFINITY).is_err());
        assert!(serde_json::from_str::<Percent>("120").is_err());
        assert_eq!(serde_json::from_str::<Percent>("16").unwrap(), pct(16.0));
    }

    // ==================== Formatting ====================

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(208.8), "$208.80");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(2.675), "$2.68");
        assert_eq!(format_money(-15.5), "-$15.50");
        assert_eq!(format_money(-0.001), "$0.00");
        assert_eq!(round_money(0.125), 0.13);
    }
}
