//! Currency codes and display formatting for decimal amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Sums are always accumulated as `rust_decimal::Decimal`; rounding to two
//! decimals happens only here, at the presentation boundary.

use num_format::{Locale, ToFormattedString as _};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown for every amount in the report.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Currency identifier attached to report amounts (code or symbol).
///
/// The report never converts between currencies; the code is carried
/// through so consumers can label amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds an amount to the display precision (midpoint away from zero).
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DECIMALS);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Formats an amount with two fixed decimals and `en` thousands separators.
///
/// `1234.5` renders as `1,234.50`, `-0.004` renders as `0.00`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let plain = rounded.abs().to_string();
    let (integer_part, fraction_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let grouped = integer_part
        .parse::<u128>()
        .map_or_else(|_| integer_part.to_string(), |n| n.to_formatted_string(&Locale::en));

    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction_part:0<2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), "0.00")]
    #[case(dec!(1234.5), "1,234.50")]
    #[case(dec!(1000000), "1,000,000.00")]
    #[case(dec!(999.994), "999.99")]
    #[case(dec!(999.995), "1,000.00")]
    #[case(dec!(-1234567.125), "-1,234,567.13")]
    #[case(dec!(-0.004), "0.00")]
    #[case(dec!(0.1), "0.10")]
    fn test_format_amount(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_amount(amount), expected);
    }

    #[test]
    fn test_round_for_display_keeps_two_decimals() {
        let rounded = round_for_display(dec!(10));
        assert_eq!(rounded, dec!(10.00));
        assert_eq!(rounded.scale(), 2);
        assert_eq!(round_for_display(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_currency_code_display() {
        let code = CurrencyCode::from("USD");
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code.to_string(), "USD");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"USD\"");
    }
}
