//! Monetary amounts
//!
//! Canonical cents representation plus the normalizer that turns free-text
//! keystrokes into locale display strings and display strings back into
//! numbers. Everything here is pure and stateless; the display buffer belongs
//! to the caller.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use super::locale::{CurrencyLocale, LocaleFormatter};

/// A non-negative amount counted in minor units (cents).
///
/// Floats only appear at the boundary: [`MonetaryAmount::from_major`] and
/// [`MonetaryAmount::to_major`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MonetaryAmount(u64);

impl MonetaryAmount {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a major-unit value, rounding half away from zero to the nearest cent.
    ///
    /// Returns `None` for negative, NaN, infinite or out-of-range values.
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents >= u64::MAX as f64 {
            return None;
        }
        Some(Self(cents as u64))
    }

    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Convert a decimal major-unit value (e.g. a NUMERIC column).
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        (value * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .map(Self)
    }

    /// Exact decimal with scale 2.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Sum for MonetaryAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Why a display string could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount is not numeric: {0}")]
    NotNumeric(String),

    #[error("Amount is out of range: {0}")]
    OutOfRange(String),
}

/// Converts between raw keystrokes, display strings and numeric amounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountNormalizer<F = CurrencyLocale> {
    formatter: F,
}

impl AmountNormalizer<CurrencyLocale> {
    /// Normalizer for Brazilian reais.
    pub const fn brl() -> Self {
        Self {
            formatter: CurrencyLocale::PT_BR,
        }
    }
}

impl<F: LocaleFormatter> AmountNormalizer<F> {
    pub fn new(formatter: F) -> Self {
        Self { formatter }
    }

    /// Render an amount in the normalizer's locale.
    pub fn format_amount(&self, amount: MonetaryAmount) -> String {
        self.formatter.format_cents(amount.cents())
    }

    /// Read every ASCII digit in `raw` as a running stream of cents and format it.
    ///
    /// "1", "12", "123" become 0,01 / 0,12 / 1,23. Input without digits formats
    /// as zero. Digit streams past `u64::MAX` saturate.
    pub fn format_from_digits(&self, raw: &str) -> String {
        self.format_amount(digits_to_amount(raw))
    }

    /// Strict parse of a display string into a major-unit value.
    ///
    /// Currency symbol characters and whitespace are dropped. If the locale's
    /// decimal separator is present, grouping separators before it are removed
    /// and it becomes the decimal point. What is left must be a plain decimal
    /// number in full: trailing text, a second separator or an exponent is
    /// `NotNumeric`.
    pub fn try_parse_amount(&self, display: &str) -> Result<f64, AmountParseError> {
        let normalized = self.normalize_residue(display);
        let (value, end) = scan_number(&normalized, false)?;
        if end != normalized.len() {
            return Err(AmountParseError::NotNumeric(normalized));
        }
        Ok(value)
    }

    /// Permissive parse: the longest numeric prefix of the normalized text,
    /// exponent included, or `0.0` when there is none. Callers must check
    /// positivity themselves.
    pub fn parse_to_amount(&self, display: &str) -> f64 {
        scan_number(&self.normalize_residue(display), true)
            .map(|(value, _)| value)
            .unwrap_or(0.0)
    }

    fn normalize_residue(&self, display: &str) -> String {
        let symbol = self.formatter.currency_symbol();
        let residue: String = display
            .chars()
            .filter(|c| !c.is_whitespace() && !symbol.contains(*c))
            .collect();

        let decimal = self.formatter.decimal_separator();
        let grouping = self.formatter.grouping_separator();
        match residue.find(decimal) {
            Some(pos) => {
                let (integer, rest) = residue.split_at(pos);
                let integer: String = integer.chars().filter(|c| *c != grouping).collect();
                format!("{}.{}", integer, &rest[decimal.len_utf8()..])
            }
            None => residue,
        }
    }

    /// Keystroke handler. A lone period (no comma present) is read as the
    /// decimal comma before digit extraction. `previous_raw` is not consulted.
    pub fn normalize_on_input(&self, _previous_raw: &str, raw: &str) -> String {
        if raw.contains('.') && !raw.contains(',') {
            return self.format_from_digits(&raw.replacen('.', ",", 1));
        }
        self.format_from_digits(raw)
    }

    /// Focus-loss handler. Positive amounts are rewritten in canonical
    /// two-decimal form; zero or unparseable displays are returned untouched.
    pub fn normalize_on_blur(&self, display: &str) -> String {
        let amount = self.parse_to_amount(display);
        if amount > 0.0 {
            if let Some(cents) = MonetaryAmount::from_major(amount) {
                return self.format_from_digits(&cents.cents().to_string());
            }
        }
        display.to_string()
    }
}

fn digits_to_amount(raw: &str) -> MonetaryAmount {
    let cents = raw
        .bytes()
        .filter(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        });
    MonetaryAmount::from_cents(cents)
}

/// Parse the longest `[sign] digits [. digits] [e [sign] digits]` prefix,
/// returning the value and the byte length consumed.
fn scan_number(text: &str, allow_exponent: bool) -> Result<(f64, usize), AmountParseError> {
    if text.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let bytes = text.as_bytes();
    let at = |i: usize| bytes.get(i).copied();
    let scan_digits = |mut i: usize| {
        while at(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(at(0), Some(b'+' | b'-')));
    let integer_end = scan_digits(end);
    let mut digits = integer_end - end;
    end = integer_end;

    if at(end) == Some(b'.') {
        let fraction_end = scan_digits(end + 1);
        let fraction_digits = fraction_end - (end + 1);
        if digits > 0 || fraction_digits > 0 {
            digits += fraction_digits;
            end = fraction_end;
        }
    }

    if digits == 0 {
        return Err(AmountParseError::NotNumeric(text.to_string()));
    }

    if allow_exponent && matches!(at(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(at(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = scan_digits(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    let value: f64 = text[..end]
        .parse()
        .map_err(|_| AmountParseError::NotNumeric(text.to_string()))?;
    if !value.is_finite() {
        return Err(AmountParseError::OutOfRange(text.to_string()));
    }
    Ok((value, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_DISPLAY: &str = "R$\u{a0}0,00";

    fn brl() -> AmountNormalizer {
        AmountNormalizer::brl()
    }

    #[test]
    fn test_format_from_digits_basic() {
        assert_eq!(brl().format_from_digits("150"), "R$\u{a0}1,50");
        assert_eq!(brl().format_from_digits("5"), "R$\u{a0}0,05");
        assert_eq!(brl().format_from_digits("2550"), "R$\u{a0}25,50");
        assert_eq!(brl().format_from_digits("25500"), "R$\u{a0}255,00");
    }

    #[test]
    fn test_format_from_digits_without_digits_is_zero() {
        assert_eq!(brl().format_from_digits(""), ZERO_DISPLAY);
        assert_eq!(brl().format_from_digits("abc"), ZERO_DISPLAY);
        assert_eq!(brl().format_from_digits("R$"), ZERO_DISPLAY);
    }

    #[test]
    fn test_format_from_digits_ignores_separators_and_leading_zeros() {
        assert_eq!(brl().format_from_digits("R$ 25,50"), "R$\u{a0}25,50");
        assert_eq!(brl().format_from_digits("000123"), "R$\u{a0}1,23");
        assert_eq!(brl().format_from_digits("1.000,00"), "R$\u{a0}1.000,00");
    }

    #[test]
    fn test_cents_ticker() {
        assert_eq!(brl().format_from_digits("1"), "R$\u{a0}0,01");
        assert_eq!(brl().format_from_digits("12"), "R$\u{a0}0,12");
        assert_eq!(brl().format_from_digits("123"), "R$\u{a0}1,23");
    }

    #[test]
    fn test_format_from_digits_saturates() {
        assert_eq!(
            brl().format_from_digits("18446744073709551615"),
            brl().format_amount(MonetaryAmount::from_cents(u64::MAX))
        );
        assert_ne!(
            brl().format_from_digits("18446744073709551614"),
            brl().format_from_digits("18446744073709551615")
        );

        let huge = "9".repeat(40);
        let formatted = brl().format_from_digits(&huge);
        assert_eq!(formatted, brl().format_amount(MonetaryAmount::from_cents(u64::MAX)));
    }

    #[test]
    fn test_parse_to_amount() {
        assert_eq!(brl().parse_to_amount("R$ 25,50"), 25.50);
        assert_eq!(brl().parse_to_amount("R$ 255,00"), 255.0);
        assert_eq!(brl().parse_to_amount("R$ 0,00"), 0.0);
        assert_eq!(brl().parse_to_amount("R$\u{a0}1.234,56"), 1234.56);
    }

    #[test]
    fn test_parse_to_amount_without_comma_keeps_period() {
        assert_eq!(brl().parse_to_amount("12.5"), 12.5);
        assert_eq!(brl().parse_to_amount("1.234"), 1.234);
    }

    #[test]
    fn test_parse_to_amount_degrades_to_zero() {
        assert_eq!(brl().parse_to_amount(""), 0.0);
        assert_eq!(brl().parse_to_amount("abc"), 0.0);
        assert_eq!(brl().parse_to_amount("R$"), 0.0);
        assert_eq!(brl().parse_to_amount(","), 0.0);
        assert_eq!(brl().parse_to_amount("1e999"), 0.0);
    }

    #[test]
    fn test_parse_to_amount_reads_numeric_prefix() {
        assert_eq!(brl().parse_to_amount("12abc"), 12.0);
        assert_eq!(brl().parse_to_amount("1,2,3"), 1.2);
        assert_eq!(brl().parse_to_amount(",5"), 0.5);
        assert_eq!(brl().parse_to_amount("-3,00"), -3.0);
    }

    #[test]
    fn test_try_parse_amount_errors() {
        assert_eq!(brl().try_parse_amount("R$ "), Err(AmountParseError::Empty));
        assert!(matches!(
            brl().try_parse_amount("abc"),
            Err(AmountParseError::NotNumeric(_))
        ));
        assert!(matches!(
            brl().try_parse_amount(&"9".repeat(400)),
            Err(AmountParseError::OutOfRange(_))
        ));
        assert_eq!(brl().try_parse_amount("R$ 0,00"), Ok(0.0));
    }

    #[test]
    fn test_try_parse_amount_requires_whole_input() {
        for input in ["12abc", "5e1", "1,2,3", "10 reais e 50", "1.5.5", "2,5x"] {
            assert!(
                matches!(brl().try_parse_amount(input), Err(AmountParseError::NotNumeric(_))),
                "{input:?} should be rejected"
            );
        }
        assert_eq!(brl().try_parse_amount("R$\u{a0}1.234,56"), Ok(1234.56));
        assert_eq!(brl().try_parse_amount(" 12.5 "), Ok(12.5));
        assert_eq!(brl().try_parse_amount(",5"), Ok(0.5));
    }

    #[test]
    fn test_parse_to_amount_accepts_exponent_prefix() {
        assert_eq!(brl().parse_to_amount("5e1"), 50.0);
        assert_eq!(brl().parse_to_amount("5e"), 5.0);
    }

    #[test]
    fn test_round_trip_digit_strings() {
        let samples = [
            "0", "5", "42", "150", "2550", "99999", "123456", "000789", "99999999",
            "100000000000",
        ];
        for digits in samples {
            let expected = digits.parse::<u64>().unwrap() as f64 / 100.0;
            let parsed = brl().parse_to_amount(&brl().format_from_digits(digits));
            assert!(
                (parsed - expected).abs() <= f64::EPSILON * expected.max(1.0),
                "{digits}: expected {expected}, got {parsed}"
            );
        }
    }

    #[test]
    fn test_round_trip_en_us() {
        let normalizer = AmountNormalizer::new(CurrencyLocale::EN_US);
        let display = normalizer.format_from_digits("123456789");
        assert_eq!(display, "$1,234,567.89");
        assert_eq!(normalizer.parse_to_amount(&display), 1_234_567.89);
    }

    #[test]
    fn test_normalize_on_input_period_as_comma() {
        assert_eq!(
            brl().normalize_on_input("", "12.5"),
            brl().normalize_on_input("", "12,5")
        );
        assert_eq!(brl().normalize_on_input("R$\u{a0}9,99", "12.5"), "R$\u{a0}1,25");
    }

    #[test]
    fn test_normalize_on_input_keeps_existing_comma() {
        assert_eq!(
            brl().normalize_on_input("", "R$\u{a0}1.234,5"),
            "R$\u{a0}123,45"
        );
    }

    #[test]
    fn test_normalize_on_blur_canonicalizes_positive() {
        assert_eq!(brl().normalize_on_blur("R$ 2,5"), "R$\u{a0}2,50");
        assert_eq!(brl().normalize_on_blur("3"), "R$\u{a0}3,00");
        assert_eq!(brl().normalize_on_blur("R$\u{a0}1.234,56"), "R$\u{a0}1.234,56");
    }

    #[test]
    fn test_normalize_on_blur_leaves_zero_and_invalid() {
        assert_eq!(brl().normalize_on_blur(ZERO_DISPLAY), ZERO_DISPLAY);
        assert_eq!(brl().normalize_on_blur("abc"), "abc");
        assert_eq!(brl().normalize_on_blur(""), "");
        assert_eq!(brl().normalize_on_blur("-5,00"), "-5,00");
    }

    #[test]
    fn test_normalize_on_blur_idempotent() {
        let inputs = ["R$ 2,5", "R$\u{a0}2,55", "7", "0,001", "12.345", "R$ 1.000,10"];
        for input in inputs {
            let once = brl().normalize_on_blur(input);
            let twice = brl().normalize_on_blur(&once);
            assert_eq!(once, twice, "blur not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_typing_blur_submit_scenario() {
        let n = brl();
        let mut display = String::new();
        let mut seen = Vec::new();
        for keystrokes in ["2", "25", "255"] {
            display = n.normalize_on_input(&display, keystrokes);
            seen.push(display.clone());
        }
        assert_eq!(seen, ["R$\u{a0}0,02", "R$\u{a0}0,25", "R$\u{a0}2,55"]);

        let blurred = n.normalize_on_blur(&display);
        assert_eq!(blurred, "R$\u{a0}2,55");

        let submitted = MonetaryAmount::from_major(n.parse_to_amount(&blurred)).unwrap();
        assert_eq!(submitted, MonetaryAmount::from_cents(255));
        assert_eq!(submitted.to_decimal().to_string(), "2.55");
    }

    #[test]
    fn test_monetary_amount_from_major_rounding() {
        assert_eq!(MonetaryAmount::from_major(2.55), Some(MonetaryAmount::from_cents(255)));
        assert_eq!(MonetaryAmount::from_major(0.005), Some(MonetaryAmount::from_cents(1)));
        assert_eq!(MonetaryAmount::from_major(-0.01), None);
        assert_eq!(MonetaryAmount::from_major(f64::NAN), None);
        assert_eq!(MonetaryAmount::from_major(f64::INFINITY), None);
    }

    #[test]
    fn test_monetary_amount_decimal_conversion() {
        let amount = MonetaryAmount::from_cents(123_456);
        assert_eq!(amount.to_decimal(), Decimal::new(123_456, 2));
        assert_eq!(MonetaryAmount::from_decimal(Decimal::new(2550, 2)), Some(MonetaryAmount::from_cents(2550)));
        assert_eq!(MonetaryAmount::from_decimal(Decimal::new(-1, 2)), None);
        assert_eq!(amount.to_string(), "1234.56");
    }

    #[test]
    fn test_monetary_amount_sum_saturates() {
        let total: MonetaryAmount = [MonetaryAmount::from_cents(u64::MAX), MonetaryAmount::from_cents(1)]
            .into_iter()
            .sum();
        assert_eq!(total, MonetaryAmount::from_cents(u64::MAX));
    }

    #[test]
    fn test_normalizer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AmountNormalizer>();
    }
}
