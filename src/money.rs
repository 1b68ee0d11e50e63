use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Number of stored decimal places.
pub const SCALE_DIGITS: usize = 4;
const SCALE: u128 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to parse decimal: {0}")]
pub struct ParseAmountError(String);

/// Non-negative money amount in fixed point with four decimal places.
///
/// `Amount::parse("1.5")` is stored as `15000`. Digits past the fourth
/// decimal place are truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_raw(raw: u128) -> Self {
        Amount(raw)
    }

    pub fn raw(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn parse(input: &str) -> Result<Self, ParseAmountError> {
        let s = input.trim();
        let s = s.strip_prefix('+').unwrap_or(s);

        let (before_point, after_point) = match s.split_once('.') {
            Some((before, after)) => (before, after),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (before_point.is_empty() && after_point.is_empty())
            || !all_digits(before_point)
            || !all_digits(after_point)
        {
            return Err(ParseAmountError(input.to_owned()));
        }

        // handle edge where the units are left off, e.g. ".5"
        let units = if before_point.is_empty() {
            0
        } else {
            before_point
                .parse::<u128>()
                .map_err(|_| ParseAmountError(input.to_owned()))?
        };

        let mut decimals = 0u128;
        let mut chars = after_point.chars();
        for _ in 0..SCALE_DIGITS {
            let digit = chars.next().and_then(|c| c.to_digit(10)).unwrap_or(0);
            decimals = decimals * 10 + u128::from(digit);
        }

        units
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(decimals))
            .map(Amount)
            .ok_or_else(|| ParseAmountError(format!("{input}: limit exceeded")))
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Amount> {
        self.0.checked_mul(u128::from(factor)).map(Amount)
    }

    /// Integer division, truncating past the fourth decimal place.
    /// Dividing by zero yields zero.
    pub fn div_count(self, divisor: u64) -> Amount {
        if divisor == 0 {
            Amount::ZERO
        } else {
            Amount(self.0 / u128::from(divisor))
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Four decimal places, e.g. `"110.0000"`.
    pub fn to_fixed_string(self) -> String {
        let units = self.0 / SCALE;
        let decimals = self.0 % SCALE;
        format!("{units}.{decimals:0>4}")
    }
}

/// Two decimal places, rounded half up.
impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0 / 100 + u128::from(self.0 % 100 >= 50);
        let text = format!("{}.{:0>2}", cents / 100, cents % 100);
        f.pad(&text)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fixed_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Amount;

    #[test]
    fn test_parse_amount() {
        assert_eq!(Amount::parse("1.5").unwrap().raw(), 15000);
        assert_eq!(Amount::parse("0.1234").unwrap().raw(), 1234);

        // beyond 4 decimals we truncate
        assert_eq!(Amount::parse("0.123499999").unwrap().raw(), 1234);

        // no units before the point
        assert_eq!(Amount::parse(".0005").unwrap().raw(), 5);

        // integer instead of decimal
        assert_eq!(Amount::parse("100").unwrap().raw(), 100_0000);
        assert_eq!(Amount::parse("8.").unwrap().raw(), 8_0000);
        assert_eq!(Amount::parse("0.0").unwrap().raw(), 0);
        assert_eq!(Amount::parse(" 6.0 ").unwrap().raw(), 6_0000);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        for input in ["", ".", "abc", "-1", "-1.5", "1.2.3", "1,5", "1.x", "1e3"] {
            assert!(Amount::parse(input).is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_fixed_string() {
        assert_eq!(Amount::from_raw(12345).to_fixed_string(), "1.2345");
        assert_eq!(Amount::from_raw(100_2345).to_fixed_string(), "100.2345");
        assert_eq!(Amount::from_raw(2345).to_fixed_string(), "0.2345");
        assert_eq!(Amount::from_raw(5).to_fixed_string(), "0.0005");
        assert_eq!(Amount::from_raw(0).to_fixed_string(), "0.0000");
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Amount::from_raw(110_0000).to_string(), "110.00");
        assert_eq!(Amount::from_raw(1_2345).to_string(), "1.23");
        assert_eq!(Amount::from_raw(1_2350).to_string(), "1.24");
        assert_eq!(Amount::from_raw(9999).to_string(), "1.00");
        assert_eq!(format!("{:>8}", Amount::from_raw(5_0000)), "    5.00");
    }

    #[test]
    fn test_div_count() {
        let total = Amount::parse("110").unwrap();
        assert_eq!(total.div_count(2), Amount::parse("55").unwrap());
        assert_eq!(total.div_count(3).to_fixed_string(), "36.6666");
        assert_eq!(total.div_count(0), Amount::ZERO);
    }
}
