// 💵 Money - Fixed-point currency as integer cents
// No floats anywhere: every amount is an exact i64 cent count, so sums of
// thousands of entries never drift. Display is always "$D.CC".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// MONEY VALUE
// ============================================================================

/// An exact amount of money, stored as a signed number of cents.
///
/// Entry amounts are non-negative; balances go negative when a party owes.
/// Serializes as the bare cent count (the ledger file stores raw cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    pub cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub fn from_cents(cents: i64) -> Self {
        Money { cents }
    }

    /// Parse a form-style amount: one or more dollar digits, a dot, and
    /// exactly two cent digits ("12.50"). Anything else is rejected -
    /// including signs, currency symbols, and one- or three-digit cents.
    pub fn parse(text: &str) -> Result<Money, MoneyParseError> {
        let (dollars, cents) = text
            .split_once('.')
            .ok_or_else(|| MoneyParseError::new(text))?;

        let well_formed = !dollars.is_empty()
            && cents.len() == 2
            && dollars.bytes().all(|b| b.is_ascii_digit())
            && cents.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(MoneyParseError::new(text));
        }

        let dollars: i64 = dollars.parse().map_err(|_| MoneyParseError::new(text))?;
        let cents: i64 = cents.parse().map_err(|_| MoneyParseError::new(text))?;

        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Money::from_cents)
            .ok_or_else(|| MoneyParseError::new(text))
    }

    pub fn add(self, other: Money) -> Money {
        Money {
            cents: self.cents + other.cents,
        }
    }

    /// Exact difference; negative when `other` is larger.
    pub fn subtract(self, other: Money) -> Money {
        Money {
            cents: self.cents - other.cents,
        }
    }

    pub fn is_negative(self) -> bool {
        self.cents < 0
    }
}

impl fmt::Display for Money {
    /// "$12.50", "$0.07", "-$7.00" - the sign is rendered once, before the
    /// dollar sign, and the cent part is always two digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

// ============================================================================
// PARSE ERROR
// ============================================================================

/// Rejected money input, kept verbatim for error messages.
#[derive(Debug, Clone)]
pub struct MoneyParseError {
    pub input: String,
}

impl MoneyParseError {
    fn new(input: &str) -> Self {
        MoneyParseError {
            input: input.to_string(),
        }
    }
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid amount {:?}: expected dollars and two cent digits, like 12.50",
            self.input
        )
    }
}

impl std::error::Error for MoneyParseError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(Money::parse("0.00").unwrap(), Money::from_cents(0));
        assert_eq!(Money::parse("0.07").unwrap(), Money::from_cents(7));
        assert_eq!(Money::parse("12.50").unwrap(), Money::from_cents(1250));
        assert_eq!(Money::parse("1234.99").unwrap(), Money::from_cents(123499));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let bad = [
            "", "12", "12.", "12.5", "12.500", ".50", "12,50", "$12.50", "-4.00", "+4.00",
            "abc", "12.ab", "1 2.00", "12.50 ", "12..50",
        ];
        for input in bad {
            let err = Money::parse(input).unwrap_err();
            assert!(
                err.input == input,
                "expected rejection of {:?} to carry the input back",
                input
            );
        }
    }

    #[test]
    fn test_parse_rejects_unrepresentable_amounts() {
        // Would overflow i64 cents.
        assert!(Money::parse("92233720368547758080.00").is_err());
    }

    #[test]
    fn test_format_positive_zero_negative() {
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::from_cents(1250).to_string(), "$12.50");
        assert_eq!(Money::from_cents(-700).to_string(), "-$7.00");
        assert_eq!(Money::from_cents(-7).to_string(), "-$0.07");
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for s in ["0.00", "0.01", "0.99", "1.00", "19.99", "20.00", "12345.06"] {
            let money = Money::parse(s).unwrap();
            // Display adds the dollar sign; the numeric part must match.
            assert_eq!(money.to_string(), format!("${}", s));
        }
    }

    #[test]
    fn test_add_is_commutative() {
        let a = Money::from_cents(1999);
        let b = Money::from_cents(305);
        assert_eq!(a.add(b), b.add(a));
        assert_eq!(a.add(b), Money::from_cents(2304));
    }

    #[test]
    fn test_subtract_inverts_add() {
        let a = Money::from_cents(1999);
        let b = Money::from_cents(305);
        assert_eq!(a.add(b).subtract(b), a);
    }

    #[test]
    fn test_subtract_can_go_negative() {
        let small = Money::from_cents(300);
        let big = Money::from_cents(1000);
        let diff = small.subtract(big);
        assert!(diff.is_negative());
        assert_eq!(diff, Money::from_cents(-700));
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: Money = "4.20".parse().unwrap();
        assert_eq!(parsed, Money::from_cents(420));
        assert!("4.2".parse::<Money>().is_err());
    }
}
