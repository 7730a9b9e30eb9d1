//! # Money Module
//!
//! Provides the `Money` type for prices held in integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The remote API sends prices as decimal strings: "19.90"                │
//! │  Stored as a float, that becomes 19.899999999999998578915               │
//! │  and a push sends "19.899999999999999" back to the store.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "19.90" ──parse──► 1990 cents ──display──► "19.90"                  │
//! │    Round trip is exact, so a push never alters a price it did not edit  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::parse("19.9").unwrap();
//! assert_eq!(price.cents(), 1990);
//! assert_eq!(price.to_string(), "19.90");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MoneyParseError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that parsing can report negative input faithfully; the
/// validation layer is what rejects negative prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal amount such as `"19.90"`, `"5"`, `"-3.5"` or `".75"`.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored
    /// - An optional leading sign is accepted
    /// - Digits past the cents position round half away from zero
    ///   (`"16.8067"` becomes 16.81, `"1.005"` becomes 1.01)
    /// - No exponent notation, no thousands separators
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
    /// assert_eq!(Money::parse("12.345").unwrap().cents(), 1235);
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, MoneyParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let not_a_number = || MoneyParseError::NotANumber(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(not_a_number());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(not_a_number());
        }

        let overflow = || MoneyParseError::Overflow(trimmed.to_string());

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };

        let mut digits = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);
        let minor = tenths * 10 + hundredths + i64::from(round_up);

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Adds a percentage surcharge, rounding half away from zero to cents.
    ///
    /// Used for tax-inclusive display; stored prices stay net.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).with_percent(19).cents(), 1190);
    /// assert_eq!(Money::from_cents(1681).with_percent(19).cents(), 2000);
    /// ```
    pub fn with_percent(&self, percent: u32) -> Money {
        let scaled = i128::from(self.0) * (100 + i128::from(percent));
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Money(i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays as a plain decimal with two fractional digits (`19.90`).
///
/// This is also the wire format used when pushing prices to the store.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
