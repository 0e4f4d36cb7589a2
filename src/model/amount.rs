//! Monetary amounts stored as integer euro cents.
//!
//! Amounts travel over the wire and into the on-device store as a plain integer number of cents
//! (`amount_cents`). The `Cents` type wraps that integer and knows how to render and parse the
//! German currency notation used by the app, e.g. `12,99 €`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Div, Mul};
use std::str::FromStr;

/// An amount of money in cents. Serializes as a bare integer.
///
/// # Examples
///
/// ```
/// # use subtrack::model::Cents;
/// # use std::str::FromStr;
/// let netflix = Cents::from_str("12,99").unwrap();
/// assert_eq!(netflix.value(), 1299);
/// assert_eq!(netflix.to_string(), "12,99 €");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw number of cents.
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// The amount in euros as a `Decimal`, e.g. `1299` -> `12.99`.
    pub fn euros(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Renders large amounts with a `K` or `M` suffix, e.g. `1,2K €`. Amounts below 1000 euros are
    /// rendered like `Display`.
    pub fn compact(&self) -> String {
        let euros = self.euros();
        let million = Decimal::from(1_000_000);
        let thousand = Decimal::from(1_000);
        if euros >= million {
            format!("{}M €", decimal_comma(euros / million, 1))
        } else if euros >= thousand {
            format!("{}K €", decimal_comma(euros / thousand, 1))
        } else {
            self.to_string()
        }
    }
}

/// Formats an amount of cents the way the app shows it, e.g. `1299` -> `12,99 €`.
pub fn format_cents(cents: i64) -> String {
    Cents(cents).to_string()
}

/// Formats an amount of cents with a `K` or `M` suffix for large values, e.g. `1,2K €`.
pub fn format_compact(cents: i64) -> String {
    Cents(cents).compact()
}

/// Parses user input such as `12,99` into cents. Input that cannot be parsed yields `0`, which
/// form validation then rejects as a non-positive amount.
pub fn parse_amount(input: &str) -> i64 {
    Cents::from_str(input).map(|c| c.value()).unwrap_or(0)
}

/// Rounds `value` to `dp` decimal places and uses a comma as the decimal separator.
fn decimal_comma(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize).replace('.', ",")
}

/// An error that can occur when parsing a string into `Cents`.
pub struct CentsError(String);

impl Debug for CentsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for CentsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid amount '{}'", self.0)
    }
}

impl std::error::Error for CentsError {}

impl FromStr for Cents {
    type Err = CentsError;

    /// Parses a euro amount such as `12,99`, `12.99`, `12,99 €` or `12`. Fractions of a cent are
    /// rounded to the nearest cent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_symbol = trimmed.trim_end_matches('€').trim_end();
        if without_symbol.is_empty() {
            return Err(CentsError(s.to_string()));
        }

        // The first comma is the decimal separator
        let normalized = without_symbol.replacen(',', ".", 1);
        let euros = Decimal::from_str(&normalized).map_err(|_| CentsError(s.to_string()))?;
        let cents = euros
            .checked_mul(Decimal::from(100))
            .ok_or_else(|| CentsError(s.to_string()))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CentsError(s.to_string()))?;
        Ok(Cents(cents))
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} €", decimal_comma(self.euros(), 2))
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Cents(value)
    }
}

impl From<Cents> for i64 {
    fn from(cents: Cents) -> Self {
        cents.0
    }
}

/// Saturates at the bounds of `i64` instead of overflowing.
impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Self) -> Self::Output {
        Cents(self.0.saturating_add(rhs.0))
    }
}

/// Saturates at the bounds of `i64` instead of overflowing.
impl Mul<i64> for Cents {
    type Output = Cents;

    fn mul(self, rhs: i64) -> Self::Output {
        Cents(self.0.saturating_mul(rhs))
    }
}

/// Integer division, truncating toward zero. Dividing by zero or `i64::MIN / -1` yields zero.
impl Div<i64> for Cents {
    type Output = Cents;

    fn div(self, rhs: i64) -> Self::Output {
        Cents(self.0.checked_div(rhs).unwrap_or(0))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, Add::add)
    }
}
