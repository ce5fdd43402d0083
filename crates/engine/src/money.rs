use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for **all** monetary values in the engine (budgets, expense
/// amounts, split shares) to avoid floating-point drift. The currency lives
/// next to the amount (on the trip or the expense), never inside it.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Divides the amount in `parts` equal shares, truncating the remainder.
    ///
    /// Returns zero when `parts` is 0.
    #[must_use]
    pub const fn share_of(self, parts: usize) -> MoneyCents {
        if parts == 0 {
            return MoneyCents::ZERO;
        }
        MoneyCents(self.0 / parts as i64)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Sums `amounts`, failing with `InvalidInput` when the total does not fit.
    pub fn checked_total(
        amounts: impl IntoIterator<Item = MoneyCents>,
    ) -> Result<MoneyCents, EngineError> {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
            .ok_or_else(overflow)
    }

    /// `self - rhs`, failing with `InvalidInput` when the result does not fit.
    pub fn try_sub(self, rhs: MoneyCents) -> Result<MoneyCents, EngineError> {
        self.checked_sub(rhs).ok_or_else(overflow)
    }

    /// Applies a percentage (`25.0` means 25%), rounding to the nearest cent.
    #[must_use]
    pub fn percent(self, percentage: f64) -> MoneyCents {
        MoneyCents((self.0 as f64 * percentage / 100.0).round() as i64)
    }
}

fn overflow() -> EngineError {
    EngineError::InvalidInput("amount too large".to_string())
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Rejects more than 2 fractional digits and empty/invalid strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidInput("empty amount".to_string());
        let invalid = || EngineError::InvalidInput("invalid amount".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidInput("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyCents(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn totals_fail_instead_of_wrapping() {
        assert_eq!(
            MoneyCents::checked_total([MoneyCents::new(150), MoneyCents::new(-50)]),
            Ok(MoneyCents::new(100))
        );
        assert_eq!(MoneyCents::checked_total(Vec::new()), Ok(MoneyCents::ZERO));
        assert!(matches!(
            MoneyCents::checked_total([MoneyCents::new(i64::MAX), MoneyCents::new(1)]),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(MoneyCents::new(i64::MIN).try_sub(MoneyCents::new(1)).is_err());
        assert_eq!(
            MoneyCents::new(1_000).try_sub(MoneyCents::new(1_200)),
            Ok(MoneyCents::new(-200))
        );
    }

    #[test]
    fn share_of_truncates_and_handles_zero_parts() {
        assert_eq!(MoneyCents::new(30_000).share_of(3), MoneyCents::new(10_000));
        assert_eq!(MoneyCents::new(100).share_of(3), MoneyCents::new(33));
        assert_eq!(MoneyCents::new(100).share_of(0), MoneyCents::ZERO);
    }

    #[test]
    fn percent_rounds_to_nearest_cent() {
        assert_eq!(MoneyCents::new(20_000).percent(25.0), MoneyCents::new(5_000));
        assert_eq!(MoneyCents::new(1_000).percent(33.333), MoneyCents::new(333));
        assert_eq!(MoneyCents::new(1_000).percent(0.0), MoneyCents::ZERO);
    }
}
