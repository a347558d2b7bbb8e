use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A non-negative amount of money, stored in minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Budget {
    cents: u64,
}

impl Budget {
    /// A budget of zero.
    pub const ZERO: Self = Self { cents: 0 };

    /// Creates a budget from an amount in minor units.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }

    /// Formats the amount followed by a currency code, e.g. `1,500.00 USD`.
    #[must_use]
    pub fn with_currency(self, currency: &str) -> String {
        format!("{self} {currency}")
    }
}

impl fmt::Display for Budget {
    /// Writes the amount with thousands separators and two decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = (self.cents / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{grouped}.{:02}", self.cents % 100)
    }
}

/// Errors from parsing a [`Budget`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BudgetError {
    /// The amount was negative.
    #[error("budget cannot be negative: '{0}'")]
    Negative(String),
    /// The amount was not a decimal number.
    #[error("invalid budget '{0}': expected an amount like 1500 or 1,250.50")]
    Invalid(String),
    /// More than two decimal places were given.
    #[error("invalid budget '{0}': at most two decimal places are allowed")]
    TooPrecise(String),
    /// The amount does not fit.
    #[error("budget '{0}' is too large")]
    Overflow(String),
}

impl FromStr for Budget {
    type Err = BudgetError;

    /// Parses amounts like `1500`, `1500.5`, `1,250.50` or `$99`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(BudgetError::Negative(s.to_string()));
        }
        let digits: String = trimmed
            .trim_start_matches('$')
            .chars()
            .filter(|&c| c != ',')
            .collect();

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        let is_numeric = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !is_numeric(whole)
            || !is_numeric(fraction)
        {
            return Err(BudgetError::Invalid(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(BudgetError::TooPrecise(s.to_string()));
        }

        let overflow = || BudgetError::Overflow(s.to_string());
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction: u64 = format!("{fraction:0<2}").parse().map_err(|_| overflow())?;

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Self::from_cents)
            .ok_or_else(overflow)
    }
}
