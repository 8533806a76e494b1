//! Amount type for handling monetary values.
//!
//! `Amount` wraps `Decimal` and remembers how it should be written back out. Amounts read from the
//! ledger file are plain decimals (`50.00`, `53.5`, and even float artifacts like
//! `0.30000000000000004` or `1e-05`), while amounts shown to a person default to `$1,234.50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `-60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a dollar sign is present in the formatting.
    dollar: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DISPLAY_FORMAT
    }
}

/// The format used for showing amounts to a person: e.g. `-$60,000.00`.
const DISPLAY_FORMAT: AmountFormat = AmountFormat {
    dollar: true,
    commas: true,
};

/// The format used in the ledger file: e.g. `-60000.00`.
const PLAIN_FORMAT: AmountFormat = AmountFormat {
    dollar: false,
    commas: false,
};

/// Plain amounts are written with at least this many decimal places.
const MIN_PLAIN_SCALE: u32 = 2;

/// Represents an amount of money in the ledger's single unit.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use allowance_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,050.5").unwrap();
/// assert_eq!(amount.to_string(), "-$1,050.50");
/// assert_eq!(amount.plain().to_string(), "-1050.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value with display formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DISPLAY_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the plain formatting used for storage.
    pub const fn new_plain(value: Decimal) -> Self {
        Self {
            value,
            format: PLAIN_FORMAT,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns a copy of this amount that formats without a dollar sign or commas.
    pub fn plain(&self) -> Self {
        Self::new_plain(self.value)
    }

    /// Returns a copy of this amount that formats like `$1,234.50`.
    pub fn display(&self) -> Self {
        Self::new(self.value)
    }

    /// Adds two amounts, returning `None` on overflow. The result uses the plain format.
    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.value
            .checked_add(other.value)
            .map(Amount::new_plain)
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountError(String);

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dollar_sign = false;
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError(String::from("An amount cannot be empty")));
        }

        // Remove dollar sign if present
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            if let Some(after_dollar) = after_minus.strip_prefix('$') {
                dollar_sign = true;
                format!("-{after_dollar}")
            } else {
                trimmed.to_string()
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            dollar_sign = true;
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        // Remove commas (thousand separators)
        let without_commas = without_dollar.replace(',', "");
        let commas = without_commas.len() < without_dollar.len();

        // Older ledgers hold float text like 1e-05, which Decimal::from_str rejects.
        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|e| AmountError(format!("Invalid amount '{trimmed}': {e}")))?;

        Ok(Amount {
            value,
            format: AmountFormat {
                dollar: dollar_sign,
                commas,
            },
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let dol = if self.format.dollar { "$" } else { "" };

        if self.format.commas {
            // The sign follows the rounded cents, so -0.001 shows as $0.00.
            let rounded = self.value().round_dp(2);
            let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
                "-"
            } else {
                ""
            };
            write!(
                f,
                "{sign}{dol}{}",
                format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default())
            )
        } else {
            let sign = if self.is_negative() { "-" } else { "" };
            let mut num = self.value().abs();
            // Padding the scale never loses precision, it only adds trailing zeros.
            if num.scale() < MIN_PLAIN_SCALE {
                num.rescale(MIN_PLAIN_SCALE);
            }
            write!(f, "{sign}{dol}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
