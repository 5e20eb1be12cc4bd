//! Money Conversion Module
//!
//! Unified conversion between the internal integer representation and the
//! client-facing string representation. All conversions MUST go through this
//! module.
//!
//! ## Internal Representation
//! - Amounts are stored as `i64` minor units (paise, scale 10^2)
//! - Balances are never negative; transfer amounts are strictly positive
//! - Parsing goes through `rust_decimal` so "0.1" is exact
//!
//! ## Usage
//! ```rust
//! use mockupi_wallet::money::Amount;
//!
//! let amount = Amount::parse("1.5").unwrap();
//! assert_eq!(amount.minor_units(), 150);
//! assert_eq!(amount.to_string(), "1.50");
//! ```

use rust_decimal::prelude::*;
use std::fmt;
use thiserror::Error;

/// Fractional digits carried by every amount (INR paise)
pub const DECIMALS: u32 = 2;

/// Currency code embedded in payment URLs
pub const CURRENCY: &str = "INR";

/// Currency symbol used in user-facing messages
pub const CURRENCY_SYMBOL: &str = "₹";

const SCALE: i64 = 100;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount must be positive")]
    NotPositive,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount too large, would overflow")]
    Overflow,
}

// ============================================================================
// Amount
// ============================================================================

/// Exact amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw minor-unit value read from storage.
    pub const fn from_minor_units(value: i64) -> Self {
        Self(value)
    }

    /// Whole-rupee constructor.
    pub const fn from_major_units(value: i64) -> Self {
        Self(value * SCALE)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Parse a client-supplied transfer amount.
    ///
    /// Checks run in this order so callers can report the first failure:
    /// 1. the string is a decimal number (`InvalidFormat`)
    /// 2. the value is strictly positive (`NotPositive`)
    /// 3. no more than [`DECIMALS`] significant fractional digits (`PrecisionOverflow`)
    /// 4. the scaled value fits in `i64` (`Overflow`)
    ///
    /// Input is never rounded: a string `Decimal` cannot hold exactly is
    /// classified from its digits instead.
    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }

        match Decimal::from_str_exact(raw) {
            Ok(decimal) => Self::from_decimal(decimal),
            Err(_) => Self::parse_inexact(raw),
        }
    }

    fn from_decimal(decimal: Decimal) -> Result<Self, MoneyError> {
        if decimal <= Decimal::ZERO {
            return Err(MoneyError::NotPositive);
        }

        // "1.500" is fine, "1.505" is not
        let normalized = decimal.normalize();
        if normalized.scale() > DECIMALS {
            return Err(MoneyError::PrecisionOverflow {
                provided: normalized.scale(),
                max: DECIMALS,
            });
        }

        let scaled = normalized
            .checked_mul(Decimal::from(SCALE))
            .ok_or(MoneyError::Overflow)?;
        scaled.to_i64().map(Self).ok_or(MoneyError::Overflow)
    }

    /// `raw` has more digits than `Decimal` holds exactly (or is garbage)
    fn parse_inexact(raw: &str) -> Result<Self, MoneyError> {
        let invalid = || MoneyError::InvalidFormat(format!("not a number: {}", raw));

        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((i, f)) if !f.is_empty() => (i, f),
            Some(_) => return Err(invalid()),
            None => (unsigned, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if integer.is_empty() || !all_digits(integer) || !all_digits(fraction) {
            return Err(invalid());
        }

        let is_zero = integer.bytes().chain(fraction.bytes()).all(|b| b == b'0');
        if negative || is_zero {
            return Err(MoneyError::NotPositive);
        }

        let significant = fraction.trim_end_matches('0');
        if significant.len() > DECIMALS as usize {
            return Err(MoneyError::PrecisionOverflow {
                provided: significant.len() as u32,
                max: DECIMALS,
            });
        }

        // Only trailing zeros or integer digits were too many; retry without
        // the zeros and anything still unrepresentable is too large
        let integer = match integer.trim_start_matches('0') {
            "" => "0",
            i => i,
        };
        let compact = if significant.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, significant)
        };
        match Decimal::from_str_exact(&compact) {
            Ok(decimal) => Self::from_decimal(decimal),
            Err(_) => Err(MoneyError::Overflow),
        }
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, DECIMALS)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.to_decimal(), prec = DECIMALS as usize)
    }
}

/// Stored columns hold minor units
impl From<i64> for Amount {
    fn from(minor_units: i64) -> Self {
        Self::from_minor_units(minor_units)
    }
}
