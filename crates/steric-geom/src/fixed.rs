// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decimal fixed-point scalar used for every coordinate component.
//!
//! The representation is an `i64` storing an integer scaled by `10^9`:
//! `real_value = raw / 10^9`. Decimal strings with up to nine fractional
//! digits map onto it exactly, which is what the molecular input formats
//! need; values coming from `f64` are truncated to three decimal places on
//! the way in.
//!
//! Determinism contract:
//! - Addition, subtraction and negation saturate instead of wrapping.
//! - Multiplication truncates toward zero at the `10^-9` boundary.
//! - Equality, ordering and hashing are by exact raw value.

use core::fmt;
use core::ops::{Add, Neg, Sub};
use core::str::FromStr;

use thiserror::Error;

/// Number of fractional decimal digits carried by [`Fixed`].
pub const FRAC_DIGITS: u32 = 9;

/// The raw integer value corresponding to `1.0`.
pub(crate) const SCALE: i64 = 1_000_000_000;

/// Decimal places kept when converting from floating point.
pub const FLOAT_DECIMAL_PLACES: u32 = 3;

const FLOAT_STEP: i64 = 1_000;
const FLOAT_TO_RAW: i64 = SCALE / FLOAT_STEP;

/// Largest accepted magnitude (exclusive) for the integer part.
const MAX_WHOLE: i64 = 1_000_000_000;

/// Errors produced while building a [`Fixed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedError {
    /// Input string had no digits.
    #[error("empty decimal literal")]
    Empty,
    /// Input string contained something other than sign, digits and one dot.
    #[error("invalid decimal literal {0:?}")]
    Invalid(String),
    /// More fractional digits than the representation can hold exactly.
    #[error("decimal literal {literal:?} has more than {max} fractional digits")]
    TooPrecise {
        /// Offending literal.
        literal: String,
        /// Supported fractional digits.
        max: u32,
    },
    /// Magnitude outside the supported range.
    #[error("decimal value {0} is out of range")]
    OutOfRange(String),
    /// NaN or infinite floating input.
    #[error("non-finite floating value {0}")]
    NonFinite(String),
}

/// Fixed-point decimal with nine fractional digits.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed {
    raw: i64,
}

impl Fixed {
    /// The fixed-point zero value.
    pub const ZERO: Self = Self { raw: 0 };

    /// The fixed-point one value.
    pub const ONE: Self = Self { raw: SCALE };

    /// Constructs a value from its raw scaled integer.
    ///
    /// This is an exact conversion: `raw` is interpreted as `raw / 10^9`.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    /// Returns the underlying raw storage value.
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Builds a value from a whole number, saturating at the representable range.
    #[must_use]
    pub fn from_int(value: i64) -> Self {
        Self::from_raw(saturate_i128_to_i64(i128::from(value) * i128::from(SCALE)))
    }

    /// Converts a floating value, keeping three decimal places.
    ///
    /// The value is floored at the third decimal (`floor(v * 1000) / 1000`),
    /// so `1.2349` becomes `1.234` and `-1.2341` becomes `-1.235`.
    pub fn from_f64_truncated(value: f64) -> Result<Self, FixedError> {
        if !value.is_finite() {
            return Err(FixedError::NonFinite(value.to_string()));
        }
        #[allow(clippy::cast_precision_loss)]
        let limit = MAX_WHOLE as f64;
        if value.abs() >= limit {
            return Err(FixedError::OutOfRange(value.to_string()));
        }
        // |value| < 1e9 so the scaled value fits comfortably in i64.
        #[allow(clippy::cast_possible_truncation)]
        let steps = (value * 1_000.0).floor() as i64;
        Ok(Self::from_raw(steps * FLOAT_TO_RAW))
    }

    /// Converts to `f64` for interop and the final distance step.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        let whole = self.raw / SCALE;
        let frac = self.raw % SCALE;
        whole as f64 + frac as f64 / 1e9
    }

    /// Returns `true` when the value is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.raw > 0
    }

    /// Floor of `self / rhs` as a whole number; `rhs` must be positive.
    ///
    /// Returns `None` when `rhs` is not positive.
    #[must_use]
    pub fn div_floor(self, rhs: Self) -> Option<i64> {
        if !rhs.is_positive() {
            return None;
        }
        Some(self.raw.div_euclid(rhs.raw))
    }

    /// Ceiling of `self / rhs` as a whole number; `rhs` must be positive.
    ///
    /// Returns `None` when `rhs` is not positive.
    #[must_use]
    pub fn div_ceil(self, rhs: Self) -> Option<i64> {
        if !rhs.is_positive() {
            return None;
        }
        let num = i128::from(self.raw);
        let den = i128::from(rhs.raw);
        let q = -((-num).div_euclid(den));
        Some(saturate_i128_to_i64(q))
    }

    /// Product truncated toward zero at the last fractional digit.
    #[must_use]
    pub fn mul_trunc(self, rhs: Self) -> Self {
        let prod = i128::from(self.raw) * i128::from(rhs.raw);
        Self::from_raw(saturate_i128_to_i64(prod / i128::from(SCALE)))
    }
}

pub(crate) fn saturate_i128_to_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or_else(|_| {
        if value.is_negative() {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

impl Add for Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_add(rhs.raw))
    }
}

impl Sub for Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_sub(rhs.raw))
    }
}

impl Neg for Fixed {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_raw(self.raw.checked_neg().unwrap_or(i64::MAX))
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let literal = s.trim();
        let (negative, body) = match literal.as_bytes().first() {
            Some(b'-') => (true, &literal[1..]),
            Some(b'+') => (false, &literal[1..]),
            Some(_) => (false, literal),
            None => return Err(FixedError::Empty),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(FixedError::Empty);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(FixedError::Invalid(literal.to_owned()));
        }
        let frac_len = u32::try_from(frac.len()).unwrap_or(u32::MAX);
        if frac_len > FRAC_DIGITS {
            return Err(FixedError::TooPrecise {
                literal: literal.to_owned(),
                max: FRAC_DIGITS,
            });
        }

        let whole_value = whole.trim_start_matches('0');
        if whole_value.len() > 9 {
            return Err(FixedError::OutOfRange(literal.to_owned()));
        }
        let whole_value: i64 = if whole_value.is_empty() {
            0
        } else {
            whole_value
                .parse()
                .map_err(|_| FixedError::Invalid(literal.to_owned()))?
        };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            let digits: i64 = frac
                .parse()
                .map_err(|_| FixedError::Invalid(literal.to_owned()))?;
            digits * 10_i64.pow(FRAC_DIGITS - frac_len)
        };

        let magnitude = whole_value * SCALE + frac_value;
        Ok(Self::from_raw(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw < 0 { "-" } else { "" };
        let abs = self.raw.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        let whole = abs / scale;
        let frac = abs % scale;
        let digits = format!("{frac:09}");
        let trimmed = digits.trim_end_matches('0');
        if trimmed.is_empty() {
            write!(f, "{sign}{whole}.0")
        } else {
            write!(f, "{sign}{whole}.{trimmed}")
        }
    }
}
