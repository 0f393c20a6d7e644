//! Signed fixed-point decimal backed by a scaled `i128` mantissa.
//!
//! Products and quotients run through a 256-bit intermediate so that a
//! full-range token amount times a large exchange rate cannot wrap. All
//! truncation is toward zero; saturation stops at [`Number::MAX`], which
//! doubles as the "uncapped" sentinel used by the risk engine.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NumberError;

/// Decimals carried by the pool-internal family.
pub const WIDE_PRECISION: u32 = 15;

/// Decimals carried by the valuation family.
pub const STD_PRECISION: u32 = 10;

/// Pool-internal fixed point: reserves, exchange rates, interest rates.
pub type WideNumber = Number<WIDE_PRECISION>;

/// Valuation fixed point: position values, collateral, risk ratios.
pub type StdNumber = Number<STD_PRECISION>;

/// A signed decimal scaled by `10^PRECISION`.
///
/// Two values only interoperate when they share a precision; converting a
/// token amount between families is an explicit [`Number::rescale`].
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number<const PRECISION: u32>(i128);

impl<const PRECISION: u32> Number<PRECISION> {
    /// The scaled representation of 1.0.
    pub const ONE_RAW: i128 = 10i128.pow(PRECISION);

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::ONE_RAW);

    /// Largest representable value, used as the "uncapped" sentinel for
    /// claims with no leverage configured. Saturating arithmetic keeps the
    /// sentinel stable through downstream sums and comparisons.
    pub const MAX: Self = Self(i128::MAX);

    /// Smallest representable value; negative saturation stops here.
    pub const MIN: Self = Self(i128::MIN);

    /// Builds a value directly from a raw mantissa at this precision.
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// The raw mantissa.
    pub const fn into_raw(self) -> i128 {
        self.0
    }

    /// Rescales `value * 10^exponent` into this precision, truncating toward
    /// zero when digits are dropped and saturating when they cannot fit.
    pub fn from_decimal(value: impl Into<i128>, exponent: i32) -> Self {
        let value = value.into();
        if value == 0 {
            return Self::ZERO;
        }

        let extra = PRECISION as i32 + exponent;
        if extra < 0 {
            match 10i128.checked_pow(extra.unsigned_abs()) {
                Some(divisor) => Self(value / divisor),
                None => Self::ZERO,
            }
        } else {
            10i128
                .checked_pow(extra as u32)
                .and_then(|factor| value.checked_mul(factor))
                .map(Self)
                .unwrap_or_else(|| Self::saturated(value < 0))
        }
    }

    /// Converts a basis-point quantity (1 bp = 0.0001).
    pub fn from_bps(bps: u16) -> Self {
        Self::from_decimal(bps as i128, -4)
    }

    /// Converts to this value's representation at another precision,
    /// truncating toward zero when narrowing.
    ///
    /// The saturation sentinels mean the same thing in every family, so
    /// [`Self::MAX`] and [`Self::MIN`] map to the target's sentinels
    /// instead of being rescaled as ordinary magnitudes.
    pub fn rescale<const TARGET: u32>(self) -> Number<TARGET> {
        if self.0 == i128::MAX || self.0 == i128::MIN {
            return Number::<TARGET>(self.0);
        }
        if TARGET >= PRECISION {
            let factor = 10i128.pow(TARGET - PRECISION);
            Number::<TARGET>(self.0.saturating_mul(factor))
        } else {
            let divisor = 10i128.pow(PRECISION - TARGET);
            Number::<TARGET>(self.0 / divisor)
        }
    }

    /// Truncating conversion to integer units of `10^exponent`.
    pub fn as_u64(&self, exponent: i32) -> Result<u64, NumberError> {
        self.to_unsigned_units(exponent, Bias::Truncate)
    }

    /// Like [`Self::as_u64`] but adds half a unit before truncating.
    pub fn as_u64_rounded(&self, exponent: i32) -> Result<u64, NumberError> {
        self.to_unsigned_units(exponent, Bias::HalfUp)
    }

    /// Like [`Self::as_u64`] but rounds away from zero.
    pub fn as_u64_ceil(&self, exponent: i32) -> Result<u64, NumberError> {
        self.to_unsigned_units(exponent, Bias::Ceil)
    }

    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Saturating subtraction clamped at zero.
    pub fn saturating_sub_floor(self, other: Self) -> Self {
        (self - other).max(Self::ZERO)
    }

    fn to_unsigned_units(&self, exponent: i32, bias: Bias) -> Result<u64, NumberError> {
        if self.0 < 0 {
            return Err(NumberError::Negative);
        }

        let extra = PRECISION as i32 + exponent;
        let units = if extra <= 0 {
            // Scaling up: the requested unit is finer than our precision.
            let factor = 10i128
                .checked_pow(extra.unsigned_abs())
                .ok_or(NumberError::Overflow)?;
            self.0.checked_mul(factor).ok_or(NumberError::Overflow)?
        } else {
            match 10i128.checked_pow(extra as u32) {
                // The divisor exceeds any i128 magnitude, so the quotient is
                // zero save for a ceil of a nonzero value.
                None => match bias {
                    Bias::Ceil if self.0 > 0 => 1,
                    _ => 0,
                },
                Some(divisor) => {
                    let adjust = match bias {
                        Bias::Truncate => 0,
                        Bias::HalfUp => divisor / 2,
                        Bias::Ceil => divisor - 1,
                    };
                    self.0.checked_add(adjust).ok_or(NumberError::Overflow)? / divisor
                }
            }
        };

        u64::try_from(units).map_err(|_| NumberError::Overflow)
    }

    fn saturated(negative: bool) -> Self {
        if negative {
            Self::MIN
        } else {
            Self::MAX
        }
    }

    fn from_sign_magnitude(negative: bool, magnitude: U256) -> Self {
        if magnitude > U256::from(i128::MAX as u128) {
            return Self::saturated(negative);
        }
        let magnitude = magnitude.to::<u128>() as i128;
        Self(if negative { -magnitude } else { magnitude })
    }
}

impl WideNumber {
    /// Narrows into the valuation family, truncating toward zero.
    pub fn to_std(self) -> StdNumber {
        self.rescale::<STD_PRECISION>()
    }
}

impl StdNumber {
    /// Widens into the pool-math family.
    pub fn to_wide(self) -> WideNumber {
        self.rescale::<WIDE_PRECISION>()
    }
}

#[derive(Clone, Copy)]
enum Bias {
    Truncate,
    HalfUp,
    Ceil,
}

impl<const PRECISION: u32> From<u64> for Number<PRECISION> {
    fn from(value: u64) -> Self {
        Self::from_decimal(value, 0)
    }
}

impl<const PRECISION: u32> From<i64> for Number<PRECISION> {
    fn from(value: i64) -> Self {
        Self::from_decimal(value, 0)
    }
}

impl<const PRECISION: u32> Add for Number<PRECISION> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl<const PRECISION: u32> Sub for Number<PRECISION> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl<const PRECISION: u32> AddAssign for Number<PRECISION> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const PRECISION: u32> SubAssign for Number<PRECISION> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const PRECISION: u32> Mul for Number<PRECISION> {
    type Output = Self;

    /// `(a.raw * b.raw) / 10^P`, truncating toward zero. The product is
    /// taken at 256 bits so no representable operands can wrap.
    fn mul(self, rhs: Self) -> Self {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let product = U256::from(self.0.unsigned_abs()) * U256::from(rhs.0.unsigned_abs());
        let scaled = product / U256::from(Self::ONE_RAW.unsigned_abs());
        Self::from_sign_magnitude(negative, scaled)
    }
}

impl<const PRECISION: u32> Div for Number<PRECISION> {
    type Output = Self;

    /// `(a.raw * 10^P) / b.raw`, truncating toward zero.
    ///
    /// Dividing by zero panics, as with primitive integers; every call site
    /// in the client floors a degenerate pool or rejects a zero rate before
    /// dividing.
    fn div(self, rhs: Self) -> Self {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let numerator = U256::from(self.0.unsigned_abs()) * U256::from(Self::ONE_RAW.unsigned_abs());
        let quotient = numerator / U256::from(rhs.0.unsigned_abs());
        Self::from_sign_magnitude(negative, quotient)
    }
}

impl<const PRECISION: u32> Neg for Number<PRECISION> {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.checked_neg().unwrap_or(i128::MAX))
    }
}

impl<const PRECISION: u32> fmt::Display for Number<PRECISION> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / Self::ONE_RAW;
        let frac = (self.0 % Self::ONE_RAW).unsigned_abs();
        let sign = if self.0 < 0 && int == 0 { "-" } else { "" };

        if frac == 0 {
            return write!(f, "{sign}{int}.0");
        }

        let mut digits = format!("{:0width$}", frac, width = PRECISION as usize);
        while digits.len() > 1 && digits.ends_with('0') {
            digits.pop();
        }
        write!(f, "{sign}{int}.{digits}")
    }
}

impl<const PRECISION: u32> fmt::Debug for Number<PRECISION> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<const PRECISION: u32> FromStr for Number<PRECISION> {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, NumberError> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(NumberError::Malformed);
        }

        let mut raw: i128 = 0;
        if !int_part.is_empty() {
            let units: i128 = int_part.parse().map_err(|_| NumberError::Malformed)?;
            raw = units.checked_mul(Self::ONE_RAW).ok_or(NumberError::Overflow)?;
        }

        // Digits past our precision are truncated, matching from_decimal.
        let frac_digits = &frac_part[..frac_part.len().min(PRECISION as usize)];
        if !frac_digits.is_empty() {
            if !frac_digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NumberError::Malformed);
            }
            let frac: i128 = frac_digits.parse().map_err(|_| NumberError::Malformed)?;
            let scale = 10i128.pow(PRECISION - frac_digits.len() as u32);
            raw = raw
                .checked_add(frac * scale)
                .ok_or(NumberError::Overflow)?;
        }

        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl<const PRECISION: u32> Serialize for Number<PRECISION> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const PRECISION: u32> Deserialize<'de> for Number<PRECISION> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
