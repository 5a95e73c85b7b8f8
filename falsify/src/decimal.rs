//! Fixed-scale decimal numbers for decimal arbitraries.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Largest supported number of decimal places
pub const MAX_SCALE: u32 = 18;

/// A decimal number `unscaled * 10^-scale`
///
/// Equality and ordering are numeric: `1.5` equals `1.50`.
#[derive(Clone, Copy)]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

impl Decimal {
    /// Create a decimal from its unscaled value and scale
    pub fn new(unscaled: i128, scale: u32) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(Error::invalid_range(format!(
                "decimal scale {} exceeds maximum of {}",
                scale, MAX_SCALE
            )));
        }
        Ok(Self { unscaled, scale })
    }

    /// An integral decimal
    pub fn from_integer(value: i64) -> Self {
        Self {
            unscaled: value as i128,
            scale: 0,
        }
    }

    pub(crate) fn from_parts(unscaled: i128, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    /// The unscaled value
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Number of decimal places
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The same number with `scale` decimal places, if no digits are lost and it fits
    pub fn rescale(&self, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE {
            return None;
        }
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(*self),
            Ordering::Greater => self
                .unscaled
                .checked_mul(pow10(scale - self.scale))
                .map(|unscaled| Self { unscaled, scale }),
            Ordering::Less => {
                let divisor = pow10(self.scale - scale);
                (self.unscaled % divisor == 0).then(|| Self {
                    unscaled: self.unscaled / divisor,
                    scale,
                })
            }
        }
    }

    /// The same number rounded towards zero to `scale` decimal places
    pub fn truncate(&self, scale: u32) -> Self {
        if scale >= self.scale {
            return *self;
        }
        Self {
            unscaled: self.unscaled / pow10(self.scale - scale),
            scale,
        }
    }

    /// The same number without trailing fractional zeros
    pub fn normalized(&self) -> Self {
        let mut normalized = *self;
        while normalized.scale > 0 && normalized.unscaled % 10 == 0 {
            normalized.unscaled /= 10;
            normalized.scale -= 1;
        }
        normalized
    }

    /// Whether this decimal is negative
    pub fn is_negative(&self) -> bool {
        self.unscaled < 0
    }

    fn integral_part(&self) -> i128 {
        self.unscaled / pow10(self.scale)
    }

    fn fractional_part(&self) -> i128 {
        self.unscaled % pow10(self.scale)
    }
}

pub(crate) fn pow10(exponent: u32) -> i128 {
    10i128.pow(exponent)
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        // truncation keeps integral and fractional parts on the same side of zero
        let scale = self.scale.max(other.scale);
        let own_fraction = self.fractional_part() * pow10(scale - self.scale);
        let other_fraction = other.fractional_part() * pow10(scale - other.scale);
        self.integral_part()
            .cmp(&other.integral_part())
            .then(own_fraction.cmp(&other_fraction))
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalized();
        normalized.unscaled.hash(state);
        normalized.scale.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let integral = self.integral_part().unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{}{}", sign, integral);
        }
        let fraction = self.fractional_part().unsigned_abs();
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            integral,
            fraction,
            width = self.scale as usize
        )
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::invalid_range(format!("not a decimal number: {:?}", text));
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (integral, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if integral.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integral.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let scale = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        let joined = format!("{}{}", integral, fraction);
        let magnitude: i128 = joined.parse().map_err(|_| invalid())?;
        Decimal::new(if negative { -magnitude } else { magnitude }, scale)
    }
}
