//! Fixed-point scaling
//!
//! Readings carry one decimal digit. They are multiplied by
//! [`SCALE_FACTOR`] and rounded before encryption, and the vault stores them
//! as 32-bit unsigned integers. Decrypted integers are divided back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier preserving one decimal digit.
pub const SCALE_FACTOR: u32 = 10;

/// Why a reading cannot be scaled.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ScalingError {
    /// NaN or infinite
    #[error("invalid value: not a finite number")]
    NotFinite,
    /// Below zero
    #[error("invalid value: {value} is negative")]
    Negative {
        /// Rejected input
        value: f64,
    },
    /// Scaled value does not fit in `u32`
    #[error("value too large: {value} exceeds the encrypted range")]
    TooLarge {
        /// Rejected input
        value: f64,
    },
}

/// A reading already multiplied by [`SCALE_FACTOR`] and range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaledValue(u32);

impl ScaledValue {
    /// Largest reading that survives scaling.
    pub const MAX_READING: f64 = u32::MAX as f64 / SCALE_FACTOR as f64;

    /// Scale a decimal reading, rounding to the nearest tenth.
    pub fn from_decimal(value: f64) -> Result<Self, ScalingError> {
        if !value.is_finite() {
            return Err(ScalingError::NotFinite);
        }
        if value < 0.0 {
            return Err(ScalingError::Negative { value });
        }
        let scaled = (value * f64::from(SCALE_FACTOR)).round();
        if scaled > f64::from(u32::MAX) {
            return Err(ScalingError::TooLarge { value });
        }
        // In range and non-negative, so the cast is exact.
        Ok(Self(scaled as u32))
    }

    /// Wrap an already scaled integer.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Scaled integer handed to the encryption engine.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Decimal view of this value.
    pub fn to_decimal(&self) -> f64 {
        f64::from(self.0) / f64::from(SCALE_FACTOR)
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / SCALE_FACTOR, self.0 % SCALE_FACTOR)
    }
}

/// Undo fixed-point scaling of a decrypted integer.
pub fn unscale(raw: u128) -> f64 {
    raw as f64 / f64::from(SCALE_FACTOR)
}
