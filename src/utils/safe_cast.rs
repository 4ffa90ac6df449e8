//! Safe casting utilities for pixel and screen coordinates

use crate::{Error, Result};

/// Truncate toward zero, saturating at the i32 bounds; NaN maps to 0
#[must_use]
#[allow(clippy::cast_possible_truncation)] // `as` saturates for floats
pub fn f64_to_i32_trunc(value: f64) -> i32 {
    value.trunc() as i32
}

/// Clamp an i32 screen coordinate into i16 range for the X11 protocol
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn i32_to_i16_clamp(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Safely convert an i32 dimension to u32
///
/// # Errors
///
/// Returns an error if the value is negative
pub fn i32_to_u32(value: i32) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} cannot be a dimension")))
}
