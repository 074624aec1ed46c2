// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature readings and setpoints.

use std::fmt;

use serde_json::Value;

use crate::error::ValueError;

use super::Domain;

/// A temperature in whole degrees Celsius as carried by the state packet.
///
/// The byte encoding is irregular:
///
/// | Byte          | Reading          |
/// |---------------|------------------|
/// | `0x00..=0x7D` | `0..=125`        |
/// | `0x7E`        | `-1`             |
/// | `0x7F`        | indeterminate    |
/// | `0x80..=0xFE` | `-128..=-2`      |
/// | `0xFF`        | absent           |
///
/// `0x7E` would be `126` under the positive rule; the `-1` mapping takes
/// precedence, so `126` and `127` are not representable.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::types::Temperature;
///
/// let t = Temperature::new(21).unwrap();
/// assert_eq!(t.value(), 21);
///
/// assert!(Temperature::new(126).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(i16);

impl Temperature {
    /// Lowest representable reading.
    pub const MIN: i16 = -128;

    /// Highest representable reading.
    pub const MAX: i16 = 125;

    /// Creates a new temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside [-128, 125].
    pub fn new(value: i16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: i32::from(Self::MIN),
                max: i32::from(Self::MAX),
                actual: i32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the reading in degrees Celsius.
    #[must_use]
    pub const fn value(&self) -> i16 {
        self.0
    }
}

impl Domain for Temperature {
    const DOMAIN: &'static str = "temperature";
    const UNKNOWN_BYTE: Option<u8> = Some(0x7F);

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00..=0x7D => Some(Self(i16::from(byte))),
            0x7E => Some(Self(-1)),
            0x80..=0xFE => Some(Self(i16::from(byte) - 256)),
            0x7F | 0xFF => None,
        }
    }

    // The constructor guarantees the value is in [-128, 125].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_byte(self) -> u8 {
        match self.0 {
            -1 => 0x7E,
            v if v < 0 => (v + 256) as u8,
            v => v as u8,
        }
    }

    fn from_symbol(name: &str) -> Option<Self> {
        name.trim().parse().ok().and_then(|v| Self::new(v).ok())
    }

    fn report(self) -> Value {
        Value::from(self.0)
    }

    fn from_reported(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .and_then(|n| i16::try_from(n).ok())
                .and_then(|n| Self::new(n).ok()),
            Value::String(s) => Self::from_symbol(s),
            _ => None,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i16> for Temperature {
    type Error = ValueError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn positive_range_decodes_identically() {
        assert_eq!(Temperature::from_byte(0x00), Some(Temperature(0)));
        assert_eq!(Temperature::from_byte(0x14), Some(Temperature(20)));
        assert_eq!(Temperature::from_byte(0x7D), Some(Temperature(125)));
    }

    #[test]
    fn byte_7e_is_minus_one() {
        assert_eq!(Temperature::from_byte(0x7E), Some(Temperature(-1)));
        assert_eq!(Temperature(-1).to_byte(), 0x7E);
    }

    #[test]
    fn byte_7f_is_unknown() {
        let field = Field::<Temperature>::from_byte("t", 0x7F).unwrap();
        assert_eq!(field, Field::Unknown);
    }

    #[test]
    fn negative_range_wraps() {
        assert_eq!(Temperature::from_byte(0x80), Some(Temperature(-128)));
        assert_eq!(Temperature::from_byte(0xFE), Some(Temperature(-2)));
        assert_eq!(Temperature(-2).to_byte(), 0xFE);
        assert_eq!(Temperature(-128).to_byte(), 0x80);
    }

    #[test]
    fn every_byte_round_trips() {
        for byte in (0x00..=0xFE).filter(|&b| b != 0x7F) {
            let t = Temperature::from_byte(byte).unwrap();
            assert_eq!(t.to_byte(), byte, "byte 0x{byte:02x}");
        }
    }

    #[test]
    fn new_rejects_unrepresentable_values() {
        assert!(Temperature::new(126).is_err());
        assert!(Temperature::new(127).is_err());
        assert!(Temperature::new(-129).is_err());
        assert!(Temperature::new(-1).is_ok());
    }

    #[test]
    fn reports_magnitude() {
        assert_eq!(Temperature(-5).report(), Value::from(-5));
        assert_eq!(
            Temperature::from_reported(&Value::from(-5)),
            Some(Temperature(-5))
        );
        assert_eq!(
            Temperature::from_reported(&Value::from("22")),
            Some(Temperature(22))
        );
    }
}
