// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain numeric fields: counters, frequencies, duty cycles and fan speeds.

use std::fmt;

use serde_json::Value;

use crate::error::ValueError;

use super::Domain;

/// Largest raw value of a numeric field (`0xFE` and `0xFF` are not numbers).
const MAX_RAW: u8 = 253;

/// A plain numeric reading in the range 0-253.
///
/// Used for timer hours/minutes, clock fields, compressor frequency, valve
/// duty cycle and current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumberValue(u8);

impl NumberValue {
    /// Creates a new numeric value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is above 253.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > MAX_RAW {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i32::from(MAX_RAW),
                actual: i32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Domain for NumberValue {
    const DOMAIN: &'static str = "number";

    fn from_byte(byte: u8) -> Option<Self> {
        (byte <= MAX_RAW).then_some(Self(byte))
    }

    fn to_byte(self) -> u8 {
        self.0
    }

    fn from_symbol(name: &str) -> Option<Self> {
        name.trim().parse().ok().and_then(|v| Self::new(v).ok())
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fan speed reported in steps of 10 rpm.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::types::Rpm;
///
/// let rpm = Rpm::from_rpm(1200).unwrap();
/// assert_eq!(rpm.rpm(), 1200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rpm(u8);

impl Rpm {
    /// Creates a fan speed from revolutions per minute.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the speed is not a multiple of 10
    /// in the range 0-2530.
    pub fn from_rpm(rpm: u16) -> Result<Self, ValueError> {
        let out_of_range = || ValueError::OutOfRange {
            min: 0,
            max: i32::from(MAX_RAW) * 10,
            actual: i32::from(rpm),
        };
        if rpm % 10 != 0 {
            return Err(out_of_range());
        }
        u8::try_from(rpm / 10)
            .ok()
            .filter(|&raw| raw <= MAX_RAW)
            .map(Self)
            .ok_or_else(out_of_range)
    }

    /// Returns the speed in revolutions per minute.
    #[must_use]
    pub fn rpm(&self) -> u16 {
        u16::from(self.0) * 10
    }
}

impl Domain for Rpm {
    const DOMAIN: &'static str = "rpm";

    fn from_byte(byte: u8) -> Option<Self> {
        (byte <= MAX_RAW).then_some(Self(byte))
    }

    fn to_byte(self) -> u8 {
        self.0
    }

    fn from_symbol(name: &str) -> Option<Self> {
        name.trim().parse().ok().and_then(|v| Self::from_rpm(v).ok())
    }

    fn report(self) -> Value {
        Value::from(self.rpm())
    }

    fn from_reported(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .and_then(|n| Self::from_rpm(n).ok()),
            Value::String(s) => Self::from_symbol(s),
            _ => None,
        }
    }
}

impl fmt::Display for Rpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rpm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_domain_stops_at_253() {
        assert_eq!(NumberValue::from_byte(253), Some(NumberValue(253)));
        assert_eq!(NumberValue::from_byte(254), None);
        assert!(NumberValue::new(254).is_err());
    }

    #[test]
    fn rpm_scales_by_ten() {
        let rpm = Rpm::from_byte(0x78).unwrap();
        assert_eq!(rpm.rpm(), 1200);
        assert_eq!(rpm.report(), Value::from(1200));
    }

    #[test]
    fn rpm_rejects_non_multiples_of_ten() {
        assert!(Rpm::from_rpm(1205).is_err());
        assert!(Rpm::from_rpm(2540).is_err());
        assert_eq!(Rpm::from_rpm(2530).unwrap().to_byte(), 253);
    }

    #[test]
    fn number_reports_raw_value() {
        assert_eq!(NumberValue(42).report(), Value::from(42));
        assert_eq!(
            NumberValue::from_reported(&Value::from(42)),
            Some(NumberValue(42))
        );
    }
}
