// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hex codec for the status/command packet.
//!
//! The packet carries the first 20 fields of [`FcuState`], one byte each, as
//! lowercase hex. The two merit feature fields only use their low nibble and
//! are packed into one hex digit each, so the packet is 38 characters long
//! instead of 40.
//!
//! A packed digit of `f` stands for the absent byte `0xFF`; any other digit
//! `d` stands for `0x0d`.
//!
//! # Examples
//!
//! ```
//! use toshiba_ac_lib::state::FcuState;
//! use toshiba_ac_lib::types::{AcMode, Field};
//!
//! let state = FcuState::decode("304314323164001012161604ffffffffffffff").unwrap();
//! assert_eq!(state.mode, Field::Known(AcMode::Heat));
//! assert_eq!(state.encode().unwrap(), "304314323164001012161604ffffffffffffff");
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::FormatError;

use super::{Encoding, FcuState};

/// Length of an encoded packet in hex characters.
pub const WIRE_LENGTH: usize = 38;

impl FcuState {
    /// Encodes the status/command fields into the packet hex string.
    ///
    /// Absent fields encode as `ff` (or `f` for the packed merit fields),
    /// heartbeat-only fields are not encoded.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Unencodable` if an indeterminate value has no
    /// wire representation in its domain.
    pub fn encode(&self) -> Result<String, FormatError> {
        let mut out = String::with_capacity(WIRE_LENGTH);
        // Writing to a String cannot fail.
        for spec in Self::FIELDS {
            match spec.encoding {
                Encoding::Byte => {
                    let _ = write!(out, "{:02x}", (spec.to_byte)(self)?);
                }
                Encoding::Nibble => {
                    let _ = write!(out, "{:x}", (spec.to_byte)(self)? & 0x0F);
                }
                Encoding::Telemetry => {}
            }
        }
        Ok(out)
    }

    /// Decodes a packet hex string.
    ///
    /// Upper and lower case digits are accepted. Heartbeat-only fields are
    /// left absent.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidLength` if the string is not 38
    /// characters, `FormatError::InvalidHex` on a non-hex character and
    /// `FormatError::OutOfDomain` if a byte does not belong to its field.
    pub fn decode(wire: &str) -> Result<Self, FormatError> {
        let digits = parse_digits(wire)?;
        let mut state = Self::new();
        let mut cursor = 0;

        for spec in Self::FIELDS {
            let byte = match spec.encoding {
                Encoding::Byte => {
                    let byte = (digits[cursor] << 4) | digits[cursor + 1];
                    cursor += 2;
                    byte
                }
                Encoding::Nibble => {
                    let nibble = digits[cursor];
                    cursor += 1;
                    if nibble == 0x0F { 0xFF } else { nibble }
                }
                Encoding::Telemetry => continue,
            };
            (spec.from_byte)(&mut state, byte)?;
        }

        Ok(state)
    }
}

impl FromStr for FcuState {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

fn parse_digits(wire: &str) -> Result<Vec<u8>, FormatError> {
    let count = wire.chars().count();
    if count != WIRE_LENGTH {
        return Err(FormatError::InvalidLength {
            expected: WIRE_LENGTH,
            actual: count,
        });
    }

    wire.chars()
        .enumerate()
        .map(|(position, character)| {
            character
                .to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(FormatError::InvalidHex {
                    character,
                    position,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AcAirPureIon, AcError, AcFanMode, AcLed, AcMeritAFeature, AcMeritBFeature, AcMode,
        AcPowerSelection, AcScheduler, AcSelfCleaning, AcStatus, AcSwingMode, AcTimerMode, Field,
        NumberValue, Temperature,
    };

    const ALL_NONE: &str = "ffffffffffffffffffffffffffffffffffffff";

    fn full_state() -> FcuState {
        let mut state = FcuState::new();
        state.status = Field::Known(AcStatus::On);
        state.mode = Field::Known(AcMode::Heat);
        state.temperature = Field::Known(Temperature::new(20).unwrap());
        state.fan_mode = Field::Known(AcFanMode::Auto);
        state.swing_mode = Field::Known(AcSwingMode::Fixed1);
        state.power_selection = Field::Known(AcPowerSelection::Power100);
        state.merit_b_feature = Field::Known(AcMeritBFeature::Off);
        state.merit_a_feature = Field::Known(AcMeritAFeature::Heating8C);
        state.air_pure_ion = Field::Known(AcAirPureIon::Off);
        state.indoor_temperature = Field::Known(Temperature::new(18).unwrap());
        state.outdoor_temperature = Field::Known(Temperature::new(-1).unwrap());
        state.error = Field::Known(AcError::Ok);
        state.timer_mode = Field::Known(AcTimerMode::Off);
        state.relative_hours = Field::Known(NumberValue::new(0).unwrap());
        state.relative_minutes = Field::Known(NumberValue::new(30).unwrap());
        state.self_cleaning = Field::Known(AcSelfCleaning::Off);
        state.led = Field::Known(AcLed::On);
        state.scheduler = Field::Known(AcScheduler::Off);
        state.utc_hours = Field::Known(NumberValue::new(13).unwrap());
        state.utc_minutes = Field::Known(NumberValue::new(5).unwrap());
        state
    }

    #[test]
    fn empty_state_encodes_as_all_f() {
        assert_eq!(FcuState::new().encode().unwrap(), ALL_NONE);
        assert_eq!(FcuState::decode(ALL_NONE).unwrap(), FcuState::new());
    }

    #[test]
    fn full_state_layout() {
        let wire = full_state().encode().unwrap();
        assert_eq!(wire.len(), WIRE_LENGTH);
        assert_eq!(&wire[..12], "304314415064");
        // merit B, merit A
        assert_eq!(&wire[12..14], "04");
        assert_eq!(&wire[14..], "10127efe01001e1001020d05");
        assert_eq!(FcuState::decode(&wire).unwrap(), full_state());
    }

    #[test]
    fn single_field_encoding() {
        let mut state = FcuState::new();
        state.mode = Field::Known(AcMode::Cool);
        assert_eq!(
            state.encode().unwrap(),
            "ff42ffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn nibble_f_decodes_as_absent() {
        let mut wire = String::from(ALL_NONE);
        wire.replace_range(12..14, "f3");
        let state = FcuState::decode(&wire).unwrap();
        assert!(state.merit_b_feature.is_unset());
        assert_eq!(state.merit_a_feature, Field::Known(AcMeritAFeature::Eco));
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let wire = full_state().encode().unwrap().to_uppercase();
        assert_eq!(wire.parse::<FcuState>().unwrap(), full_state());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = FcuState::decode("ffff").unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidLength {
                expected: 38,
                actual: 4
            }
        ));
        assert!(FcuState::decode(&format!("{ALL_NONE}ff")).is_err());
    }

    #[test]
    fn non_hex_is_rejected() {
        let mut wire = String::from(ALL_NONE);
        wire.replace_range(5..6, "g");
        let err = FcuState::decode(&wire).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidHex {
                character: 'g',
                position: 5
            }
        ));
    }

    #[test]
    fn out_of_domain_byte_is_rejected() {
        let mut wire = String::from(ALL_NONE);
        wire.replace_range(0..2, "99");
        let err = FcuState::decode(&wire).unwrap_err();
        assert!(matches!(
            err,
            FormatError::OutOfDomain {
                field: "ac_status",
                byte: 0x99
            }
        ));
    }

    #[test]
    fn unknown_temperature_round_trips() {
        let mut wire = String::from(ALL_NONE);
        wire.replace_range(4..6, "7f");
        let state = FcuState::decode(&wire).unwrap();
        assert_eq!(state.temperature, Field::Unknown);
        assert_eq!(state.encode().unwrap(), wire);
    }

    /// Every wire field with its hex offset and every byte its digits can carry.
    fn wire_cases() -> Vec<(&'static str, String)> {
        let mut cases = Vec::new();
        let mut offset = 0;
        for spec in FcuState::FIELDS {
            let (width, bytes): (usize, Vec<u8>) = match spec.encoding {
                Encoding::Byte => (2, (0..=u8::MAX).collect()),
                Encoding::Nibble => (1, (0..=0x0F).collect()),
                Encoding::Telemetry => continue,
            };
            for byte in bytes {
                let mut wire = String::from(ALL_NONE);
                let digits = if width == 2 {
                    format!("{byte:02x}")
                } else {
                    format!("{byte:x}")
                };
                wire.replace_range(offset..offset + width, &digits);
                cases.push((spec.key, wire));
            }
            offset += width;
        }
        assert_eq!(offset, WIRE_LENGTH);
        cases
    }

    #[test]
    fn every_decodable_byte_round_trips() {
        let mut decoded = 0;
        for (key, wire) in wire_cases() {
            let Ok(state) = FcuState::decode(&wire) else {
                continue;
            };
            decoded += 1;
            assert_eq!(state.encode().unwrap(), wire, "{key}");
            assert_eq!(FcuState::decode(&state.encode().unwrap()).unwrap(), state, "{key}");
        }
        assert!(decoded > 20);
    }

    #[test]
    fn merging_a_reencoded_state_changes_nothing() {
        for (key, wire) in wire_cases() {
            let Ok(mut state) = FcuState::decode(&wire) else {
                continue;
            };
            let echoed = FcuState::decode(&state.encode().unwrap()).unwrap();
            assert!(state.merge(&echoed).is_none(), "{key}");
        }
    }

    #[test]
    fn telemetry_fields_are_not_encoded() {
        let mut state = FcuState::new();
        state.comp_freq = Field::Known(NumberValue::new(60).unwrap());
        assert_eq!(state.encode().unwrap(), ALL_NONE);
    }
}
