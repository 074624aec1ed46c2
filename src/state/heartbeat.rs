// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heartbeat payload parsing.
//!
//! Units periodically push sensor readings as a JSON object of hex strings.
//! Each reading is one wire byte of the matching [`FcuState`] field.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FormatError;
use crate::types::{Domain, Field};

use super::FcuState;

/// Raw heartbeat payload.
///
/// Missing keys leave the corresponding field absent.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use toshiba_ac_lib::state::Heartbeat;
///
/// let heartbeat = Heartbeat::from_payload(&json!({"iTemp": "15", "cduFanRpm": "46"})).unwrap();
/// let state = heartbeat.to_state().unwrap();
///
/// assert_eq!(state.indoor_temperature.known().unwrap().value(), 21);
/// assert_eq!(state.fan_out_rpm.known().unwrap().rpm(), 700);
/// assert!(state.outdoor_temperature.is_unset());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Heartbeat {
    /// Indoor temperature.
    #[serde(rename = "iTemp")]
    pub indoor_temperature: Option<String>,
    /// Outdoor temperature.
    #[serde(rename = "oTemp")]
    pub outdoor_temperature: Option<String>,
    /// Indoor heat exchanger temperature.
    #[serde(rename = "fcuTcTemp")]
    pub heatexc_in_temperature: Option<String>,
    /// Indoor pipe temperature.
    #[serde(rename = "fcuTcjTemp")]
    pub pipe_in_temperature: Option<String>,
    /// Indoor fan speed.
    #[serde(rename = "fcuFanRpm")]
    pub fan_in_rpm: Option<String>,
    /// Compressor outlet temperature.
    #[serde(rename = "cduTdTemp")]
    pub comp_out_temperature: Option<String>,
    /// Compressor inlet temperature.
    #[serde(rename = "cduTsTemp")]
    pub comp_in_temperature: Option<String>,
    /// Outdoor heat exchanger temperature.
    #[serde(rename = "cduTeTemp")]
    pub heatexc_out_temperature: Option<String>,
    /// Compressor frequency.
    #[serde(rename = "cduCompHz")]
    pub comp_freq: Option<String>,
    /// Outdoor fan speed.
    #[serde(rename = "cduFanRpm")]
    pub fan_out_rpm: Option<String>,
    /// Expansion valve duty cycle.
    #[serde(rename = "cduPmvPulse")]
    pub pwm_valve_duty: Option<String>,
    /// Outdoor unit current.
    #[serde(rename = "cduIac")]
    pub iac: Option<String>,
}

impl Heartbeat {
    /// Parses a heartbeat from its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Json` if the payload is not an object of strings.
    pub fn from_payload(payload: &Value) -> Result<Self, FormatError> {
        Ok(Self::deserialize(payload)?)
    }

    /// Converts the readings into a partial state holding only telemetry.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidValue` if a reading is not a hex byte, or
    /// `FormatError::OutOfDomain` if the byte does not fit its field.
    pub fn to_state(&self) -> Result<FcuState, FormatError> {
        Ok(FcuState {
            indoor_temperature: parse_hex("ac_indoor_temperature", self.indoor_temperature.as_deref())?,
            outdoor_temperature: parse_hex("ac_outdoor_temperature", self.outdoor_temperature.as_deref())?,
            heatexc_in_temperature: parse_hex("ac_heatexc_in_temperature", self.heatexc_in_temperature.as_deref())?,
            pipe_in_temperature: parse_hex("ac_pipe_in_temperature", self.pipe_in_temperature.as_deref())?,
            fan_in_rpm: parse_hex("ac_fan_in_rpm", self.fan_in_rpm.as_deref())?,
            comp_out_temperature: parse_hex("ac_comp_out_temperature", self.comp_out_temperature.as_deref())?,
            comp_in_temperature: parse_hex("ac_comp_in_temperature", self.comp_in_temperature.as_deref())?,
            heatexc_out_temperature: parse_hex("ac_heatexc_out_temperature", self.heatexc_out_temperature.as_deref())?,
            comp_freq: parse_hex("ac_comp_freq", self.comp_freq.as_deref())?,
            fan_out_rpm: parse_hex("ac_fan_out_rpm", self.fan_out_rpm.as_deref())?,
            pwm_valve_duty: parse_hex("ac_pwm_valve_duty", self.pwm_valve_duty.as_deref())?,
            iac: parse_hex("ac_iac", self.iac.as_deref())?,
            ..FcuState::new()
        })
    }
}

fn parse_hex<T: Domain>(field: &'static str, hex: Option<&str>) -> Result<Field<T>, FormatError> {
    let Some(hex) = hex else {
        return Ok(Field::Unset);
    };
    let byte = u8::from_str_radix(hex.trim(), 16).map_err(|_| FormatError::InvalidValue {
        field: field.to_string(),
        value: hex.to_string(),
    })?;
    Field::from_byte(field, byte)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{NumberValue, Temperature};

    #[test]
    fn full_heartbeat_maps_every_key() {
        let payload = json!({
            "iTemp": "16", "oTemp": "fb", "fcuTcTemp": "20", "fcuTcjTemp": "1f",
            "fcuFanRpm": "5a", "cduTdTemp": "40", "cduTsTemp": "0a", "cduTeTemp": "7e",
            "cduCompHz": "3c", "cduFanRpm": "50", "cduPmvPulse": "7f", "cduIac": "07"
        });
        let state = Heartbeat::from_payload(&payload).unwrap().to_state().unwrap();

        assert_eq!(state.indoor_temperature, Field::Known(Temperature::new(22).unwrap()));
        assert_eq!(state.outdoor_temperature, Field::Known(Temperature::new(-5).unwrap()));
        assert_eq!(state.heatexc_out_temperature, Field::Known(Temperature::new(-1).unwrap()));
        assert_eq!(state.fan_in_rpm.known().unwrap().rpm(), 900);
        assert_eq!(state.comp_freq, Field::Known(NumberValue::new(60).unwrap()));
        assert_eq!(state.pwm_valve_duty, Field::Known(NumberValue::new(127).unwrap()));
        assert_eq!(state.iac, Field::Known(NumberValue::new(7).unwrap()));
        assert!(state.status.is_unset());
        assert!(state.mode.is_unset());
    }

    #[test]
    fn unknown_temperature_in_heartbeat() {
        let state = Heartbeat::from_payload(&json!({"iTemp": "7f"}))
            .unwrap()
            .to_state()
            .unwrap();
        assert_eq!(state.indoor_temperature, Field::Unknown);
    }

    #[test]
    fn empty_heartbeat_is_empty_state() {
        let state = Heartbeat::from_payload(&json!({})).unwrap().to_state().unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn non_hex_reading_fails() {
        let heartbeat = Heartbeat::from_payload(&json!({"cduIac": "zz"})).unwrap();
        let err = heartbeat.to_state().unwrap_err();
        assert!(matches!(err, FormatError::InvalidValue { ref field, .. } if field == "ac_iac"));
    }

    #[test]
    fn oversized_reading_fails() {
        let heartbeat = Heartbeat::from_payload(&json!({"cduCompHz": "1ff"})).unwrap();
        assert!(heartbeat.to_state().is_err());
    }

    #[test]
    fn non_string_payload_fails() {
        assert!(Heartbeat::from_payload(&json!({"iTemp": 21})).is_err());
        assert!(Heartbeat::from_payload(&json!("iTemp")).is_err());
    }
}
