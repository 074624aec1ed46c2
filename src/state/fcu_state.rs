// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The indoor unit state record and its field table.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::FormatError;
use crate::types::{
    AcAirPureIon, AcError, AcFanMode, AcLed, AcMeritAFeature, AcMeritBFeature, AcMode,
    AcPowerSelection, AcScheduler, AcSelfCleaning, AcStatus, AcSwingMode, AcTimerMode, Domain,
    Field, NumberValue, Rpm, Temperature,
};

/// How a field is carried in the status/command packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One byte, two hex digits.
    Byte,
    /// Low nibble only, one hex digit; `f` stands for the absent sentinel.
    Nibble,
    /// Never encoded; only filled from heartbeats.
    Telemetry,
}

/// Static description of one state field.
///
/// The merge, codec and report routines iterate [`FcuState::FIELDS`] instead
/// of naming every field, so adding a field only means adding a table row.
pub struct FieldSpec {
    /// Key used in reports (`ac_status`, `ac_temperature`, ...).
    pub key: &'static str,
    /// Human readable label used in logs.
    pub label: &'static str,
    /// Wire encoding.
    pub encoding: Encoding,
    pub(crate) to_byte: fn(&FcuState) -> Result<u8, FormatError>,
    pub(crate) from_byte: fn(&mut FcuState, u8) -> Result<(), FormatError>,
    pub(crate) merge: fn(&mut FcuState, &FcuState, &mut FcuState) -> Option<(String, String)>,
    pub(crate) report: fn(&FcuState) -> Option<Value>,
    pub(crate) set_reported: fn(&mut FcuState, &Value) -> Result<(), FormatError>,
    pub(crate) display: fn(&FcuState) -> String,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("key", &self.key)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

macro_rules! fcu_state {
    ( $( $(#[$doc:meta])* $field:ident: $ty:ty => $key:literal, $label:literal, $encoding:ident; )+ ) => {
        /// State of one indoor unit.
        ///
        /// Every field starts as [`Field::Unset`]. A state decoded from a
        /// packet only has the fields the packet carried; a partial state
        /// built for a command only has the fields being changed.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct FcuState {
            $( $(#[$doc])* pub $field: Field<$ty>, )+
        }

        impl FcuState {
            /// Field table, command/status fields first in wire order.
            pub const FIELDS: &'static [FieldSpec] = &[
                $(
                    FieldSpec {
                        key: $key,
                        label: $label,
                        encoding: Encoding::$encoding,
                        to_byte: |s| s.$field.to_byte($key),
                        from_byte: |s, byte| {
                            s.$field = Field::from_byte($key, byte)?;
                            Ok(())
                        },
                        merge: |s, incoming, delta| {
                            let old = s.$field;
                            if s.$field.merge(incoming.$field) {
                                delta.$field = s.$field;
                                Some((old.to_string(), s.$field.to_string()))
                            } else {
                                None
                            }
                        },
                        report: |s| s.$field.report(),
                        set_reported: |s, value| {
                            let parsed = <$ty as Domain>::from_reported(value).ok_or_else(|| {
                                FormatError::InvalidValue {
                                    field: $key.to_string(),
                                    value: value.to_string(),
                                }
                            })?;
                            s.$field = Field::Known(parsed);
                            Ok(())
                        },
                        display: |s| s.$field.to_string(),
                    },
                )+
            ];
        }
    };
}

fcu_state! {
    /// Run status.
    status: AcStatus => "ac_status", "Status", Byte;
    /// Operating mode.
    mode: AcMode => "ac_mode", "Mode", Byte;
    /// Setpoint as stored by the unit (see [`crate::Device::effective_temperature`]).
    temperature: Temperature => "ac_temperature", "Setpoint temperature", Byte;
    /// Indoor fan speed.
    fan_mode: AcFanMode => "ac_fan_mode", "Fan mode", Byte;
    /// Louver swing.
    swing_mode: AcSwingMode => "ac_swing_mode", "Swing mode", Byte;
    /// Outdoor unit power limit.
    power_selection: AcPowerSelection => "ac_power_selection", "Power selection", Byte;
    /// Merit B feature.
    merit_b_feature: AcMeritBFeature => "ac_merit_b_feature", "Merit B", Nibble;
    /// Merit A feature.
    merit_a_feature: AcMeritAFeature => "ac_merit_a_feature", "Merit A", Nibble;
    /// Air purifier.
    air_pure_ion: AcAirPureIon => "ac_air_pure_ion", "Pure Ion", Byte;
    /// Indoor temperature.
    indoor_temperature: Temperature => "ac_indoor_temperature", "Indoor temperature", Byte;
    /// Outdoor temperature.
    outdoor_temperature: Temperature => "ac_outdoor_temperature", "Outdoor temperature", Byte;
    /// Error code.
    error: AcError => "ac_error", "Error", Byte;
    /// Timer mode.
    timer_mode: AcTimerMode => "ac_timer_mode", "Timer mode", Byte;
    /// Timer hours.
    relative_hours: NumberValue => "ac_relative_hours", "Relative hours", Byte;
    /// Timer minutes.
    relative_minutes: NumberValue => "ac_relative_minutes", "Relative minutes", Byte;
    /// Self cleaning cycle.
    self_cleaning: AcSelfCleaning => "ac_self_cleaning", "Self cleaning", Byte;
    /// Indoor unit LED.
    led: AcLed => "ac_led", "LED mode", Byte;
    /// Weekly scheduler.
    scheduler: AcScheduler => "ac_scheduler", "Scheduler", Byte;
    /// Clock hours (UTC).
    utc_hours: NumberValue => "ac_utc_hours", "UTC hours", Byte;
    /// Clock minutes (UTC).
    utc_minutes: NumberValue => "ac_utc_minutes", "UTC minutes", Byte;
    /// Indoor heat exchanger temperature.
    heatexc_in_temperature: Temperature => "ac_heatexc_in_temperature", "Indoor heat exchanger temperature", Telemetry;
    /// Indoor pipe temperature.
    pipe_in_temperature: Temperature => "ac_pipe_in_temperature", "Indoor pipe temperature", Telemetry;
    /// Indoor fan speed.
    fan_in_rpm: Rpm => "ac_fan_in_rpm", "Indoor fan RPM", Telemetry;
    /// Compressor outlet temperature.
    comp_out_temperature: Temperature => "ac_comp_out_temperature", "Compressor outlet temperature", Telemetry;
    /// Compressor inlet temperature.
    comp_in_temperature: Temperature => "ac_comp_in_temperature", "Compressor inlet temperature", Telemetry;
    /// Outdoor heat exchanger temperature.
    heatexc_out_temperature: Temperature => "ac_heatexc_out_temperature", "Outdoor heat exchanger temperature", Telemetry;
    /// Compressor frequency.
    comp_freq: NumberValue => "ac_comp_freq", "Compressor frequency", Telemetry;
    /// Outdoor fan speed.
    fan_out_rpm: Rpm => "ac_fan_out_rpm", "Outdoor fan RPM", Telemetry;
    /// Expansion valve PWM duty cycle.
    pwm_valve_duty: NumberValue => "ac_pwm_valve_duty", "Valve PWM duty cycle", Telemetry;
    /// Outdoor unit current.
    iac: NumberValue => "ac_iac", "IAC", Telemetry;
}

impl FcuState {
    /// Creates a state with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if every field is absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Looks up a field description by report key.
    #[must_use]
    pub fn field(key: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|spec| spec.key == key)
    }

    /// Projects the state for external reporting.
    ///
    /// Only fields that are neither absent nor indeterminate are included.
    /// Temperatures and fan speeds are reported as their reading, every other
    /// field as its raw byte value.
    ///
    /// # Examples
    ///
    /// ```
    /// use toshiba_ac_lib::state::FcuState;
    /// use toshiba_ac_lib::types::{AcMode, Field, Temperature};
    ///
    /// let mut state = FcuState::new();
    /// state.mode = Field::Known(AcMode::Heat);
    /// state.temperature = Field::Known(Temperature::new(-3).unwrap());
    /// state.indoor_temperature = Field::Unknown;
    ///
    /// let report = state.to_report();
    /// assert_eq!(report["ac_mode"], 0x43);
    /// assert_eq!(report["ac_temperature"], -3);
    /// assert!(!report.contains_key("ac_indoor_temperature"));
    /// ```
    #[must_use]
    pub fn to_report(&self) -> Map<String, Value> {
        Self::FIELDS
            .iter()
            .filter_map(|spec| (spec.report)(self).map(|value| (spec.key.to_string(), value)))
            .collect()
    }

    /// Builds a state from a report-shaped JSON object.
    ///
    /// Values may be given as in [`FcuState::to_report`] or as symbol names
    /// (`"HEAT"`). The `name` key is ignored and unknown keys are skipped.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidValue` if a value does not fit its field.
    pub fn from_report(report: &Map<String, Value>) -> Result<Self, FormatError> {
        let mut state = Self::new();
        for (key, value) in report {
            if key == "name" {
                continue;
            }
            match Self::field(key) {
                Some(spec) => (spec.set_reported)(&mut state, value)?,
                None => tracing::warn!(field = %key, "Skipping non-existing field"),
            }
        }
        Ok(state)
    }

    /// Parses a report-shaped JSON string.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the JSON is malformed, not an object, or a
    /// value does not fit its field.
    pub fn from_report_json(json: &str) -> Result<Self, FormatError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Self::from_report(&map),
            other => Err(FormatError::InvalidValue {
                field: "report".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FcuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in Self::FIELDS.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", spec.label, (spec.display)(self))?;
        }
        Ok(())
    }
}
