// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging partial states into the authoritative one.

use super::FcuState;

impl FcuState {
    /// Merges `incoming` into `self` field by field.
    ///
    /// A field is replaced when the incoming value is present and differs
    /// from the current one. Absent incoming fields never overwrite.
    ///
    /// Returns the delta (only the replaced fields, every other field
    /// absent), or `None` if nothing changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use toshiba_ac_lib::state::FcuState;
    /// use toshiba_ac_lib::types::{AcMode, AcStatus, Field};
    ///
    /// let mut current = FcuState::new();
    /// current.status = Field::Known(AcStatus::On);
    ///
    /// let mut incoming = FcuState::new();
    /// incoming.status = Field::Known(AcStatus::On);
    /// incoming.mode = Field::Known(AcMode::Cool);
    ///
    /// let delta = current.merge(&incoming).unwrap();
    /// assert!(delta.status.is_unset());
    /// assert_eq!(delta.mode, Field::Known(AcMode::Cool));
    /// assert_eq!(current.mode, Field::Known(AcMode::Cool));
    ///
    /// assert!(current.merge(&incoming).is_none());
    /// ```
    pub fn merge(&mut self, incoming: &FcuState) -> Option<FcuState> {
        let mut delta = FcuState::new();
        let mut changed = false;

        for spec in Self::FIELDS {
            if let Some((old, new)) = (spec.merge)(self, incoming, &mut delta) {
                tracing::info!(field = spec.key, %old, %new, "{} changed", spec.label);
                changed = true;
            }
        }

        changed.then_some(delta)
    }

    /// Returns a copy of `self` with `overlay` merged on top.
    #[must_use]
    pub fn overlaid(&self, overlay: &FcuState) -> FcuState {
        let mut future = *self;
        let mut scratch = FcuState::new();
        for spec in Self::FIELDS {
            let _ = (spec.merge)(&mut future, overlay, &mut scratch);
        }
        future
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{AcFanMode, AcMode, AcStatus, Field, Rpm, Temperature};

    use super::*;

    #[test]
    fn merge_into_empty_state_reports_every_present_field() {
        let mut current = FcuState::new();
        let mut incoming = FcuState::new();
        incoming.status = Field::Known(AcStatus::On);
        incoming.temperature = Field::Known(Temperature::new(22).unwrap());

        let delta = current.merge(&incoming).unwrap();
        assert_eq!(delta, incoming);
        assert_eq!(current, incoming);
    }

    #[test]
    fn merge_with_empty_incoming_is_no_change() {
        let mut current = FcuState::new();
        current.mode = Field::Known(AcMode::Heat);
        let before = current;

        assert!(current.merge(&FcuState::new()).is_none());
        assert_eq!(current, before);
    }

    #[test]
    fn absent_field_never_overwrites_any_value() {
        for spec in FcuState::FIELDS {
            for byte in 0..=u8::MAX {
                let mut current = FcuState::new();
                if (spec.from_byte)(&mut current, byte).is_err() {
                    continue;
                }
                let before = current;

                assert!(current.merge(&FcuState::new()).is_none(), "{} {byte:#04x}", spec.key);
                assert_eq!(current, before, "{} {byte:#04x}", spec.key);
            }
        }
    }

    #[test]
    fn present_field_is_taken_and_reported_once() {
        for spec in FcuState::FIELDS {
            for byte in 0..0xFF {
                let mut incoming = FcuState::new();
                if (spec.from_byte)(&mut incoming, byte).is_err() {
                    continue;
                }

                let mut current = FcuState::new();
                assert_eq!(current.merge(&incoming), Some(incoming), "{} {byte:#04x}", spec.key);
                assert!(current.merge(&incoming).is_none(), "{} {byte:#04x}", spec.key);
            }
        }
    }

    #[test]
    fn unknown_replaces_known_value() {
        let mut current = FcuState::new();
        current.indoor_temperature = Field::Known(Temperature::new(19).unwrap());

        let mut incoming = FcuState::new();
        incoming.indoor_temperature = Field::Unknown;

        let delta = current.merge(&incoming).unwrap();
        assert_eq!(delta.indoor_temperature, Field::Unknown);
        assert_eq!(current.indoor_temperature, Field::Unknown);
    }

    #[test]
    fn delta_only_contains_changed_fields() {
        let mut current = FcuState::new();
        current.fan_mode = Field::Known(AcFanMode::Auto);
        current.fan_in_rpm = Field::Known(Rpm::from_rpm(600).unwrap());

        let mut incoming = current;
        incoming.fan_in_rpm = Field::Known(Rpm::from_rpm(900).unwrap());

        let delta = current.merge(&incoming).unwrap();
        assert!(delta.fan_mode.is_unset());
        assert_eq!(delta.fan_in_rpm, Field::Known(Rpm::from_rpm(900).unwrap()));
    }

    #[test]
    fn overlaid_leaves_original_untouched() {
        let mut current = FcuState::new();
        current.mode = Field::Known(AcMode::Cool);

        let mut overlay = FcuState::new();
        overlay.mode = Field::Known(AcMode::Heat);
        overlay.status = Field::Known(AcStatus::On);

        let future = current.overlaid(&overlay);
        assert_eq!(future.mode, Field::Known(AcMode::Heat));
        assert_eq!(future.status, Field::Known(AcStatus::On));
        assert_eq!(current.mode, Field::Known(AcMode::Cool));
    }
}
