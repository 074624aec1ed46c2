// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities derived from firmware metadata.
//!
//! The cloud reports a merit feature byte (as a hex string) and a model id
//! for every unit. Together they determine which merit A/B features the unit
//! accepts and whether it has an air purifier.
//!
//! # Merit feature byte
//!
//! Bits are read most significant first:
//!
//! | Bit | Feature                                  |
//! |-----|------------------------------------------|
//! | 7   | Floor heating                            |
//! | 5   | Outdoor unit silent (levels 1 and 2)     |
//! | 4   | Air purifier                             |
//! | 3   | Fireplace (levels 1 and 2)               |
//! | 2   | 8 °C frost protection heating            |
//!
//! Model id `"1"` is the baseline model: it only supports the `OFF` features
//! whatever the byte says. A byte that cannot be parsed is treated the same.

use crate::error::CapabilityError;
use crate::state::FcuState;
use crate::types::{AcMeritAFeature, AcMeritBFeature, Field};

const FLOOR: u8 = 0b1000_0000;
const CDU_SILENT: u8 = 0b0010_0000;
const PURE_ION: u8 = 0b0001_0000;
const FIREPLACE: u8 = 0b0000_1000;
const HEATING_8C: u8 = 0b0000_0100;

/// Features supported by a unit.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::Capabilities;
/// use toshiba_ac_lib::types::AcMeritAFeature;
///
/// let caps = Capabilities::from_merit_feature("8c", "3");
/// assert!(caps.supports_merit_a(AcMeritAFeature::Floor));
/// assert!(caps.supports_merit_a(AcMeritAFeature::Heating8C));
/// assert!(!caps.supports_merit_a(AcMeritAFeature::CduSilent1));
///
/// let legacy = Capabilities::from_merit_feature("ff", "1");
/// assert_eq!(legacy.merit_a_features(), &[AcMeritAFeature::Off]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    merit_a: Vec<AcMeritAFeature>,
    merit_b: Vec<AcMeritBFeature>,
    pure_ion: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::baseline()
    }
}

impl Capabilities {
    /// Capabilities of the baseline model: only the `OFF` features.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            merit_a: vec![AcMeritAFeature::Off],
            merit_b: vec![AcMeritBFeature::Off],
            pure_ion: false,
        }
    }

    /// Derives capabilities from the merit feature hex string and model id.
    ///
    /// Only the first byte of `merit_feature` is used.
    #[must_use]
    pub fn from_merit_feature(merit_feature: &str, model_id: &str) -> Self {
        let merit_byte = merit_feature
            .get(..2)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        let Some(merit_byte) = merit_byte.filter(|_| model_id != "1") else {
            return Self::baseline();
        };

        let mut caps = Self::baseline();
        caps.merit_a
            .extend([AcMeritAFeature::HighPower, AcMeritAFeature::Eco]);

        if merit_byte & FLOOR != 0 {
            caps.merit_a.push(AcMeritAFeature::Floor);
        }
        if merit_byte & CDU_SILENT != 0 {
            caps.merit_a
                .extend([AcMeritAFeature::CduSilent1, AcMeritAFeature::CduSilent2]);
        }
        if merit_byte & FIREPLACE != 0 {
            caps.merit_b
                .extend([AcMeritBFeature::Fireplace1, AcMeritBFeature::Fireplace2]);
        }
        if merit_byte & HEATING_8C != 0 {
            caps.merit_a.push(AcMeritAFeature::Heating8C);
        }
        caps.pure_ion = merit_byte & PURE_ION != 0;

        caps
    }

    /// Supported merit A features, `OFF` first.
    #[must_use]
    pub fn merit_a_features(&self) -> &[AcMeritAFeature] {
        &self.merit_a
    }

    /// Supported merit B features, `OFF` first.
    #[must_use]
    pub fn merit_b_features(&self) -> &[AcMeritBFeature] {
        &self.merit_b
    }

    /// Returns whether the merit A feature is supported.
    #[must_use]
    pub fn supports_merit_a(&self, feature: AcMeritAFeature) -> bool {
        self.merit_a.contains(&feature)
    }

    /// Returns whether the merit B feature is supported.
    #[must_use]
    pub fn supports_merit_b(&self, feature: AcMeritBFeature) -> bool {
        self.merit_b.contains(&feature)
    }

    /// Returns whether the unit has an air purifier.
    #[must_use]
    pub const fn supports_pure_ion(&self) -> bool {
        self.pure_ion
    }

    /// Checks a requested partial state against the supported features.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` if the request sets an unsupported merit
    /// feature, or sets the air purifier on a unit without one.
    pub fn check(&self, requested: &FcuState) -> Result<(), CapabilityError> {
        if let Field::Known(feature) = requested.merit_a_feature
            && !self.supports_merit_a(feature)
        {
            return Err(CapabilityError::MeritA(feature.to_string()));
        }
        if let Field::Known(feature) = requested.merit_b_feature
            && !self.supports_merit_b(feature)
        {
            return Err(CapabilityError::MeritB(feature.to_string()));
        }
        if !requested.air_pure_ion.is_unset() && !self.pure_ion {
            return Err(CapabilityError::PureIon);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcAirPureIon;

    #[test]
    fn baseline_model_ignores_merit_byte() {
        let caps = Capabilities::from_merit_feature("ff", "1");
        assert_eq!(caps, Capabilities::baseline());
        assert!(!caps.supports_pure_ion());
    }

    #[test]
    fn unparsable_merit_byte_is_baseline() {
        assert_eq!(Capabilities::from_merit_feature("", "3"), Capabilities::baseline());
        assert_eq!(Capabilities::from_merit_feature("z1", "3"), Capabilities::baseline());
        assert_eq!(Capabilities::from_merit_feature("8", "3"), Capabilities::baseline());
    }

    #[test]
    fn zero_byte_on_newer_model_adds_high_power_and_eco() {
        let caps = Capabilities::from_merit_feature("00", "2");
        assert_eq!(
            caps.merit_a_features(),
            &[
                AcMeritAFeature::Off,
                AcMeritAFeature::HighPower,
                AcMeritAFeature::Eco
            ]
        );
        assert_eq!(caps.merit_b_features(), &[AcMeritBFeature::Off]);
    }

    #[test]
    fn every_flag_set() {
        let caps = Capabilities::from_merit_feature("ff00", "2");
        assert_eq!(
            caps.merit_a_features(),
            &[
                AcMeritAFeature::Off,
                AcMeritAFeature::HighPower,
                AcMeritAFeature::Eco,
                AcMeritAFeature::Floor,
                AcMeritAFeature::CduSilent1,
                AcMeritAFeature::CduSilent2,
                AcMeritAFeature::Heating8C,
            ]
        );
        assert!(caps.supports_merit_b(AcMeritBFeature::Fireplace2));
        assert!(caps.supports_pure_ion());
        assert!(!caps.supports_merit_a(AcMeritAFeature::SleepCare));
    }

    #[test]
    fn single_flags() {
        assert!(Capabilities::from_merit_feature("10", "2").supports_pure_ion());
        assert!(
            Capabilities::from_merit_feature("08", "2").supports_merit_b(AcMeritBFeature::Fireplace1)
        );
        assert!(
            !Capabilities::from_merit_feature("40", "2").supports_merit_a(AcMeritAFeature::Floor)
        );
    }

    #[test]
    fn check_rejects_unsupported_features() {
        let caps = Capabilities::baseline();

        let mut request = FcuState::new();
        request.merit_a_feature = Field::Known(AcMeritAFeature::Eco);
        assert_eq!(
            caps.check(&request),
            Err(CapabilityError::MeritA("ECO".to_string()))
        );

        let mut request = FcuState::new();
        request.merit_b_feature = Field::Known(AcMeritBFeature::Fireplace1);
        assert!(matches!(caps.check(&request), Err(CapabilityError::MeritB(_))));

        let mut request = FcuState::new();
        request.air_pure_ion = Field::Known(AcAirPureIon::Off);
        assert_eq!(caps.check(&request), Err(CapabilityError::PureIon));
    }

    #[test]
    fn check_accepts_off_and_absent() {
        let caps = Capabilities::baseline();
        let mut request = FcuState::new();
        assert!(caps.check(&request).is_ok());

        request.merit_a_feature = Field::Known(AcMeritAFeature::Off);
        request.merit_b_feature = Field::Known(AcMeritBFeature::Off);
        assert!(caps.check(&request).is_ok());
    }
}
