// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the air conditioner state.
//!
//! Each state field holds a [`Field`] over a value domain. Domains validate
//! their byte encoding at decode time and their range at construction time,
//! so a state built through this crate always encodes.
//!
//! # Types
//!
//! - [`Field`] - Known value, absent (`NONE`) or indeterminate (`UNKNOWN`)
//! - [`Temperature`] - Setpoints and sensor temperatures (-128..=125 °C)
//! - [`NumberValue`] - Plain numeric fields (0-253)
//! - [`Rpm`] - Fan speeds in steps of 10 rpm
//! - [`AcStatus`], [`AcMode`], [`AcFanMode`], ... - Enumerated fields

mod field;
mod modes;
mod number;
mod temperature;

pub use field::{Domain, Field, NONE_BYTE};
pub use modes::{
    AcAirPureIon, AcError, AcFanMode, AcLed, AcMeritAFeature, AcMeritBFeature, AcMode,
    AcPowerSelection, AcScheduler, AcSelfCleaning, AcStatus, AcSwingMode, AcTimerMode,
};
pub use number::{NumberValue, Rpm};
pub use temperature::Temperature;
