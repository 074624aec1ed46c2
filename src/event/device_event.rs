// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use serde_json::{Map, Value};

use crate::protocol::EnergyConsumption;
use crate::state::FcuState;

/// A device's state changed.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::event::StateChangedEvent;
/// use toshiba_ac_lib::state::FcuState;
/// use toshiba_ac_lib::types::{AcStatus, Field};
///
/// let mut delta = FcuState::new();
/// delta.status = Field::Known(AcStatus::On);
///
/// let event = StateChangedEvent {
///     ac_unique_id: "unit-1".to_string(),
///     name: "Office".to_string(),
///     state: delta,
///     delta,
/// };
///
/// let report = event.report();
/// assert_eq!(report.len(), 1);
/// assert_eq!(report["ac_status"], 0x30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangedEvent {
    /// Unit id of the device.
    pub ac_unique_id: String,
    /// Name of the device.
    pub name: String,
    /// Full state after the change.
    pub state: FcuState,
    /// Fields that changed.
    pub delta: FcuState,
}

impl StateChangedEvent {
    /// Projection of the delta for external reporting.
    #[must_use]
    pub fn report(&self) -> Map<String, Value> {
        self.delta.to_report()
    }
}

/// A device's aggregate energy consumption changed.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyConsumptionChangedEvent {
    /// Unit id of the device.
    pub ac_unique_id: String,
    /// Name of the device.
    pub name: String,
    /// New consumption.
    pub consumption: EnergyConsumption,
}

/// A device's estimated power draw was updated.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerChangedEvent {
    /// Unit id of the device.
    pub ac_unique_id: String,
    /// Name of the device.
    pub name: String,
    /// Estimated power in watts.
    pub power_w: f64,
}
