// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data returned by the cloud HTTP service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit registered on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// User-facing name.
    pub name: String,
    /// Internal id, used for HTTP state polls.
    pub ac_id: String,
    /// Unit id, used for routing messages.
    pub ac_unique_id: String,
    /// Encoded state at discovery time.
    pub initial_ac_state: String,
    /// Firmware version.
    pub firmware_version: String,
    /// Merit feature descriptor (hex; the first byte holds the capability flags).
    pub merit_feature: String,
    /// Model id (`"1"` is the baseline model).
    pub ac_model_id: String,
}

/// Aggregate energy consumption of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyConsumption {
    /// Energy in watt-hours.
    pub energy_wh: f64,
    /// Start of the accounting period.
    pub since: DateTime<Utc>,
}

/// Energy report for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnergyReport {
    /// Aggregate consumption (requested with `total = true`).
    Total(EnergyConsumption),
    /// Energy per local hour of one day, in watt-hours, index 0 = midnight.
    Hourly(Vec<f64>),
}

impl EnergyReport {
    /// Returns the aggregate consumption, if this is a total report.
    #[must_use]
    pub fn total(&self) -> Option<EnergyConsumption> {
        match self {
            Self::Total(consumption) => Some(*consumption),
            Self::Hourly(_) => None,
        }
    }

    /// Returns the hourly buckets, if this is an hourly report.
    #[must_use]
    pub fn hourly(&self) -> Option<&[f64]> {
        match self {
            Self::Total(_) => None,
            Self::Hourly(buckets) => Some(buckets),
        }
    }
}
