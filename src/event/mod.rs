// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events passed to device subscribers.
//!
//! Each [`Device`](crate::Device) owns one
//! [`CallbackRegistry`](crate::subscription::CallbackRegistry) per event type:
//!
//! - [`StateChangedEvent`] - after a merge changed at least one field
//! - [`EnergyConsumptionChangedEvent`] - aggregate consumption changed
//! - [`PowerChangedEvent`] - a new power estimate was computed

mod device_event;

pub use device_event::{EnergyConsumptionChangedEvent, PowerChangedEvent, StateChangedEvent};
