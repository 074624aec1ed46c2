// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single indoor unit.
//!
//! A [`Device`] owns the authoritative state of one unit, merges state
//! reports and heartbeats into it, and turns setter calls into state
//! commands sent over the [`MessageBus`].
//!
//! # Commands
//!
//! Setters build a partial state holding only the requested field. Before it
//! is sent, [`Device::compose_command`] applies the unit's rules:
//!
//! - Unsupported merit features and the air purifier on units without one
//!   are rejected and nothing is sent.
//! - In `HEAT` mode with the 8 °C protection feature the unit stores setpoints
//!   16 degrees higher, so requested setpoints are shifted up.
//! - Outside `HEAT` mode merit B is switched off, and so is merit A when it
//!   is a heating-only feature.
//! - Turning the unit on while a self cleaning cycle runs also clears the
//!   cycle.
//!
//! # Examples
//!
//! ```no_run
//! use toshiba_ac_lib::Device;
//! use toshiba_ac_lib::protocol::MessageBus;
//! use toshiba_ac_lib::types::AcMode;
//!
//! # async fn example<B: MessageBus>(device: &Device<B>) -> toshiba_ac_lib::Result<()> {
//! device.set_mode(AcMode::Heat).await?;
//! device.set_temperature(21).await?;
//!
//! if let Some(setpoint) = device.effective_temperature() {
//!     println!("{}: {setpoint} °C", device.name());
//! }
//! # Ok(())
//! # }
//! ```

mod power;

pub use power::PowerEstimator;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::capabilities::Capabilities;
use crate::error::Result;
use crate::event::{EnergyConsumptionChangedEvent, PowerChangedEvent, StateChangedEvent};
use crate::protocol::{DeviceInfo, EnergyConsumption, Envelope, MessageBus};
use crate::state::{FcuState, Heartbeat};
use crate::subscription::CallbackRegistry;
use crate::types::{
    AcAirPureIon, AcFanMode, AcMeritAFeature, AcMeritBFeature, AcMode, AcPowerSelection,
    AcSelfCleaning, AcStatus, AcSwingMode, Field, Temperature,
};

/// Setpoint offset stored by the unit in 8 °C protection heating.
const HEATING_8C_OFFSET: i16 = 16;

/// An indoor unit.
pub struct Device<B: MessageBus> {
    info: DeviceInfo,
    client_id: String,
    capabilities: Capabilities,
    state: RwLock<FcuState>,
    delta: RwLock<FcuState>,
    energy_consumption: RwLock<Option<EnergyConsumption>>,
    power: Mutex<PowerEstimator>,
    on_state_changed: CallbackRegistry<StateChangedEvent>,
    on_energy_consumption_changed: CallbackRegistry<EnergyConsumptionChangedEvent>,
    on_power_changed: CallbackRegistry<PowerChangedEvent>,
    bus: Arc<B>,
}

impl<B: MessageBus> Device<B> {
    /// Creates a device from its discovery record.
    ///
    /// The initial state is decoded and becomes the first delta as well.
    /// `client_id` is the id this client uses as message source.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` if the initial state cannot be decoded.
    pub fn new(info: DeviceInfo, client_id: impl Into<String>, bus: Arc<B>) -> Result<Self> {
        let state = FcuState::decode(&info.initial_ac_state)?;
        let capabilities = Capabilities::from_merit_feature(&info.merit_feature, &info.ac_model_id);

        tracing::debug!(
            device = %info.name,
            merit_a = ?capabilities.merit_a_features(),
            merit_b = ?capabilities.merit_b_features(),
            pure_ion = capabilities.supports_pure_ion(),
            "Derived capabilities"
        );

        Ok(Self {
            info,
            client_id: client_id.into(),
            capabilities,
            state: RwLock::new(state),
            delta: RwLock::new(state),
            energy_consumption: RwLock::new(None),
            power: Mutex::new(PowerEstimator::new()),
            on_state_changed: CallbackRegistry::new(),
            on_energy_consumption_changed: CallbackRegistry::new(),
            on_power_changed: CallbackRegistry::new(),
            bus,
        })
    }

    // ========== Identity ==========

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Returns the internal id used for HTTP polls.
    #[must_use]
    pub fn ac_id(&self) -> &str {
        &self.info.ac_id
    }

    /// Returns the unit id used for message routing.
    #[must_use]
    pub fn ac_unique_id(&self) -> &str {
        &self.info.ac_unique_id
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn firmware_version(&self) -> &str {
        &self.info.firmware_version
    }

    /// Returns the derived capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    // ========== State ==========

    /// Returns a snapshot of the authoritative state.
    #[must_use]
    pub fn state(&self) -> FcuState {
        *self.state.read()
    }

    /// Returns the fields changed by the last merge.
    #[must_use]
    pub fn delta(&self) -> FcuState {
        *self.delta.read()
    }

    /// Returns the run status.
    #[must_use]
    pub fn status(&self) -> Field<AcStatus> {
        self.state.read().status
    }

    /// Returns the operating mode.
    #[must_use]
    pub fn mode(&self) -> Field<AcMode> {
        self.state.read().mode
    }

    /// Returns the setpoint as the user sees it.
    ///
    /// In `HEAT` mode with 8 °C protection the unit reports the setpoint 16
    /// degrees higher; the offset is removed here. Returns `None` when the
    /// setpoint is absent or indeterminate.
    #[must_use]
    pub fn effective_temperature(&self) -> Option<i16> {
        let state = self.state.read();
        let stored = state.temperature.known()?.value();
        if state.mode == Field::Known(AcMode::Heat)
            && state.merit_a_feature == Field::Known(AcMeritAFeature::Heating8C)
        {
            Some(stored - HEATING_8C_OFFSET)
        } else {
            Some(stored)
        }
    }

    /// Returns the fan mode.
    #[must_use]
    pub fn fan_mode(&self) -> Field<AcFanMode> {
        self.state.read().fan_mode
    }

    /// Returns the swing mode.
    #[must_use]
    pub fn swing_mode(&self) -> Field<AcSwingMode> {
        self.state.read().swing_mode
    }

    /// Returns the power selection.
    #[must_use]
    pub fn power_selection(&self) -> Field<AcPowerSelection> {
        self.state.read().power_selection
    }

    /// Returns the merit A feature.
    #[must_use]
    pub fn merit_a_feature(&self) -> Field<AcMeritAFeature> {
        self.state.read().merit_a_feature
    }

    /// Returns the merit B feature.
    #[must_use]
    pub fn merit_b_feature(&self) -> Field<AcMeritBFeature> {
        self.state.read().merit_b_feature
    }

    /// Returns the air purifier state.
    #[must_use]
    pub fn air_pure_ion(&self) -> Field<AcAirPureIon> {
        self.state.read().air_pure_ion
    }

    /// Returns the self cleaning state.
    #[must_use]
    pub fn self_cleaning(&self) -> Field<AcSelfCleaning> {
        self.state.read().self_cleaning
    }

    /// Returns the indoor temperature, if known.
    #[must_use]
    pub fn indoor_temperature(&self) -> Option<i16> {
        self.state.read().indoor_temperature.known().map(|t| t.value())
    }

    /// Returns the outdoor temperature, if known.
    #[must_use]
    pub fn outdoor_temperature(&self) -> Option<i16> {
        self.state.read().outdoor_temperature.known().map(|t| t.value())
    }

    /// Returns the last aggregate energy consumption.
    #[must_use]
    pub fn energy_consumption(&self) -> Option<EnergyConsumption> {
        *self.energy_consumption.read()
    }

    /// Returns the last power estimate in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.power.lock().power()
    }

    // ========== Subscriptions ==========

    /// Subscribers notified after a merge changed the state.
    #[must_use]
    pub fn on_state_changed(&self) -> &CallbackRegistry<StateChangedEvent> {
        &self.on_state_changed
    }

    /// Subscribers notified when the aggregate energy consumption changes.
    #[must_use]
    pub fn on_energy_consumption_changed(
        &self,
    ) -> &CallbackRegistry<EnergyConsumptionChangedEvent> {
        &self.on_energy_consumption_changed
    }

    /// Subscribers notified after every power estimate.
    #[must_use]
    pub fn on_power_changed(&self) -> &CallbackRegistry<PowerChangedEvent> {
        &self.on_power_changed
    }

    // ========== Commands ==========

    /// Applies the unit's command rules to a requested partial state and
    /// encodes the result.
    ///
    /// Nothing is committed to the authoritative state; the unit confirms
    /// changes with its next state report.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capability` if the request uses a feature the unit
    /// does not support, `Error::Value` if the shifted setpoint leaves the
    /// temperature domain, and `Error::Format` if the command cannot be
    /// encoded.
    pub fn compose_command(&self, requested: &FcuState) -> Result<String> {
        self.capabilities.check(requested)?;

        let current = self.state();
        let future = current.overlaid(requested);
        let mut command = *requested;

        if let Field::Known(setpoint) = requested.temperature
            && future.mode == Field::Known(AcMode::Heat)
            && future.merit_a_feature == Field::Known(AcMeritAFeature::Heating8C)
        {
            let shifted = Temperature::new(setpoint.value() + HEATING_8C_OFFSET)?;
            command.temperature = Field::Known(shifted);
        }

        if future.mode != Field::Known(AcMode::Heat) {
            command.merit_b_feature = Field::Known(AcMeritBFeature::Off);

            if matches!(
                future.merit_a_feature,
                Field::Known(AcMeritAFeature::Heating8C | AcMeritAFeature::Floor)
            ) {
                command.merit_a_feature = Field::Known(AcMeritAFeature::Off);
            }
        }

        if requested.status == Field::Known(AcStatus::On)
            && current.self_cleaning == Field::Known(AcSelfCleaning::On)
        {
            command.self_cleaning = Field::Known(AcSelfCleaning::Off);
        }

        tracing::debug!(device = %self.info.name, command = %command, "Composed command");
        Ok(command.encode()?)
    }

    /// Sends a partial state to the unit.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Device::compose_command`], or
    /// `Error::Protocol` if the message cannot be sent.
    pub async fn send_state(&self, requested: &FcuState) -> Result<()> {
        let wire = self.compose_command(requested)?;
        let envelope = Envelope::fcu_to_ac(&self.client_id, &self.info.ac_unique_id, &wire);
        tracing::debug!(device = %self.info.name, data = %wire, "Sending state command");
        self.bus.send_message(envelope).await?;
        Ok(())
    }

    /// Asks the unit to report its full state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the message cannot be sent.
    pub async fn request_state_update(&self) -> Result<()> {
        tracing::debug!(device = %self.info.name, "Requesting status");
        let envelope = Envelope::get_status(&self.client_id, &self.info.ac_unique_id);
        self.bus.send_message(envelope).await?;
        Ok(())
    }

    /// Switches the unit on or off.
    ///
    /// # Errors
    ///
    /// See [`Device::send_state`].
    pub async fn set_status(&self, status: AcStatus) -> Result<()> {
        self.send_state(&FcuState {
            status: Field::Known(status),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the operating mode.
    ///
    /// # Errors
    ///
    /// See [`Device::send_state`].
    pub async fn set_mode(&self, mode: AcMode) -> Result<()> {
        self.send_state(&FcuState {
            mode: Field::Known(mode),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the setpoint in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the setpoint is outside the temperature
    /// domain; otherwise see [`Device::send_state`].
    pub async fn set_temperature(&self, celsius: i16) -> Result<()> {
        self.send_state(&FcuState {
            temperature: Field::Known(Temperature::new(celsius)?),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the fan mode.
    ///
    /// # Errors
    ///
    /// See [`Device::send_state`].
    pub async fn set_fan_mode(&self, fan_mode: AcFanMode) -> Result<()> {
        self.send_state(&FcuState {
            fan_mode: Field::Known(fan_mode),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the swing mode.
    ///
    /// # Errors
    ///
    /// See [`Device::send_state`].
    pub async fn set_swing_mode(&self, swing_mode: AcSwingMode) -> Result<()> {
        self.send_state(&FcuState {
            swing_mode: Field::Known(swing_mode),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the power selection.
    ///
    /// # Errors
    ///
    /// See [`Device::send_state`].
    pub async fn set_power_selection(&self, selection: AcPowerSelection) -> Result<()> {
        self.send_state(&FcuState {
            power_selection: Field::Known(selection),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the merit A feature.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capability` if the unit does not support the feature;
    /// otherwise see [`Device::send_state`].
    pub async fn set_merit_a_feature(&self, feature: AcMeritAFeature) -> Result<()> {
        self.send_state(&FcuState {
            merit_a_feature: Field::Known(feature),
            ..FcuState::new()
        })
        .await
    }

    /// Sets the merit B feature.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capability` if the unit does not support the feature;
    /// otherwise see [`Device::send_state`].
    pub async fn set_merit_b_feature(&self, feature: AcMeritBFeature) -> Result<()> {
        self.send_state(&FcuState {
            merit_b_feature: Field::Known(feature),
            ..FcuState::new()
        })
        .await
    }

    /// Switches the air purifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capability` if the unit has no air purifier;
    /// otherwise see [`Device::send_state`].
    pub async fn set_air_pure_ion(&self, pure_ion: AcAirPureIon) -> Result<()> {
        self.send_state(&FcuState {
            air_pure_ion: Field::Known(pure_ion),
            ..FcuState::new()
        })
        .await
    }

    // ========== Inbound ==========

    /// Merges an encoded state report.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` if the report cannot be decoded, or
    /// `Error::Subscriber` if a subscriber failed.
    pub async fn handle_wire_state(&self, wire: &str) -> Result<()> {
        tracing::debug!(device = %self.info.name, data = %wire, "State report");
        let update = FcuState::decode(wire)?;
        self.apply_update(&update).await
    }

    /// Merges a heartbeat payload.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` if the payload cannot be parsed, or
    /// `Error::Subscriber` if a subscriber failed.
    pub async fn handle_heartbeat(&self, payload: &Value) -> Result<()> {
        let heartbeat = Heartbeat::from_payload(payload)?;
        tracing::debug!(device = %self.info.name, ?heartbeat, "Heartbeat");
        let update = heartbeat.to_state()?;
        self.apply_update(&update).await
    }

    /// Merges a partial state and notifies subscribers if anything changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Subscriber` if a subscriber failed.
    pub async fn apply_update(&self, update: &FcuState) -> Result<()> {
        let merged = tracing::info_span!("device", name = %self.info.name).in_scope(|| {
            let mut state = self.state.write();
            let delta = state.merge(update)?;
            *self.delta.write() = delta;
            Some((*state, delta))
        });

        match merged {
            Some((state, delta)) => self.notify_state(state, delta).await,
            None => Ok(()),
        }
    }

    /// Notifies state subscribers with the current state and last delta.
    ///
    /// # Errors
    ///
    /// Returns `Error::Subscriber` if a subscriber failed.
    pub async fn publish_state(&self) -> Result<()> {
        let (state, delta) = {
            let state = self.state.read();
            (*state, self.delta())
        };
        self.notify_state(state, delta).await
    }

    async fn notify_state(&self, state: FcuState, delta: FcuState) -> Result<()> {
        tracing::info!(device = %self.info.name, state = %state, "Current state");
        self.on_state_changed
            .invoke(StateChangedEvent {
                ac_unique_id: self.info.ac_unique_id.clone(),
                name: self.info.name.clone(),
                state,
                delta,
            })
            .await
    }

    // ========== Energy ==========

    /// Records the aggregate energy consumption.
    ///
    /// Subscribers are only notified if the value changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Subscriber` if a subscriber failed.
    pub async fn update_energy_consumption(&self, consumption: EnergyConsumption) -> Result<()> {
        {
            let mut current = self.energy_consumption.write();
            if *current == Some(consumption) {
                return Ok(());
            }
            *current = Some(consumption);
        }

        tracing::info!(
            device = %self.info.name,
            energy_wh = consumption.energy_wh,
            since = %consumption.since,
            "Energy consumption"
        );

        self.on_energy_consumption_changed
            .invoke(EnergyConsumptionChangedEvent {
                ac_unique_id: self.info.ac_unique_id.clone(),
                name: self.info.name.clone(),
                consumption,
            })
            .await
    }

    /// Estimates the power draw from hourly energy buckets and notifies
    /// subscribers.
    ///
    /// See [`PowerEstimator::estimate`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Energy` if the estimate cannot be computed, or
    /// `Error::Subscriber` if a subscriber failed.
    pub async fn update_power(
        &self,
        now: NaiveDateTime,
        yesterday: Option<&[f64]>,
        today: &[f64],
    ) -> Result<()> {
        let power_w = self.power.lock().estimate(now, yesterday, today)?;

        tracing::info!(device = %self.info.name, power_w, "Power updated");

        self.on_power_changed
            .invoke(PowerChangedEvent {
                ac_unique_id: self.info.ac_unique_id.clone(),
                name: self.info.name.clone(),
                power_w,
            })
            .await
    }
}

impl<B: MessageBus> fmt::Debug for Device<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.info.name)
            .field("ac_id", &self.info.ac_id)
            .field("ac_unique_id", &self.info.ac_unique_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
