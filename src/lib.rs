// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toshiba AC Lib - A Rust library to mirror and control Toshiba
//! cloud-connected air conditioners.
//!
//! The library keeps a local copy of each indoor unit's state, merges state
//! reports and heartbeats into it, and sends commands back through the
//! vendor cloud. The HTTP API and the message bus are provided by the
//! application through the [`protocol::CloudApi`] and
//! [`protocol::MessageBus`] traits.
//!
//! # Supported Features
//!
//! - **State codec**: the 38 character wire format, with absent (`0xFF`) and
//!   indeterminate values kept apart from real readings
//! - **State merging**: field-wise merge producing the set of changed fields
//! - **Commands**: typed setters with capability checks and the unit's
//!   command rules (8 °C protection offset, heating-only features,
//!   self cleaning)
//! - **Telemetry**: heartbeat sensor readings
//! - **Energy**: aggregate consumption or estimated power draw
//! - **Subscriptions**: sync or async callbacks per event type
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use toshiba_ac_lib::{DeviceManager, ManagerConfig};
//! use toshiba_ac_lib::protocol::{CloudApi, MessageBus};
//! use toshiba_ac_lib::types::{AcMode, AcStatus};
//!
//! # async fn example<A: CloudApi, B: MessageBus>(api: A, bus: B) -> toshiba_ac_lib::Result<()> {
//! let manager = DeviceManager::new(ManagerConfig::new("jane"), Arc::new(api), Arc::new(bus));
//! manager.connect().await?;
//!
//! for device in manager.get_devices().await? {
//!     device.set_status(AcStatus::On).await?;
//!     device.set_mode(AcMode::Cool).await?;
//!     device.set_temperature(23).await?;
//! }
//!
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with states directly
//!
//! ```
//! use toshiba_ac_lib::state::FcuState;
//!
//! let state: FcuState = "30431441506404101214fe01001e1001020d05".parse()?;
//! assert_eq!(state.temperature.known().unwrap().value(), 20);
//! # Ok::<(), toshiba_ac_lib::error::FormatError>(())
//! ```

mod capabilities;
pub mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use capabilities::Capabilities;
pub use device::{Device, PowerEstimator};
pub use error::{
    CapabilityError, EnergyError, Error, FormatError, ProtocolError, Result, ValueError,
};
pub use event::{EnergyConsumptionChangedEvent, PowerChangedEvent, StateChangedEvent};
pub use manager::{DeviceManager, ManagerConfig};
pub use protocol::{CloudApi, DeviceInfo, EnergyConsumption, EnergyReport, Envelope, MessageBus};
pub use state::{FcuState, Heartbeat};
pub use subscription::{CallbackRegistry, Subscriber};
pub use types::{
    AcAirPureIon, AcFanMode, AcMeritAFeature, AcMeritBFeature, AcMode, AcPowerSelection,
    AcSelfCleaning, AcStatus, AcSwingMode, Field, Temperature,
};
