// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session management for all units of an account.
//!
//! # Overview
//!
//! The [`DeviceManager`] is the entry point for applications. It provides:
//!
//! - **Lifecycle**: connects the HTTP API and the message bus, registering
//!   the client when no SAS token is configured, and tears everything down
//!   if any step fails
//! - **Discovery**: creates one [`Device`](crate::Device) per unit on first
//!   use and caches them
//! - **Routing**: inbound state reports and heartbeats are queued to a single
//!   dispatcher task and merged into the matching device
//! - **Background work**: periodic state polls per device plus an energy
//!   task that either tracks aggregate consumption or estimates power
//! - **Fail-fast**: an error in a background task stops the session; await
//!   [`DeviceManager::wait_for_fatal`] to learn about it. An undecodable
//!   inbound message only drops that message
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use toshiba_ac_lib::event::StateChangedEvent;
//! use toshiba_ac_lib::manager::{DeviceManager, ManagerConfig};
//! use toshiba_ac_lib::protocol::{CloudApi, MessageBus};
//! use toshiba_ac_lib::subscription::Subscriber;
//!
//! # async fn example<A: CloudApi, B: MessageBus>(api: A, bus: B) -> toshiba_ac_lib::Result<()> {
//! let config = ManagerConfig::new("jane").with_use_power(true);
//! let manager = DeviceManager::new(config, Arc::new(api), Arc::new(bus));
//! manager.connect().await?;
//!
//! for device in manager.get_devices().await? {
//!     device.on_state_changed().add(Subscriber::sync(|event: StateChangedEvent| {
//!         println!("{}: {:?}", event.name, event.report());
//!         Ok(())
//!     }));
//! }
//!
//! let reason = manager.wait_for_fatal().await;
//! eprintln!("{reason}");
//! # Ok(())
//! # }
//! ```

mod config;
mod device_manager;

pub use config::{DEFAULT_DEVICE_ID, MIN_PERIOD, ManagerConfig};
pub use device_manager::DeviceManager;
