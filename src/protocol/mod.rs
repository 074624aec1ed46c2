// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport contracts for the cloud service.
//!
//! The library talks to the vendor cloud through two transports it does not
//! implement itself:
//!
//! - [`CloudApi`]: request/response HTTP API (login, client registration,
//!   device list, state polls, energy reports)
//! - [`MessageBus`]: the message queue carrying commands to units and state
//!   reports and heartbeats back from them
//!
//! Both traits return `Send` futures so the manager can drive them from
//! spawned tasks.

mod cloud;
mod envelope;

pub use cloud::{DeviceInfo, EnergyConsumption, EnergyReport};
pub use envelope::{CommandKind, Envelope, PLACEHOLDER_ID};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::error::ProtocolError;

/// Handler called by a [`MessageBus`] for every inbound message.
///
/// It may be called from the transport's own thread; it must not block.
pub type InboundHandler = Arc<dyn Fn(Envelope) + Send + Sync>;

/// Request/response API of the cloud service.
pub trait CloudApi: Send + Sync + 'static {
    /// Logs in. Calling it on a connected client is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the service cannot be reached or rejects
    /// the credentials.
    fn connect(&self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Releases the client. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if closing the session fails.
    fn shutdown(&self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Registers this client on the message bus and returns its SAS token.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the registration is rejected.
    fn register_client(
        &self,
        client_id: &str,
    ) -> impl Future<Output = Result<String, ProtocolError>> + Send;

    /// Fetches the encoded state of a unit by its internal id.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn get_device_state(
        &self,
        ac_id: &str,
    ) -> impl Future<Output = Result<String, ProtocolError>> + Send;

    /// Lists the units registered on the account.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn get_devices(&self) -> impl Future<Output = Result<Vec<DeviceInfo>, ProtocolError>> + Send;

    /// Fetches energy reports keyed by unit id.
    ///
    /// With `total` set, each report is [`EnergyReport::Total`]; otherwise it
    /// is [`EnergyReport::Hourly`] for the local day `offset_days` before
    /// today.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn get_devices_energy_consumption(
        &self,
        ac_unique_ids: &[String],
        offset_days: u32,
        total: bool,
    ) -> impl Future<Output = Result<HashMap<String, EnergyReport>, ProtocolError>> + Send;
}

/// Message queue transport.
pub trait MessageBus: Send + Sync + 'static {
    /// Connects with the given SAS token. Calling it on a connected bus is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection fails.
    fn connect(&self, sas_token: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Disconnects. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if closing the connection fails.
    fn shutdown(&self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Sends a message without waiting for a reply.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be handed to the transport.
    fn send_message(
        &self,
        envelope: Envelope,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Installs the handler for inbound messages, replacing any previous one.
    fn set_inbound_handler(&self, handler: InboundHandler);
}
