// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message envelope exchanged over the message transport.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Placeholder used by the cloud service for message ids and timestamps.
pub const PLACEHOLDER_ID: &str = "0000000";

/// Command carried by an [`Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Ask the unit to report its full state.
    #[serde(rename = "CMD_GET_STATUS")]
    GetStatus,
    /// State command sent to the unit.
    #[serde(rename = "CMD_FCU_TO_AC")]
    FcuToAc,
    /// State report sent by the unit.
    #[serde(rename = "CMD_FCU_FROM_AC")]
    FcuFromAc,
    /// Periodic sensor readings sent by the unit.
    #[serde(rename = "CMD_HEARTBEAT")]
    Heartbeat,
    /// Any command this library does not handle.
    #[serde(other)]
    Unsupported,
}

/// A command envelope.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::protocol::Envelope;
///
/// let envelope = Envelope::fcu_to_ac("user_3e6e4eb5f0e5aa46", "unit-1", "30ffffffffffffffffffffffffffffffffffff");
/// let json = serde_json::to_value(&envelope).unwrap();
///
/// assert_eq!(json["cmd"], "CMD_FCU_TO_AC");
/// assert_eq!(json["targetId"][0], "unit-1");
/// assert_eq!(json["payload"]["data"], "30ffffffffffffffffffffffffffffffffffff");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender: the client id for outbound messages, the unit id for inbound ones.
    pub source_id: String,
    /// Message id.
    #[serde(default = "placeholder")]
    pub message_id: String,
    /// Recipients.
    #[serde(default)]
    pub target_id: Vec<String>,
    /// Command.
    pub cmd: CommandKind,
    /// Command specific payload.
    #[serde(default)]
    pub payload: Value,
    /// Timestamp.
    #[serde(default = "placeholder")]
    pub time_stamp: String,
}

fn placeholder() -> String {
    PLACEHOLDER_ID.to_string()
}

impl Envelope {
    fn new(source_id: &str, target: &str, cmd: CommandKind, payload: Value) -> Self {
        Self {
            source_id: source_id.to_string(),
            message_id: placeholder(),
            target_id: vec![target.to_string()],
            cmd,
            payload,
            time_stamp: placeholder(),
        }
    }

    /// Builds a status request for one unit.
    #[must_use]
    pub fn get_status(source_id: &str, ac_unique_id: &str) -> Self {
        Self::new(source_id, ac_unique_id, CommandKind::GetStatus, json!({}))
    }

    /// Builds a state command carrying an encoded partial state.
    #[must_use]
    pub fn fcu_to_ac(source_id: &str, ac_unique_id: &str, wire_state: &str) -> Self {
        Self::new(
            source_id,
            ac_unique_id,
            CommandKind::FcuToAc,
            json!({ "data": wire_state }),
        )
    }

    /// Returns `payload.data` as a string, if present.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.payload.get("data").and_then(Value::as_str)
    }
}
