// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Toshiba AC library.
//!
//! This module provides the error hierarchy used across the library: wire
//! format decoding, value validation, device capability checks, transport
//! communication, energy accounting and manager lifecycle.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire string, heartbeat or report could not be decoded or encoded.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The device does not support the requested feature value.
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Error reported by one of the transports.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Power estimation could not be computed from the given samples.
    #[error("energy error: {0}")]
    Energy(#[from] EnergyError),

    /// An inbound message referenced a unit that is not managed.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// Connecting the transports failed; partially connected transports were torn down.
    #[error("connect failed: {0}")]
    Lifecycle(Box<Error>),

    /// The manager is not connected (or was shut down).
    #[error("device manager is not connected")]
    NotConnected,

    /// One or more subscribers failed while being notified.
    #[error("{failed} subscriber(s) failed, first error: {first}")]
    Subscriber {
        /// Number of subscribers that returned an error.
        failed: usize,
        /// The first error observed.
        first: Box<Error>,
    },

    /// A background task failed and the session was stopped.
    #[error("fatal background error: {0}")]
    Fatal(String),
}

/// Errors related to the binary state format and the JSON payloads carrying it.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The wire string does not have the nibble-packed length.
    #[error("invalid state length: expected {expected} hex characters, got {actual}")]
    InvalidLength {
        /// Expected number of characters.
        expected: usize,
        /// Number of characters received.
        actual: usize,
    },

    /// The wire string contains a character that is not a hex digit.
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHex {
        /// The offending character.
        character: char,
        /// Its position in the wire string.
        position: usize,
    },

    /// A byte is outside the domain of its field.
    #[error("byte 0x{byte:02x} is not a valid value for {field}")]
    OutOfDomain {
        /// The field being decoded.
        field: &'static str,
        /// The rejected byte.
        byte: u8,
    },

    /// A field value cannot be represented on the wire.
    #[error("{field} cannot encode {value}")]
    Unencodable {
        /// The field being encoded.
        field: &'static str,
        /// Human readable form of the value.
        value: String,
    },

    /// A reported JSON value could not be mapped onto a field.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The field (report key) being set.
        field: String,
        /// The rejected JSON value.
        value: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i32,
        /// Maximum allowed value.
        max: i32,
        /// The actual value that was provided.
        actual: i32,
    },

    /// A symbol name does not belong to the domain.
    #[error("unknown {domain} value: {name}")]
    UnknownSymbol {
        /// The domain being parsed.
        domain: &'static str,
        /// The unrecognized name.
        name: String,
    },
}

/// Errors raised when a setter targets a feature the unit cannot perform.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Merit A feature value not in the derived supported set.
    #[error("unsupported merit A feature: {0}")]
    MeritA(String),

    /// Merit B feature value not in the derived supported set.
    #[error("unsupported merit B feature: {0}")]
    MeritB(String),

    /// The unit has no air purifier.
    #[error("pure ion feature is not supported by this device")]
    PureIon,
}

/// Errors related to transport communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection to the service failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A request was sent but failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Authentication or client registration failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to power estimation from hourly energy buckets.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnergyError {
    /// No bucket exists for the requested hour.
    #[error("no energy bucket for hour {0}")]
    MissingBucket(u32),

    /// The new sample was taken at the same instant as the previous one.
    #[error("no time elapsed since previous energy sample")]
    ZeroElapsed,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_display() {
        let err = FormatError::OutOfDomain {
            field: "ac_mode",
            byte: 0x99,
        };
        assert_eq!(err.to_string(), "byte 0x99 is not a valid value for ac_mode");
    }

    #[test]
    fn error_from_capability_error() {
        let err: Error = CapabilityError::PureIon.into();
        assert!(matches!(err, Error::Capability(CapabilityError::PureIon)));
    }

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: -128,
            max: 125,
            actual: 126,
        };
        assert_eq!(err.to_string(), "value 126 is out of range [-128, 125]");
    }

    #[test]
    fn lifecycle_wraps_cause() {
        let cause = Error::Protocol(ProtocolError::AuthenticationFailed);
        let err = Error::Lifecycle(Box::new(cause));
        assert_eq!(
            err.to_string(),
            "connect failed: protocol error: authentication failed"
        );
    }
}
