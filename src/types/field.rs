// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sentinel-aware field values.
//!
//! Every field of the unit state is one byte on the wire. The byte `0xFF`
//! means "not present in this packet" for every field, and some domains
//! additionally reserve a byte meaning "the unit reported an indeterminate
//! value". [`Field`] keeps those two sentinels apart from the domain values
//! so that no domain type has to carry magic variants.

use std::fmt;

use serde_json::Value;

use crate::error::FormatError;

/// Wire byte meaning "absent from this packet".
pub const NONE_BYTE: u8 = 0xFF;

/// A closed set of values that a single state byte can take.
///
/// Implementors describe the mapping between wire bytes and typed values.
/// The [`NONE_BYTE`] sentinel and [`Domain::UNKNOWN_BYTE`] are handled by
/// [`Field`] and never reach [`Domain::from_byte`].
pub trait Domain: Copy + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Name of the domain, used in error messages.
    const DOMAIN: &'static str;

    /// Byte the unit uses to report an indeterminate value, if the domain has one.
    const UNKNOWN_BYTE: Option<u8> = None;

    /// Decodes a wire byte, returning `None` if it is outside the domain.
    fn from_byte(byte: u8) -> Option<Self>;

    /// Encodes the value into its wire byte.
    fn to_byte(self) -> u8;

    /// Parses a symbol name such as `"HEAT"`.
    fn from_symbol(name: &str) -> Option<Self>;

    /// Value used in external reports.
    ///
    /// Enumerated domains report their raw byte; readings override this to
    /// report their decoded magnitude.
    fn report(self) -> Value {
        Value::from(self.to_byte())
    }

    /// Inverse of [`Domain::report`], also accepting symbol names.
    fn from_reported(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .filter(|&b| b != NONE_BYTE)
                .and_then(Self::from_byte),
            Value::String(s) => Self::from_symbol(s),
            _ => None,
        }
    }
}

/// A field value that may be absent or indeterminate.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::types::{AcMode, Field};
///
/// let mode = Field::from_byte("ac_mode", 0x43).unwrap();
/// assert_eq!(mode, Field::Known(AcMode::Heat));
///
/// let absent = Field::<AcMode>::from_byte("ac_mode", 0xFF).unwrap();
/// assert!(absent.is_unset());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not present in this packet (`NONE`).
    Unset,
    /// The unit reported an indeterminate value (`UNKNOWN`).
    Unknown,
    /// A value from the field's domain.
    Known(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T: Domain> Field<T> {
    /// Decodes a wire byte for the named field.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::OutOfDomain` if the byte is neither a sentinel
    /// nor a member of the domain.
    pub fn from_byte(field: &'static str, byte: u8) -> Result<Self, FormatError> {
        if byte == NONE_BYTE {
            return Ok(Self::Unset);
        }
        if T::UNKNOWN_BYTE == Some(byte) {
            return Ok(Self::Unknown);
        }
        T::from_byte(byte)
            .map(Self::Known)
            .ok_or(FormatError::OutOfDomain { field, byte })
    }

    /// Encodes the value into its wire byte.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Unencodable` for [`Field::Unknown`] on a domain
    /// that has no indeterminate byte.
    pub fn to_byte(self, field: &'static str) -> Result<u8, FormatError> {
        match self {
            Self::Unset => Ok(NONE_BYTE),
            Self::Unknown => T::UNKNOWN_BYTE.ok_or(FormatError::Unencodable {
                field,
                value: "UNKNOWN".to_string(),
            }),
            Self::Known(value) => Ok(value.to_byte()),
        }
    }

    /// Returns the domain value, if known.
    #[must_use]
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unset | Self::Unknown => None,
        }
    }

    /// Returns `true` if the field is absent.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Replaces `self` with `incoming` if `incoming` is present and different.
    ///
    /// Returns `true` if the value was replaced.
    pub fn merge(&mut self, incoming: Self) -> bool {
        if incoming.is_unset() || *self == incoming {
            return false;
        }
        *self = incoming;
        true
    }

    /// Value used in external reports; sentinels are omitted.
    #[must_use]
    pub fn report(self) -> Option<Value> {
        self.known().map(Domain::report)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("NONE"),
            Self::Unknown => f.write_str("UNKNOWN"),
            Self::Known(value) => value.fmt(f),
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}
