// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indoor unit state: the record, its wire codec and change detection.
//!
//! [`FcuState`] holds one [`Field`](crate::types::Field) per state value. The
//! same type is used for the authoritative state of a device, for partial
//! states decoded from packets and heartbeats, for the delta produced by a
//! merge, and for outbound commands.
//!
//! # Examples
//!
//! ```
//! use toshiba_ac_lib::state::FcuState;
//! use toshiba_ac_lib::types::{AcStatus, Field};
//!
//! let mut state = FcuState::decode("30431441506404101214fe01001e1001020d05").unwrap();
//! assert_eq!(state.status, Field::Known(AcStatus::On));
//!
//! let update = FcuState::decode("31ffffffffffffffffffffffffffffffffffff").unwrap();
//! let delta = state.merge(&update).unwrap();
//!
//! assert_eq!(delta.status, Field::Known(AcStatus::Off));
//! assert_eq!(state.status, Field::Known(AcStatus::Off));
//! ```

mod codec;
mod fcu_state;
mod heartbeat;
mod merge;

pub use codec::WIRE_LENGTH;
pub use fcu_state::{Encoding, FcuState, FieldSpec};
pub use heartbeat::Heartbeat;
