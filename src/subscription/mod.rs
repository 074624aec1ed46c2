// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device events.
//!
//! # Overview
//!
//! - [`Subscriber`] - A handle to a synchronous or async callback; keep a
//!   clone to unsubscribe later
//! - [`CallbackRegistry`] - Ordered, identity de-duplicated set of
//!   subscribers that are notified together
//!
//! # Usage
//!
//! ```no_run
//! use toshiba_ac_lib::subscription::Subscriber;
//! # use toshiba_ac_lib::{Device, protocol::MessageBus};
//!
//! # fn example<B: MessageBus>(device: &Device<B>) {
//! let subscriber = Subscriber::sync(|event: toshiba_ac_lib::event::StateChangedEvent| {
//!     println!("{} changed: {:?}", event.name, event.report());
//!     Ok(())
//! });
//!
//! device.on_state_changed().add(subscriber.clone());
//!
//! // Later, unsubscribe
//! device.on_state_changed().remove(&subscriber);
//! # }
//! ```

mod callback;

pub use callback::{CallbackRegistry, Subscriber};
