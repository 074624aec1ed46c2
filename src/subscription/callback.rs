// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber handles and the registry that notifies them.
//!
//! - [`Subscriber`] - A cloneable handle to a synchronous or async callback
//! - [`CallbackRegistry`] - Ordered set of subscribers notified together

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Type alias for the callable behind a subscriber.
type Callback<A> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A subscriber handle.
///
/// Both synchronous and async callbacks are wrapped behind the same
/// future-producing callable, so the registry awaits them uniformly.
/// Synchronous callbacks run at the moment they are invoked.
///
/// Handles compare by identity: clones of one handle are the same
/// subscriber, two handles built from identical closures are not.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::subscription::Subscriber;
///
/// let log = Subscriber::sync(|power: f64| {
///     println!("power: {power} W");
///     Ok(())
/// });
///
/// let slow = Subscriber::new(|power: f64| async move {
///     tokio::task::yield_now().await;
///     println!("power later: {power} W");
///     Ok(())
/// });
///
/// assert_eq!(log, log.clone());
/// assert_ne!(log, slow);
/// ```
pub struct Subscriber<A> {
    callback: Callback<A>,
}

impl<A: Send + 'static> Subscriber<A> {
    /// Wraps an async callback.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |args| Box::pin(callback(args))),
        }
    }

    /// Wraps a synchronous callback.
    pub fn sync<F>(callback: F) -> Self
    where
        F: Fn(A) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(move |args| Box::pin(future::ready(callback(args)))),
        }
    }

    fn call(&self, args: A) -> BoxFuture<'static, Result<()>> {
        (self.callback)(args)
    }
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> PartialEq for Subscriber<A> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<A> Eq for Subscriber<A> {}

impl<A> fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("ptr", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Registry of subscribers for one kind of event.
///
/// Subscribers are kept in insertion order and de-duplicated by identity.
/// The registry uses `parking_lot::RwLock` for interior mutability; the lock
/// is never held across an await point.
///
/// # Examples
///
/// ```
/// use toshiba_ac_lib::subscription::{CallbackRegistry, Subscriber};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> toshiba_ac_lib::Result<()> {
/// let registry = CallbackRegistry::new();
/// let subscriber = Subscriber::sync(|name: String| {
///     assert_eq!(name, "Living room");
///     Ok(())
/// });
///
/// assert!(registry.add(subscriber.clone()));
/// assert!(!registry.add(subscriber.clone()));
///
/// registry.invoke("Living room".to_string()).await?;
///
/// assert!(registry.remove(&subscriber));
/// assert!(registry.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct CallbackRegistry<A> {
    subscribers: RwLock<Vec<Subscriber<A>>>,
}

impl<A> Default for CallbackRegistry<A> {
    fn default() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }
}

impl<A> fmt::Debug for CallbackRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<A: Clone + Send + 'static> CallbackRegistry<A> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    ///
    /// Returns `true` if it was not registered yet.
    pub fn add(&self, subscriber: Subscriber<A>) -> bool {
        let mut subscribers = self.subscribers.write();
        if subscribers.contains(&subscriber) {
            return false;
        }
        subscribers.push(subscriber);
        true
    }

    /// Removes a subscriber.
    ///
    /// Returns `true` if it was registered.
    pub fn remove(&self, subscriber: &Subscriber<A>) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s != subscriber);
        subscribers.len() != before
    }

    /// Calls every subscriber with `args` and waits for all of them.
    ///
    /// Every subscriber runs even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::Subscriber` carrying the number of failed subscribers
    /// and the first error, in registration order.
    pub async fn invoke(&self, args: A) -> Result<()> {
        // Snapshot so subscribers may (un)register while being notified.
        let subscribers = self.subscribers.read().clone();
        if subscribers.is_empty() {
            return Ok(());
        }

        let calls: Vec<_> = subscribers.iter().map(|s| s.call(args.clone())).collect();
        let mut errors = future::join_all(calls)
            .await
            .into_iter()
            .filter_map(std::result::Result::err);

        match errors.next() {
            None => Ok(()),
            Some(first) => Err(Error::Subscriber {
                failed: 1 + errors.count(),
                first: Box::new(first),
            }),
        }
    }
}

impl<A> CallbackRegistry<A> {
    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns `true` if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::ProtocolError;

    fn counter() -> (Arc<AtomicU32>, Subscriber<u32>) {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        let subscriber = Subscriber::sync(move |n: u32| {
            count_clone.fetch_add(n, Ordering::SeqCst);
            Ok(())
        });
        (count, subscriber)
    }

    #[test]
    fn add_deduplicates_by_identity() {
        let registry = CallbackRegistry::new();
        let (_, subscriber) = counter();
        let (_, other) = counter();

        assert!(registry.add(subscriber.clone()));
        assert!(!registry.add(subscriber.clone()));
        assert!(registry.add(other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_reports_presence() {
        let registry = CallbackRegistry::new();
        let (_, subscriber) = counter();

        assert!(!registry.remove(&subscriber));
        registry.add(subscriber.clone());
        assert!(registry.remove(&subscriber));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn invoke_calls_sync_and_async_subscribers() {
        let registry = CallbackRegistry::new();
        let (sync_count, sync_sub) = counter();

        let async_count = Arc::new(AtomicU32::new(0));
        let async_clone = Arc::clone(&async_count);
        let async_sub = Subscriber::new(move |n: u32| {
            let count = Arc::clone(&async_clone);
            async move {
                tokio::task::yield_now().await;
                count.fetch_add(n, Ordering::SeqCst);
                Ok(())
            }
        });

        registry.add(sync_sub);
        registry.add(async_sub);
        registry.invoke(5).await.unwrap();

        assert_eq!(sync_count.load(Ordering::SeqCst), 5);
        assert_eq!(async_count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn failures_are_reported_after_all_subscribers_ran() {
        let registry = CallbackRegistry::new();
        let failing = Subscriber::sync(|_: u32| {
            Err(ProtocolError::RequestFailed("first".to_string()).into())
        });
        let also_failing = Subscriber::new(|_: u32| async {
            Err(ProtocolError::RequestFailed("second".to_string()).into())
        });
        let (count, ok) = counter();

        registry.add(failing);
        registry.add(also_failing);
        registry.add(ok);

        let err = registry.invoke(1).await.unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        match err {
            Error::Subscriber { failed, first } => {
                assert_eq!(failed, 2);
                assert!(first.to_string().contains("first"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn invoke_on_empty_registry_is_ok() {
        let registry = CallbackRegistry::<u32>::new();
        assert!(registry.invoke(1).await.is_ok());
    }
}
