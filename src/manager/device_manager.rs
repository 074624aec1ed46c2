// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, Timelike};
use futures::future;
use parking_lot::RwLock;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::protocol::{CloudApi, CommandKind, EnergyReport, Envelope, InboundHandler, MessageBus};

use super::ManagerConfig;

/// Work items executed by the dispatcher, one at a time.
#[derive(Debug)]
enum Inbound {
    /// A message delivered by the message bus.
    Message(Envelope),
    /// A state fetched by a periodic poll.
    Polled { ac_unique_id: String, wire: String },
}

impl Inbound {
    fn source(&self) -> &str {
        match self {
            Self::Message(envelope) => &envelope.source_id,
            Self::Polled { ac_unique_id, .. } => ac_unique_id,
        }
    }
}

/// Lifecycle signal observed by the monitor and [`DeviceManager::wait_for_fatal`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Running,
    Stopped,
    Failed(String),
}

/// Slow-path state, guarded by the session gate.
#[derive(Debug, Default)]
struct Session {
    connected: bool,
    sas_token: Option<String>,
    devices: Vec<String>,
    inbound: Option<mpsc::UnboundedSender<Inbound>>,
    tasks: Vec<JoinHandle<()>>,
    polling: bool,
    monitor: Option<JoinHandle<()>>,
}

struct Inner<A: CloudApi, B: MessageBus> {
    config: ManagerConfig,
    api: Arc<A>,
    bus: Arc<B>,
    session: Mutex<Session>,
    devices: RwLock<HashMap<String, Arc<Device<B>>>>,
    status: watch::Sender<Status>,
}

/// Manages the units of one account.
///
/// The manager connects both transports, discovers units, keeps their state
/// fresh with periodic polls and routes inbound messages to them. Inbound
/// messages are handed to a single dispatcher task, so updates for a unit
/// are applied in arrival order and merges never interleave.
///
/// Connecting, discovery and shutdown are serialized by one gate; routing
/// does not take it.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use toshiba_ac_lib::manager::{DeviceManager, ManagerConfig};
/// use toshiba_ac_lib::protocol::{CloudApi, MessageBus};
///
/// # async fn example<A: CloudApi, B: MessageBus>(api: A, bus: B) -> toshiba_ac_lib::Result<()> {
/// let manager = DeviceManager::new(ManagerConfig::new("jane"), Arc::new(api), Arc::new(bus));
///
/// let sas_token = manager.connect().await?;
/// for device in manager.get_devices().await? {
///     println!("{}: {}", device.name(), device.state());
/// }
///
/// let reason = manager.wait_for_fatal().await;
/// eprintln!("session ended: {reason}");
/// # Ok(())
/// # }
/// ```
pub struct DeviceManager<A: CloudApi, B: MessageBus> {
    inner: Arc<Inner<A, B>>,
}

impl<A: CloudApi, B: MessageBus> DeviceManager<A, B> {
    /// Creates a manager over the given transports.
    ///
    /// Nothing is started until [`connect`](Self::connect) is called.
    #[must_use]
    pub fn new(config: ManagerConfig, api: Arc<A>, bus: Arc<B>) -> Self {
        let sas_token = config.sas_token().map(str::to_string);
        let (status, _) = watch::channel(Status::Stopped);

        Self {
            inner: Arc::new(Inner {
                config,
                api,
                bus,
                session: Mutex::new(Session {
                    sas_token,
                    ..Session::default()
                }),
                devices: RwLock::new(HashMap::new()),
                status,
            }),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects both transports and returns the SAS token.
    ///
    /// When no token was configured the client is registered through the
    /// HTTP API first. Calling it on a connected manager returns the token
    /// without side effects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` wrapping the cause if any step fails. The
    /// manager is shut down before the error is returned.
    pub async fn connect(&self) -> Result<String> {
        let mut session = self.inner.session.lock().await;

        if session.connected
            && let Some(token) = &session.sas_token
        {
            return Ok(token.clone());
        }

        match self.open(&mut session).await {
            Ok(token) => Ok(token),
            Err(err) => {
                tracing::error!(error = %err, "Connecting failed, shutting down");
                self.close(&mut session).await;
                Err(Error::Lifecycle(Box::new(err)))
            }
        }
    }

    async fn open(&self, session: &mut Session) -> Result<String> {
        let inner = &self.inner;
        inner.api.connect().await?;

        let token = match session.sas_token.clone() {
            Some(token) => token,
            None => {
                let client_id = inner.config.client_id();
                tracing::debug!(%client_id, "Registering client");
                let token = inner.api.register_client(&client_id).await?;
                session.sas_token = Some(token.clone());
                token
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        session.tasks.push(self.spawn_supervised("dispatcher", {
            let manager = self.clone();
            async move { manager.dispatch(rx).await }
        }));

        let handler_tx = tx.clone();
        let handler: InboundHandler = Arc::new(move |envelope: Envelope| {
            if handler_tx.send(Inbound::Message(envelope)).is_err() {
                tracing::debug!("Dispatcher stopped, inbound message dropped");
            }
        });
        inner.bus.set_inbound_handler(handler);
        session.inbound = Some(tx);

        inner.bus.connect(&token).await?;

        inner.status.send_replace(Status::Running);
        if session.monitor.as_ref().is_none_or(JoinHandle::is_finished) {
            session.monitor = Some(self.spawn_monitor());
        }

        session.connected = true;
        tracing::debug!("Connected");
        Ok(token)
    }

    /// Stops all background tasks and shuts both transports down.
    ///
    /// Tasks that do not finish within the grace period are abandoned.
    /// Calling it more than once is harmless. Discovered devices are kept.
    pub async fn shutdown(&self) {
        tracing::debug!("Shutting down");
        let mut session = self.inner.session.lock().await;
        self.close(&mut session).await;
        tracing::debug!("Shutdown complete");
    }

    async fn close(&self, session: &mut Session) {
        session.connected = false;
        session.polling = false;
        session.inbound = None;

        let tasks = std::mem::take(&mut session.tasks);
        if !tasks.is_empty() {
            tracing::debug!(count = tasks.len(), "Cancelling background tasks");
            for task in &tasks {
                task.abort();
            }

            let grace = self.inner.config.grace_period();
            if tokio::time::timeout(grace, future::join_all(tasks))
                .await
                .is_err()
            {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Background tasks did not stop in time, abandoning them"
                );
            }
        }

        if let Err(err) = self.inner.bus.shutdown().await {
            tracing::warn!(error = %err, "Message bus shutdown failed");
        }
        if let Err(err) = self.inner.api.shutdown().await {
            tracing::warn!(error = %err, "HTTP API shutdown failed");
        }

        self.inner.status.send_if_modified(|status| {
            let running = *status == Status::Running;
            if running {
                *status = Status::Stopped;
            }
            running
        });
    }

    /// Returns whether the manager is connected.
    pub async fn is_connected(&self) -> bool {
        self.inner.session.lock().await.connected
    }

    /// Waits until the session ends and returns why.
    ///
    /// A background failure yields `Error::Fatal`; the manager shuts itself
    /// down after such a failure and a supervising process would typically
    /// create a new session. A clean [`shutdown`](Self::shutdown), or calling
    /// this while not connected, yields `Error::NotConnected`.
    pub async fn wait_for_fatal(&self) -> Error {
        let mut rx = self.inner.status.subscribe();
        if rx.wait_for(|status| *status != Status::Running).await.is_err() {
            return Error::NotConnected;
        }
        let status = rx.borrow().clone();
        match status {
            Status::Failed(reason) => Error::Fatal(reason),
            Status::Running | Status::Stopped => Error::NotConnected,
        }
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Returns the units of the account.
    ///
    /// The first call discovers the units, announces their initial state and
    /// starts the periodic tasks. Later calls return the same devices.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` before [`connect`](Self::connect),
    /// `Error::Protocol` if discovery fails, `Error::Format` if a unit
    /// reports an undecodable initial state, or `Error::Subscriber` if a
    /// subscriber failed.
    pub async fn get_devices(&self) -> Result<Vec<Arc<Device<B>>>> {
        let mut session = self.inner.session.lock().await;
        if !session.connected {
            return Err(Error::NotConnected);
        }

        if session.devices.is_empty() {
            self.discover(&mut session).await?;
        }

        if !session.polling {
            self.start_polling(&mut session);
        }

        let devices = self.inner.devices.read();
        Ok(session
            .devices
            .iter()
            .filter_map(|id| devices.get(id).cloned())
            .collect())
    }

    /// Returns a discovered device by unit id.
    #[must_use]
    pub fn device(&self, ac_unique_id: &str) -> Option<Arc<Device<B>>> {
        self.inner.devices.read().get(ac_unique_id).cloned()
    }

    async fn discover(&self, session: &mut Session) -> Result<()> {
        let infos = self.inner.api.get_devices().await?;
        tracing::debug!(count = infos.len(), "Found devices");

        let client_id = self.inner.config.client_id();
        let mut created = Vec::with_capacity(infos.len());
        for info in infos {
            let device = Arc::new(Device::new(info, client_id.as_str(), Arc::clone(&self.inner.bus))?);
            tracing::debug!(?device, "Adding device");
            created.push(device);
        }

        // Announce the initial state before the dispatcher can route to them.
        first_error(future::join_all(created.iter().map(|device| device.publish_state())).await)?;

        {
            let mut devices = self.inner.devices.write();
            for device in &created {
                devices.insert(device.ac_unique_id().to_string(), Arc::clone(device));
            }
        }
        session.devices = created
            .iter()
            .map(|device| device.ac_unique_id().to_string())
            .collect();
        Ok(())
    }

    fn start_polling(&self, session: &mut Session) {
        let Some(inbound) = session.inbound.clone() else {
            return;
        };

        for ac_unique_id in &session.devices {
            let manager = self.clone();
            let ac_unique_id = ac_unique_id.clone();
            let inbound = inbound.clone();
            session.tasks.push(self.spawn_supervised("state poll", async move {
                manager.poll_state(&ac_unique_id, &inbound).await;
                Ok(())
            }));
        }

        let manager = self.clone();
        session
            .tasks
            .push(self.spawn_supervised("energy fetch", async move {
                manager.fetch_energy_periodically().await
            }));

        session.polling = true;
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    fn spawn_supervised<F>(&self, task: &'static str, work: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let status = self.inner.status.clone();
        tokio::spawn(async move {
            if let Err(err) = work.await {
                tracing::error!(task, error = %err, "Background task failed");
                status.send_if_modified(|status| {
                    let running = *status == Status::Running;
                    if running {
                        *status = Status::Failed(format!("{task}: {err}"));
                    }
                    running
                });
            }
        })
    }

    fn spawn_monitor(&self) -> JoinHandle<()> {
        let mut rx = self.inner.status.subscribe();
        let manager = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            if rx.wait_for(|status| *status != Status::Running).await.is_err() {
                return;
            }
            let status = rx.borrow().clone();
            let Status::Failed(reason) = status else {
                return;
            };
            tracing::error!(%reason, "Fatal background error, stopping session");

            if let Some(inner) = manager.upgrade() {
                DeviceManager { inner }.shutdown().await;
            }
        })
    }

    async fn dispatch(&self, mut rx: mpsc::UnboundedReceiver<Inbound>) -> Result<()> {
        while let Some(inbound) = rx.recv().await {
            let source = inbound.source().to_string();
            match self.route(inbound).await {
                Err(err @ (Error::UnknownDevice(_) | Error::Format(_))) => {
                    tracing::warn!(%source, error = %err, "Inbound message dropped");
                }
                result => result?,
            }
        }
        Ok(())
    }

    async fn route(&self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::Message(envelope) => {
                let device = self
                    .device(&envelope.source_id)
                    .ok_or_else(|| Error::UnknownDevice(envelope.source_id.clone()))?;

                match envelope.cmd {
                    CommandKind::FcuFromAc => match envelope.data() {
                        Some(wire) => device.handle_wire_state(wire).await,
                        None => {
                            tracing::warn!(device = %device.name(), "State report without data dropped");
                            Ok(())
                        }
                    },
                    CommandKind::Heartbeat => device.handle_heartbeat(&envelope.payload).await,
                    cmd => {
                        tracing::debug!(device = %device.name(), ?cmd, "Ignoring message");
                        Ok(())
                    }
                }
            }
            Inbound::Polled { ac_unique_id, wire } => match self.device(&ac_unique_id) {
                Some(device) => device.handle_wire_state(&wire).await,
                None => Err(Error::UnknownDevice(ac_unique_id)),
            },
        }
    }

    async fn poll_state(&self, ac_unique_id: &str, inbound: &mpsc::UnboundedSender<Inbound>) {
        let Some(device) = self.device(ac_unique_id) else {
            return;
        };

        loop {
            let delay = self.inner.config.jittered(self.inner.config.reload_period());
            tracing::debug!(device = %device.name(), delay_secs = delay.as_secs(), "State reload sleeping");
            tokio::time::sleep(delay).await;

            match self.inner.api.get_device_state(device.ac_id()).await {
                Ok(wire) => {
                    tracing::debug!(device = %device.name(), data = %wire, "State from HTTP");
                    let polled = Inbound::Polled {
                        ac_unique_id: ac_unique_id.to_string(),
                        wire,
                    };
                    if inbound.send(polled).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(device = %device.name(), error = %err, "State poll failed");
                }
            }
        }
    }

    async fn fetch_energy_periodically(&self) -> Result<()> {
        loop {
            let result = if self.inner.config.use_power() {
                self.fetch_energies_for_power().await
            } else {
                self.fetch_energy_consumption().await
            };

            match result {
                Ok(()) => {}
                Err(Error::Protocol(err)) => {
                    tracing::warn!(error = %err, "Energy fetch failed");
                }
                Err(err) => return Err(err),
            }

            let delay = self.inner.config.jittered(self.inner.config.energy_period());
            tracing::debug!(delay_secs = delay.as_secs(), "Energy fetch sleeping");
            tokio::time::sleep(delay).await;
        }
    }

    fn device_ids(&self) -> Vec<String> {
        self.inner.devices.read().keys().cloned().collect()
    }

    async fn fetch_energy_consumption(&self) -> Result<()> {
        let reports = self
            .inner
            .api
            .get_devices_energy_consumption(&self.device_ids(), 0, true)
            .await?;
        tracing::debug!(?reports, "Energy consumption for devices");

        let mut updates = Vec::with_capacity(reports.len());
        for (ac_unique_id, report) in reports {
            let Some(device) = self.device(&ac_unique_id) else {
                tracing::warn!(%ac_unique_id, "Energy report for unknown device dropped");
                continue;
            };
            match report.total() {
                Some(consumption) => updates.push(async move {
                    device.update_energy_consumption(consumption).await
                }),
                None => tracing::warn!(device = %device.name(), "Expected aggregate energy report"),
            }
        }

        first_error(future::join_all(updates).await)
    }

    async fn fetch_energies_for_power(&self) -> Result<()> {
        let ids = self.device_ids();
        let now = Local::now().naive_local();

        let today = self
            .inner
            .api
            .get_devices_energy_consumption(&ids, 0, false)
            .await?;
        tracing::debug!(?today, "Energy consumption for devices");

        let yesterday = if now.hour() == 0 {
            tracing::debug!("Fetching previous day for midnight rollover");
            Some(
                self.inner
                    .api
                    .get_devices_energy_consumption(&ids, 1, false)
                    .await?,
            )
        } else {
            None
        };

        let mut updates = Vec::with_capacity(today.len());
        for (ac_unique_id, report) in &today {
            let Some(device) = self.device(ac_unique_id) else {
                tracing::warn!(%ac_unique_id, "Energy report for unknown device dropped");
                continue;
            };
            let Some(buckets) = report.hourly() else {
                tracing::warn!(device = %device.name(), "Expected hourly energy report");
                continue;
            };
            let previous = yesterday
                .as_ref()
                .and_then(|reports| reports.get(ac_unique_id))
                .and_then(EnergyReport::hourly);

            updates.push(async move { device.update_power(now, previous, buckets).await });
        }

        first_error(future::join_all(updates).await)
    }
}

fn first_error(results: Vec<Result<()>>) -> Result<()> {
    results.into_iter().collect()
}

impl<A: CloudApi, B: MessageBus> Clone for DeviceManager<A, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CloudApi, B: MessageBus> std::fmt::Debug for DeviceManager<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("config", &self.inner.config)
            .field("devices", &self.inner.devices.read().len())
            .finish_non_exhaustive()
    }
}
