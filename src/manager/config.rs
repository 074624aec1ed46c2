// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the device manager.

use std::time::Duration;

use rand::Rng;

/// Device id used to build the client id when none is configured.
pub const DEFAULT_DEVICE_ID: &str = "3e6e4eb5f0e5aa46";

/// Shortest delay between two runs of a periodic task.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Configuration for a [`DeviceManager`](super::DeviceManager).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use toshiba_ac_lib::manager::ManagerConfig;
///
/// let config = ManagerConfig::new("jane")
///     .with_use_power(true)
///     .with_reload_period(Duration::from_secs(120));
///
/// assert_eq!(config.client_id(), "jane_3e6e4eb5f0e5aa46");
/// assert!(config.use_power());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    username: String,
    device_id: String,
    sas_token: Option<String>,
    use_power: bool,
    reload_period: Duration,
    energy_period: Duration,
    jitter: Duration,
    grace_period: Duration,
}

impl ManagerConfig {
    /// Creates a configuration with default timings for the given account.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            sas_token: None,
            use_power: false,
            reload_period: Duration::from_secs(5 * 60),
            energy_period: Duration::from_secs(10 * 60),
            jitter: Duration::from_secs(10),
            grace_period: Duration::from_secs(60),
        }
    }

    /// Sets the device id part of the client id.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Uses a previously issued SAS token instead of registering the client.
    #[must_use]
    pub fn with_sas_token(mut self, sas_token: impl Into<String>) -> Self {
        self.sas_token = Some(sas_token.into());
        self
    }

    /// Estimates instantaneous power instead of tracking aggregate energy.
    #[must_use]
    pub fn with_use_power(mut self, use_power: bool) -> Self {
        self.use_power = use_power;
        self
    }

    /// Sets the interval between full state polls.
    #[must_use]
    pub fn with_reload_period(mut self, period: Duration) -> Self {
        self.reload_period = period;
        self
    }

    /// Sets the interval between energy fetches.
    #[must_use]
    pub fn with_energy_period(mut self, period: Duration) -> Self {
        self.energy_period = period;
        self
    }

    /// Sets the maximum random deviation applied to both periods.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sets how long shutdown waits for background tasks.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Returns the account user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the id this client registers and sends messages with.
    #[must_use]
    pub fn client_id(&self) -> String {
        format!("{}_{}", self.username, self.device_id)
    }

    /// Returns the configured SAS token, if any.
    #[must_use]
    pub fn sas_token(&self) -> Option<&str> {
        self.sas_token.as_deref()
    }

    /// Returns whether power estimation is enabled.
    #[must_use]
    pub fn use_power(&self) -> bool {
        self.use_power
    }

    /// Returns the state poll interval.
    #[must_use]
    pub fn reload_period(&self) -> Duration {
        self.reload_period
    }

    /// Returns the energy fetch interval.
    #[must_use]
    pub fn energy_period(&self) -> Duration {
        self.energy_period
    }

    /// Returns the jitter bound.
    #[must_use]
    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Returns the shutdown grace period.
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Returns `period` shifted by a random amount within the jitter bound,
    /// never shorter than [`MIN_PERIOD`].
    pub(crate) fn jittered(&self, period: Duration) -> Duration {
        let offset = rand::thread_rng().gen_range(Duration::ZERO..=self.jitter * 2);
        period
            .saturating_add(offset)
            .saturating_sub(self.jitter)
            .max(MIN_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ManagerConfig::new("user");

        assert_eq!(config.client_id(), "user_3e6e4eb5f0e5aa46");
        assert_eq!(config.sas_token(), None);
        assert!(!config.use_power());
        assert_eq!(config.reload_period(), Duration::from_secs(300));
        assert_eq!(config.energy_period(), Duration::from_secs(600));
        assert_eq!(config.jitter(), Duration::from_secs(10));
        assert_eq!(config.grace_period(), Duration::from_secs(60));
    }

    #[test]
    fn builder_overrides() {
        let config = ManagerConfig::new("user")
            .with_device_id("abc")
            .with_sas_token("token")
            .with_grace_period(Duration::from_secs(1));

        assert_eq!(config.client_id(), "user_abc");
        assert_eq!(config.sas_token(), Some("token"));
        assert_eq!(config.grace_period(), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = ManagerConfig::new("user");
        let period = Duration::from_secs(300);

        for _ in 0..100 {
            let delay = config.jittered(period);
            assert!(delay >= Duration::from_secs(290));
            assert!(delay <= Duration::from_secs(310));
        }
    }

    #[test]
    fn zero_jitter_keeps_period() {
        let config = ManagerConfig::new("user").with_jitter(Duration::ZERO);
        assert_eq!(
            config.jittered(Duration::from_secs(60)),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn jitter_larger_than_period_saturates() {
        let config = ManagerConfig::new("user").with_jitter(Duration::from_secs(30));
        for _ in 0..100 {
            let delay = config.jittered(Duration::from_secs(5));
            assert!(delay >= MIN_PERIOD);
            assert!(delay <= Duration::from_secs(35));
        }
    }

    #[test]
    fn zero_period_is_raised_to_minimum() {
        let config = ManagerConfig::new("user").with_jitter(Duration::ZERO);
        assert_eq!(config.jittered(Duration::ZERO), MIN_PERIOD);
    }
}
