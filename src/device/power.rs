// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instantaneous power estimation from hourly energy buckets.

use chrono::{NaiveDateTime, Timelike};

use crate::error::EnergyError;

/// Estimates power draw from successive energy samples.
///
/// The cloud only reports energy per local hour. Each call takes the bucket
/// of the current hour, compares it with the previous sample and divides the
/// energy difference by the elapsed time.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use toshiba_ac_lib::device::PowerEstimator;
///
/// let mut today = vec![0.0; 24];
/// today[10] = 100.0;
///
/// let at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(10, 30, 0).unwrap();
/// let mut estimator = PowerEstimator::new();
///
/// // First sample: 100 Wh since 10:00, i.e. over 1800 s.
/// assert_eq!(estimator.estimate(at, None, &today).unwrap(), 200.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerEstimator {
    last_energy: Option<f64>,
    last_update: Option<NaiveDateTime>,
    power: Option<f64>,
}

impl PowerEstimator {
    /// Creates an estimator without samples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last estimated power in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.power
    }

    /// Energy bucket value of the last sample, in watt-hours.
    #[must_use]
    pub fn last_energy(&self) -> Option<f64> {
        self.last_energy
    }

    /// Time of the last sample.
    #[must_use]
    pub fn last_update(&self) -> Option<NaiveDateTime> {
        self.last_update
    }

    /// Records a sample taken at local time `now` and returns the power in watts.
    ///
    /// `today` holds the buckets of the current local day. `yesterday` holds
    /// the buckets of the previous day; it is only used at midnight and may
    /// be `None`, in which case the previous hour counts as 0 Wh.
    ///
    /// # Errors
    ///
    /// Returns `EnergyError::MissingBucket` if `today` has no bucket for the
    /// current (or, after midnight, the previous) hour, and
    /// `EnergyError::ZeroElapsed` if no time passed since the previous
    /// sample. The estimator is left unchanged on error.
    pub fn estimate(
        &mut self,
        now: NaiveDateTime,
        yesterday: Option<&[f64]>,
        today: &[f64],
    ) -> Result<f64, EnergyError> {
        let hour = now.hour();
        let bucket = |h: u32| {
            usize::try_from(h)
                .ok()
                .and_then(|i| today.get(i).copied())
                .ok_or(EnergyError::MissingBucket(h))
        };

        let current = bucket(hour)?;
        let previous_hour = if hour == 0 {
            yesterday.and_then(|buckets| buckets.last().copied()).unwrap_or(0.0)
        } else {
            bucket(hour - 1)?
        };

        let (energy, elapsed) = match (self.last_energy, self.last_update) {
            (Some(last_energy), Some(last_update)) => {
                let energy = if last_update.hour() == hour {
                    current - last_energy
                } else {
                    // The previous hour's bucket is final now.
                    previous_hour - last_energy + current
                };
                let elapsed = (now - last_update)
                    .to_std()
                    .map_or(0.0, |d| d.as_secs_f64());
                (energy, elapsed)
            }
            _ => (current, f64::from(now.minute() * 60 + now.second())),
        };

        if elapsed <= 0.0 {
            return Err(EnergyError::ZeroElapsed);
        }

        // Wh to J, then J/s.
        let power = energy * 3600.0 / elapsed;

        self.last_energy = Some(current);
        self.last_update = Some(now);
        self.power = Some(power);
        Ok(power)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn buckets(values: &[(usize, f64)]) -> Vec<f64> {
        let mut buckets = vec![0.0; 24];
        for &(hour, energy) in values {
            buckets[hour] = energy;
        }
        buckets
    }

    #[test]
    fn first_sample_uses_time_since_top_of_hour() {
        let mut estimator = PowerEstimator::new();
        let power = estimator
            .estimate(at(1, 10, 30), None, &buckets(&[(10, 100.0)]))
            .unwrap();

        assert!((power - 200.0).abs() < 1e-9);
        assert_eq!(estimator.last_energy(), Some(100.0));
        assert_eq!(estimator.last_update(), Some(at(1, 10, 30)));
    }

    #[test]
    fn same_hour_uses_bucket_difference() {
        let mut estimator = PowerEstimator::new();
        estimator
            .estimate(at(1, 10, 15), None, &buckets(&[(10, 100.0)]))
            .unwrap();
        let power = estimator
            .estimate(at(1, 10, 45), None, &buckets(&[(10, 110.0)]))
            .unwrap();

        assert!((power - 20.0).abs() < 1e-9);
        assert_eq!(estimator.power(), Some(power));
    }

    #[test]
    fn hour_rollover_adds_previous_bucket_remainder() {
        let mut estimator = PowerEstimator::new();
        estimator
            .estimate(at(1, 10, 59), None, &buckets(&[(10, 150.0)]))
            .unwrap();
        let power = estimator
            .estimate(at(1, 11, 2), None, &buckets(&[(10, 150.0), (11, 5.0)]))
            .unwrap();

        // 5 Wh over 180 s
        assert!((power - 100.0).abs() < 1e-9);
    }

    #[test]
    fn midnight_uses_yesterday_last_bucket() {
        let mut estimator = PowerEstimator::new();
        estimator
            .estimate(at(1, 23, 50), None, &buckets(&[(23, 180.0)]))
            .unwrap();

        let yesterday = buckets(&[(23, 200.0)]);
        let power = estimator
            .estimate(at(2, 0, 10), Some(&yesterday), &buckets(&[(0, 3.0)]))
            .unwrap();

        // 200 - 180 + 3 = 23 Wh over 1200 s
        assert!((power - 69.0).abs() < 1e-9);
    }

    #[test]
    fn midnight_without_yesterday_counts_zero() {
        let mut estimator = PowerEstimator::new();
        estimator
            .estimate(at(1, 23, 50), None, &buckets(&[(23, 180.0)]))
            .unwrap();
        let power = estimator
            .estimate(at(2, 0, 10), None, &buckets(&[(0, 200.0)]))
            .unwrap();

        // 0 - 180 + 200 = 20 Wh over 1200 s
        assert!((power - 60.0).abs() < 1e-9);
    }

    #[test]
    fn missing_bucket_is_an_error() {
        let mut estimator = PowerEstimator::new();
        let err = estimator
            .estimate(at(1, 10, 30), None, &[1.0, 2.0])
            .unwrap_err();
        assert_eq!(err, EnergyError::MissingBucket(10));
        assert_eq!(estimator, PowerEstimator::new());
    }

    #[test]
    fn zero_elapsed_time_is_an_error() {
        let mut estimator = PowerEstimator::new();
        let today = buckets(&[(10, 100.0)]);
        estimator.estimate(at(1, 10, 30), None, &today).unwrap();
        let before = estimator.clone();

        let err = estimator.estimate(at(1, 10, 30), None, &today).unwrap_err();
        assert_eq!(err, EnergyError::ZeroElapsed);
        assert_eq!(estimator, before);
    }

    #[test]
    fn first_sample_on_the_hour_is_zero_elapsed() {
        let mut estimator = PowerEstimator::new();
        let err = estimator
            .estimate(at(1, 10, 0), None, &buckets(&[(10, 1.0)]))
            .unwrap_err();
        assert_eq!(err, EnergyError::ZeroElapsed);
    }
}
