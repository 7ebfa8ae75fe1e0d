// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run records and the derived-metric formulas.
//!
//! Pace, efficiency and calorie burn are computed from a run plus the
//! owner's physiology profile. Calorie burn uses the Keytel et al.
//! heart-rate regressions, with a VO2max-aware variant when a resting
//! heart rate is on file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::time_utils::format_hms;

use super::profile::{Gender, UserProfile};
use super::{RunId, ShoeId, UserId, CAL_PER_JOULE, METERS_PER_MILE};

const SECONDS_PER_DAY: u32 = 24 * 3600;

/// Elapsed time of a single run, normalized to whole seconds.
///
/// Durations must stay below 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunDuration(u32);

impl RunDuration {
    /// Build a duration from potentially "improper" parts (e.g. seconds=125):
    /// overflow carries into minutes, then hours.
    pub fn from_parts(hours: u32, minutes: u32, seconds: u32) -> Result<Self> {
        let total = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
            .and_then(|t| t.checked_add(seconds))
            .ok_or(AppError::DurationOverflow)?;

        if total >= SECONDS_PER_DAY {
            return Err(AppError::DurationOverflow);
        }
        Ok(Self(total))
    }

    pub fn total_seconds(self) -> u32 {
        self.0
    }

    pub fn hours(self) -> u32 {
        self.0 / 3600
    }

    pub fn minutes(self) -> u32 {
        (self.0 % 3600) / 60
    }

    pub fn seconds(self) -> u32 {
        self.0 % 60
    }
}

impl std::fmt::Display for RunDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_hms(u64::from(self.0)))
    }
}

/// Training-intensity tier derived from the ratio of a run's average heart
/// rate to the runner's estimated maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Recovery,
    Endurance,
    Aerobic,
    Threshold,
    Redline,
}

impl Zone {
    /// Map a fraction of maximum heart rate to a tier.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.60 {
            Zone::Recovery
        } else if ratio < 0.70 {
            Zone::Endurance
        } else if ratio < 0.80 {
            Zone::Aerobic
        } else if ratio < 0.90 {
            Zone::Threshold
        } else {
            Zone::Redline
        }
    }
}

/// A single recorded run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    /// Owning user
    pub user: UserId,
    /// Shoe worn, if recorded
    pub shoe: Option<ShoeId>,
    /// Calendar day of the run
    pub date: NaiveDate,
    pub duration: RunDuration,
    /// Distance in miles
    pub distance: f64,
    pub average_heart_rate: Option<u32>,
    /// Total calorie burn, derived via `set_calories`
    pub calories: Option<u32>,
    /// Training zone, derived via `set_zone`
    pub zone: Option<Zone>,
}

impl Run {
    pub fn duration_in_seconds(&self) -> u32 {
        self.duration.total_seconds()
    }

    pub fn distance_in_meters(&self) -> f64 {
        self.distance * METERS_PER_MILE
    }

    /// Total heartbeats over the run (average rate times elapsed minutes).
    pub fn heartbeats(&self) -> Option<f64> {
        self.average_heart_rate
            .map(|hr| f64::from(hr) * f64::from(self.duration_in_seconds()) / 60.0)
    }

    pub fn pace(&self) -> Option<String> {
        compute_pace(u64::from(self.duration_in_seconds()), self.distance)
    }

    /// Distance per heartbeat. 0.0 when no heart rate was recorded.
    pub fn efficiency(&self) -> f64 {
        match self.heartbeats() {
            Some(beats) => compute_efficiency(self.distance_in_meters(), beats),
            None => 0.0,
        }
    }

    /// Average heart rate as a percentage of the runner's estimated maximum.
    pub fn heart_rate_percent(&self, profile: &UserProfile, today: NaiveDate) -> Option<f64> {
        let hr = self.average_heart_rate?;
        let max = profile.maximum_heart_rate(today)?;
        Some(100.0 * f64::from(hr) / max)
    }

    /// Compute and store the calorie burn for this run.
    ///
    /// With a heart rate, weight and age on file the regression formula is
    /// used (gender required). Without a heart rate but with a known weight,
    /// falls back to the rough `weight_lbs * 0.75 * miles` estimate. With
    /// neither, the burn is recorded as 0.
    pub fn set_calories(&mut self, profile: &UserProfile, today: NaiveDate) -> Result<()> {
        let weight_kg = profile.weight_in_kg();
        let age = profile.age_in_years(today);

        let calories = match (self.average_heart_rate, weight_kg, age, profile.weight) {
            (Some(hr), Some(kg), Some(age), _) => {
                let rate = compute_calorie_rate(
                    f64::from(hr),
                    profile.gender,
                    kg,
                    f64::from(age),
                    profile.vo2max(today),
                )?;
                (rate * f64::from(self.duration_in_seconds())) as u32
            }
            (None, _, _, Some(lbs)) => (f64::from(lbs) * 0.75 * self.distance) as u32,
            _ => 0,
        };

        self.calories = Some(calories);
        Ok(())
    }

    /// Compute and store the training zone for this run.
    ///
    /// Requires an average heart rate and a birthday on file, `None` otherwise.
    pub fn set_zone(&mut self, profile: &UserProfile, today: NaiveDate) {
        self.zone = self
            .heart_rate_percent(profile, today)
            .map(|percent| Zone::from_ratio(percent / 100.0));
    }
}

/// Seconds-per-mile pace formatted as `[H:]M:SS`, rounded to the nearest
/// second. `None` when there is no distance to pace against.
pub fn compute_pace(duration_seconds: u64, distance: f64) -> Option<String> {
    if distance > 0.0 {
        let per_mile = (duration_seconds as f64 / distance).round() as u64;
        Some(format_hms(per_mile))
    } else {
        None
    }
}

/// Distance covered per heartbeat. Returns the 0.0 sentinel when there are no
/// heartbeats; aggregates surface that as "no data".
pub fn compute_efficiency(distance_in_meters: f64, heartbeats: f64) -> f64 {
    if heartbeats > 0.0 {
        distance_in_meters / heartbeats
    } else {
        0.0
    }
}

/// Calorie burn rate in kcal per second (Keytel et al. regressions).
///
/// Uses the VO2max-aware coefficients when an estimate is available, the
/// plain heart-rate regression otherwise. The regressions yield kJ/min;
/// the result is converted to kcal and divided down to per-second.
pub fn compute_calorie_rate(
    heart_rate: f64,
    gender: Option<Gender>,
    weight_kg: f64,
    age_years: f64,
    vo2max: Option<f64>,
) -> Result<f64> {
    let gender = gender.ok_or(AppError::GenderNotSet)?;

    let kj_per_min = match (vo2max, gender) {
        (Some(vo2max), Gender::Male) => {
            -59.3954 - 36.3781
                + 0.217 * age_years
                + 0.634 * heart_rate
                + 0.394 * weight_kg
                + 0.404 * vo2max
        }
        (Some(vo2max), Gender::Female) => {
            -59.3954 + 0.450 * heart_rate + 0.103 * weight_kg + 0.274 * age_years + 0.380 * vo2max
        }
        (None, Gender::Male) => {
            -55.0969 + 0.6309 * heart_rate + 0.1988 * weight_kg + 0.2017 * age_years
        }
        (None, Gender::Female) => {
            -20.4022 + 0.4472 * heart_rate - 0.1263 * weight_kg + 0.074 * age_years
        }
    };

    Ok(kj_per_min * CAL_PER_JOULE / 60.0)
}
