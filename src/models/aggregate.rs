// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregate summaries over calendar windows.
//!
//! Computed lazily from the run set and memoized in the cache/store layers,
//! reducing dashboard reads from O(runs) to O(1).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::run::{compute_efficiency, compute_pace, Run};
use super::UserId;

/// Summary of the runs falling in one calendar window.
///
/// Per-user aggregates (`user: Some`) are persisted and cached; the
/// "everyone" variant (`user: None`) only ever lives in the fast cache.
/// Fields with no data are `None`, never zero, so an empty window is
/// distinguishable from a slow one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub user: Option<UserId>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Number of runs in the window
    pub runs: u32,
    /// Total distance in miles
    pub distance: f64,
    /// Shortest single run
    pub minimum: Option<f64>,
    /// Longest single run
    pub maximum: Option<f64>,
    /// Mean distance per run (0 when the window is empty)
    pub average: f64,
    /// Formatted duration per mile
    pub pace: Option<String>,
    /// Meters per heartbeat over the heart-rate-bearing runs
    pub efficiency: Option<f64>,
    /// Meters per second
    pub speed: Option<f64>,
    /// Total calorie burn
    pub calories: u32,
    pub beats_per_second: Option<f64>,
    /// Duration-weighted average heart rate in bpm
    pub heart_rate: Option<f64>,
}

impl Aggregate {
    /// Fold a window's runs into a summary.
    ///
    /// Runs without a stored calorie count contribute 0 calories; runs
    /// without a heart rate are excluded from the efficiency and
    /// heart-rate accumulators.
    pub fn compute(
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
        runs: &[Run],
    ) -> Self {
        let mut duration_secs: u64 = 0;
        let mut distance = 0.0;
        let mut meters = 0.0;
        let mut calories: u32 = 0;
        let mut hr_meters = 0.0;
        let mut hr_secs: u64 = 0;
        let mut heartbeats = 0.0;
        let mut minimum: Option<f64> = None;
        let mut maximum: Option<f64> = None;

        for run in runs {
            duration_secs += u64::from(run.duration_in_seconds());
            distance += run.distance;
            meters += run.distance_in_meters();
            calories += run.calories.unwrap_or(0);
            if let Some(beats) = run.heartbeats() {
                hr_meters += run.distance_in_meters();
                hr_secs += u64::from(run.duration_in_seconds());
                heartbeats += beats;
            }
            minimum = Some(minimum.map_or(run.distance, |m: f64| m.min(run.distance)));
            maximum = Some(maximum.map_or(run.distance, |m: f64| m.max(run.distance)));
        }

        let speed = (duration_secs > 0).then(|| meters / duration_secs as f64);
        let average = if runs.is_empty() {
            0.0
        } else {
            distance / runs.len() as f64
        };
        let efficiency = (heartbeats > 0.0).then(|| compute_efficiency(hr_meters, heartbeats));
        let beats_per_second = (hr_secs > 0).then(|| heartbeats / hr_secs as f64);

        Self {
            user,
            first_date,
            last_date,
            runs: runs.len() as u32,
            distance,
            minimum,
            maximum,
            average,
            pace: compute_pace(duration_secs, distance),
            efficiency,
            speed,
            calories,
            beats_per_second,
            heart_rate: beats_per_second.map(|b| b * 60.0),
        }
    }
}
