// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run mutation orchestration.
//!
//! Creating, updating or deleting a run is one logical unit: validate the
//! input, compute the derived metrics, write the run, adjust shoe mileage,
//! and invalidate the aggregates covering the affected date(s). The
//! invalidation step always runs after the run write has succeeded.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{Run, RunDuration, RunId, ShoeId, UserId};
use crate::services::AggregateService;
use crate::store::{ProfileStore, RunRepository, ShoeRepository};

/// Unvalidated run input, as submitted by a form or importer.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub user: UserId,
    pub date: NaiveDate,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// Distance in miles
    pub distance: f64,
    pub average_heart_rate: Option<u32>,
    pub shoe: Option<ShoeId>,
}

impl RunInput {
    /// Boundary validation; rejected input never reaches the aggregate engine.
    fn validate(&self) -> Result<()> {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(AppError::InvalidInput(
                "distance must be positive".to_string(),
            ));
        }
        if self.average_heart_rate == Some(0) {
            return Err(AppError::InvalidInput(
                "average heart rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Orchestrates run mutations and their side effects.
pub struct RunService {
    runs: Arc<dyn RunRepository>,
    shoes: Arc<dyn ShoeRepository>,
    profiles: Arc<dyn ProfileStore>,
    aggregates: Arc<AggregateService>,
}

impl RunService {
    pub fn new(
        runs: Arc<dyn RunRepository>,
        shoes: Arc<dyn ShoeRepository>,
        profiles: Arc<dyn ProfileStore>,
        aggregates: Arc<AggregateService>,
    ) -> Self {
        Self {
            runs,
            shoes,
            profiles,
            aggregates,
        }
    }

    /// Record a new run.
    ///
    /// Derived metrics are computed from the owner's profile before the
    /// write. A worn shoe gains the run's distance and becomes the
    /// profile's `last_shoe`.
    pub async fn create_run(&self, input: RunInput) -> Result<Run> {
        input.validate()?;
        let duration = RunDuration::from_parts(input.hours, input.minutes, input.seconds)?;
        let profile = self.get_profile(input.user).await?;
        self.check_shoe(input.shoe).await?;

        let today = Utc::now().date_naive();
        let mut run = Run {
            id: 0,
            user: input.user,
            shoe: input.shoe,
            date: input.date,
            duration,
            distance: input.distance,
            average_heart_rate: input.average_heart_rate,
            calories: None,
            zone: None,
        };
        run.set_calories(&profile, today)?;
        run.set_zone(&profile, today);

        let run = self.runs.create(run).await?;

        self.aggregates.invalidate(run.user, run.date).await?;
        self.aggregates.note_run_added(run.user, run.date).await?;

        if let Some(shoe_id) = run.shoe {
            self.adjust_shoe_miles(shoe_id, run.distance).await?;

            let mut profile = profile;
            profile.last_shoe = Some(shoe_id);
            self.profiles.upsert(&profile).await?;
        }

        tracing::info!(
            user = run.user,
            run_id = run.id,
            date = %run.date,
            distance = run.distance,
            "Run recorded"
        );
        Ok(run)
    }

    /// Rewrite an existing run from fresh input.
    ///
    /// Derived metrics are recomputed, mileage moves off the old shoe onto
    /// the new one, and the windows around both the old and new date are
    /// invalidated.
    pub async fn update_run(&self, id: RunId, input: RunInput) -> Result<Run> {
        input.validate()?;
        let duration = RunDuration::from_parts(input.hours, input.minutes, input.seconds)?;
        let old = self
            .runs
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {}", id)))?;
        let profile = self.get_profile(input.user).await?;
        self.check_shoe(input.shoe).await?;

        let today = Utc::now().date_naive();
        let mut run = Run {
            id,
            user: input.user,
            shoe: input.shoe,
            date: input.date,
            duration,
            distance: input.distance,
            average_heart_rate: input.average_heart_rate,
            calories: None,
            zone: None,
        };
        run.set_calories(&profile, today)?;
        run.set_zone(&profile, today);

        self.runs.update(&run).await?;

        self.aggregates.invalidate(old.user, old.date).await?;
        if run.date != old.date || run.user != old.user {
            self.aggregates.invalidate(run.user, run.date).await?;
        }
        self.aggregates.note_run_removed(old.user, old.date).await?;
        self.aggregates.note_run_added(run.user, run.date).await?;

        if let Some(shoe_id) = old.shoe {
            self.adjust_shoe_miles(shoe_id, -old.distance).await?;
        }
        if let Some(shoe_id) = run.shoe {
            self.adjust_shoe_miles(shoe_id, run.distance).await?;
        }

        tracing::info!(user = run.user, run_id = run.id, "Run updated");
        Ok(run)
    }

    /// Delete a run: the shoe gives back the mileage, then the affected
    /// aggregates are invalidated.
    pub async fn delete_run(&self, id: RunId) -> Result<Run> {
        let run = self
            .runs
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {}", id)))?;

        if let Some(shoe_id) = run.shoe {
            self.adjust_shoe_miles(shoe_id, -run.distance).await?;
        }

        self.aggregates.invalidate(run.user, run.date).await?;
        self.aggregates.note_run_removed(run.user, run.date).await?;

        tracing::info!(user = run.user, run_id = run.id, date = %run.date, "Run removed");
        Ok(run)
    }

    async fn get_profile(&self, user: UserId) -> Result<crate::models::UserProfile> {
        self.profiles
            .get(user)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", user)))
    }

    /// Reject a dangling shoe reference before anything is written.
    async fn check_shoe(&self, shoe: Option<ShoeId>) -> Result<()> {
        if let Some(id) = shoe {
            if self.shoes.get(id).await?.is_none() {
                return Err(AppError::InvalidInput(format!("unknown shoe id {}", id)));
            }
        }
        Ok(())
    }

    async fn adjust_shoe_miles(&self, id: ShoeId, delta: f64) -> Result<()> {
        if let Some(mut shoe) = self.shoes.get(id).await? {
            shoe.miles += delta;
            self.shoes.upsert(&shoe).await?;
        }
        Ok(())
    }
}
