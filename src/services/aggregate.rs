// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregate lookup, caching and invalidation.
//!
//! Lookups go through two layers before recomputing:
//! 1. the fast cache (keyed by grain + scope + window start),
//! 2. the persistent aggregate store (per-user windows only),
//! 3. a fresh fold over the run repository, which is then written back.
//!
//! Run mutations trigger point invalidation: every cached/persisted window
//! containing the mutated date is evicted, and the next read recomputes.
//! Concurrent misses for one key may both compute and both write; the
//! values are identical for a fixed run set, so last-write-wins is fine.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Aggregate, UserId};
use crate::services::window::{self, Grain};
use crate::store::{AggregateStore, FastCache, RunRepository};

/// Trailing week and month aggregates for the landing page.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub weeks: Vec<Aggregate>,
    pub months: Vec<Aggregate>,
}

/// Whole-history report with adaptive granularity.
///
/// Short histories are reported week by week; once the account spans more
/// months than the configured threshold, the report switches to month
/// buckets so its length stays bounded.
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub grain: Grain,
    pub aggregates: Vec<Aggregate>,
}

/// Two-level memoized aggregate lookup over the run set.
pub struct AggregateService {
    config: Config,
    runs: Arc<dyn RunRepository>,
    store: Arc<dyn AggregateStore>,
    cache: Arc<dyn FastCache>,
}

impl AggregateService {
    pub fn new(
        config: Config,
        runs: Arc<dyn RunRepository>,
        store: Arc<dyn AggregateStore>,
        cache: Arc<dyn FastCache>,
    ) -> Self {
        Self {
            config,
            runs,
            store,
            cache,
        }
    }

    // ─── Window Lookups ──────────────────────────────────────────

    /// Aggregate for the calendar week containing `date`.
    ///
    /// `user = None` aggregates over everyone's runs.
    pub async fn get_week_aggregate(
        &self,
        user: Option<UserId>,
        date: NaiveDate,
    ) -> Result<Aggregate> {
        let (first_date, last_date) = window::surrounding_week(date);
        self.get_window(Grain::Week, user, first_date, last_date)
            .await
    }

    /// Aggregate for the calendar month containing `date`.
    pub async fn get_month_aggregate(
        &self,
        user: Option<UserId>,
        date: NaiveDate,
    ) -> Result<Aggregate> {
        let (first_date, last_date) = window::surrounding_month(date);
        self.get_window(Grain::Month, user, first_date, last_date)
            .await
    }

    /// `count` week aggregates, the week containing `start` first, then each
    /// preceding week.
    pub async fn aggregates_by_week(
        &self,
        user: Option<UserId>,
        start: NaiveDate,
        count: u32,
    ) -> Result<Vec<Aggregate>> {
        let windows = window::trailing_weeks(start, count);
        self.get_windows(Grain::Week, user, &windows).await
    }

    /// `count` month aggregates, most recent first, wrapping year boundaries.
    pub async fn aggregates_by_month(
        &self,
        user: Option<UserId>,
        start: NaiveDate,
        count: u32,
    ) -> Result<Vec<Aggregate>> {
        let windows = window::trailing_months(start, count);
        self.get_windows(Grain::Month, user, &windows).await
    }

    /// Trailing weeks and months at the configured dashboard scales.
    pub async fn dashboard(&self, user: Option<UserId>, today: NaiveDate) -> Result<Dashboard> {
        Ok(Dashboard {
            weeks: self
                .aggregates_by_week(user, today, self.config.weekly_scale)
                .await?,
            months: self
                .aggregates_by_month(user, today, self.config.monthly_scale)
                .await?,
        })
    }

    /// Every bucket from the user's first run through `today`, week-grained
    /// for short histories and month-grained beyond the configured threshold.
    pub async fn history_report(&self, user: UserId, today: NaiveDate) -> Result<HistoryReport> {
        let Some(first) = self.first_run_date(user).await? else {
            return Ok(HistoryReport {
                grain: Grain::Week,
                aggregates: Vec::new(),
            });
        };

        let months = window::months_in_range(first, today);
        if months <= self.config.history_month_threshold {
            let scale = window::weeks_in_range(first, today);
            Ok(HistoryReport {
                grain: Grain::Week,
                aggregates: self.aggregates_by_week(Some(user), today, scale).await?,
            })
        } else {
            Ok(HistoryReport {
                grain: Grain::Month,
                aggregates: self.aggregates_by_month(Some(user), today, months).await?,
            })
        }
    }

    // ─── Invalidation ────────────────────────────────────────────

    /// Evict and delete every aggregate whose window contains `date`.
    ///
    /// Point invalidation only: nothing is recomputed here, the next read
    /// rebuilds lazily from the run repository.
    pub async fn invalidate(&self, user: UserId, date: NaiveDate) -> Result<()> {
        let stale = self.store.find_containing(user, date).await?;

        let mut keys = Vec::with_capacity(stale.len() * 2 + 2);
        for aggregate in &stale {
            keys.push(cache_key(Grain::Week, Some(user), aggregate.first_date));
            keys.push(cache_key(Grain::Month, Some(user), aggregate.first_date));
        }

        // The containing week/month keys are derivable straight from `date`.
        // Evict them unconditionally: cached entries whose store row is
        // missing (degraded write, "everyone" scope) are not in `stale`.
        let (week_first, _) = window::surrounding_week(date);
        let (month_first, _) = window::surrounding_month(date);
        for scope in [Some(user), None] {
            keys.push(cache_key(Grain::Week, scope, week_first));
            keys.push(cache_key(Grain::Month, scope, month_first));
        }

        self.cache.delete_many(&keys).await?;
        let deleted = self.store.delete_containing(user, date).await?;

        tracing::debug!(user, %date, deleted, "Invalidated aggregates");
        Ok(())
    }

    // ─── First-Run Date ──────────────────────────────────────────

    /// Date of the user's earliest run, memoized in the fast cache. Used to
    /// size whole-history reports.
    pub async fn first_run_date(&self, user: UserId) -> Result<Option<NaiveDate>> {
        let key = first_run_key(user);
        if let Some(date) = self.cached_first_run(&key).await? {
            return Ok(Some(date));
        }

        let first = self.runs.first_run_date(user).await?;
        if let Some(date) = first {
            if let Err(err) = self.cache.set(&key, &date.to_string()).await {
                tracing::warn!(error = %err, user, "Failed to cache first-run date");
            }
        }
        Ok(first)
    }

    /// Drop the cached first-run date; the next report recomputes it.
    pub async fn reset_first_run_date(&self, user: UserId) -> Result<()> {
        self.cache.delete(&first_run_key(user)).await
    }

    /// Keep the first-run cache honest after a run is created: a run earlier
    /// than the cached date invalidates it.
    pub async fn note_run_added(&self, user: UserId, date: NaiveDate) -> Result<()> {
        let key = first_run_key(user);
        if let Some(cached) = self.cached_first_run(&key).await? {
            if date < cached {
                self.cache.delete(&key).await?;
            }
        }
        Ok(())
    }

    /// Keep the first-run cache honest after a run is removed: deleting a run
    /// on the cached date invalidates it.
    pub async fn note_run_removed(&self, user: UserId, date: NaiveDate) -> Result<()> {
        let key = first_run_key(user);
        if let Some(cached) = self.cached_first_run(&key).await? {
            if date <= cached {
                self.cache.delete(&key).await?;
            }
        }
        Ok(())
    }

    async fn cached_first_run(&self, key: &str) -> Result<Option<NaiveDate>> {
        let Some(raw) = self.cache.get(key).await? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                tracing::warn!(key, "Discarding unparseable first-run cache entry");
                self.cache.delete(key).await?;
                Ok(None)
            }
        }
    }

    // ─── Lookup Internals ────────────────────────────────────────

    async fn get_window(
        &self,
        grain: Grain,
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Aggregate> {
        let key = cache_key(grain, user, first_date);
        if let Some(aggregate) = self.cache_get(&key).await {
            tracing::debug!(%key, "Aggregate cache hit");
            return Ok(aggregate);
        }

        let aggregate = self.load_or_compute(user, first_date, last_date).await?;
        self.cache_put(&key, &aggregate).await;
        Ok(aggregate)
    }

    /// Batched variant: one `get_many` round trip for the whole scale, then
    /// per-window fallthrough for the misses.
    async fn get_windows(
        &self,
        grain: Grain,
        user: Option<UserId>,
        windows: &[(NaiveDate, NaiveDate)],
    ) -> Result<Vec<Aggregate>> {
        let keys: Vec<String> = windows
            .iter()
            .map(|(first_date, _)| cache_key(grain, user, *first_date))
            .collect();

        let cached = match self.cache.get_many(&keys).await {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(error = %err, "Cache read failed, recomputing windows");
                vec![None; keys.len()]
            }
        };

        let mut aggregates = Vec::with_capacity(windows.len());
        for (((first_date, last_date), key), hit) in windows.iter().zip(&keys).zip(cached) {
            let aggregate = match hit.and_then(|raw| decode_aggregate(key, &raw)) {
                Some(aggregate) => aggregate,
                None => {
                    let aggregate = self.load_or_compute(user, *first_date, *last_date).await?;
                    self.cache_put(key, &aggregate).await;
                    aggregate
                }
            };
            aggregates.push(aggregate);
        }
        Ok(aggregates)
    }

    /// Store lookup with the uniqueness check, falling back to a fresh fold.
    async fn load_or_compute(
        &self,
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Aggregate> {
        if let Some(owner) = user {
            let mut found = self.store.find(owner, first_date, last_date).await?;
            if found.len() > 1 {
                return Err(AppError::DuplicateAggregates {
                    user: owner,
                    first_date,
                    last_date,
                    count: found.len(),
                });
            }
            if let Some(aggregate) = found.pop() {
                tracing::debug!(user = owner, %first_date, "Aggregate store hit");
                return Ok(aggregate);
            }
        }

        self.compute_and_persist(user, first_date, last_date).await
    }

    async fn compute_and_persist(
        &self,
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Aggregate> {
        let runs = self
            .runs
            .runs_in_range(user, first_date, last_date)
            .await?;
        let aggregate = Aggregate::compute(user, first_date, last_date, &runs);
        tracing::debug!(
            user = ?user,
            %first_date,
            %last_date,
            runs = runs.len(),
            "Aggregate computed"
        );

        if user.is_some() {
            if let Err(err) = self.store.insert(&aggregate).await {
                tracing::warn!(error = %err, "Failed to persist aggregate, will recompute on next miss");
            }
        }
        Ok(aggregate)
    }

    async fn cache_get(&self, key: &str) -> Option<Aggregate> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => decode_aggregate(key, &raw),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, key, "Cache read failed");
                None
            }
        }
    }

    async fn cache_put(&self, key: &str, aggregate: &Aggregate) {
        match serde_json::to_string(aggregate) {
            Ok(raw) => {
                if let Err(err) = self.cache.set(key, &raw).await {
                    tracing::warn!(error = %err, key, "Cache write failed");
                }
            }
            Err(err) => tracing::warn!(error = %err, key, "Aggregate serialization failed"),
        }
    }
}

fn decode_aggregate(key: &str, raw: &str) -> Option<Aggregate> {
    match serde_json::from_str(raw) {
        Ok(aggregate) => Some(aggregate),
        Err(err) => {
            tracing::warn!(error = %err, key, "Discarding undecodable cache entry");
            None
        }
    }
}

/// `{grain}:{scope}:{window start}`; window ends are implied because weeks
/// and months have fixed lengths from a start date.
fn cache_key(grain: Grain, user: Option<UserId>, first_date: NaiveDate) -> String {
    match user {
        Some(id) => format!("{}:u{}:{}", grain.as_str(), id, first_date),
        None => format!("{}:all:{}", grain.as_str(), first_date),
    }
}

fn first_run_key(user: UserId) -> String {
    format!("first_run:u{}", user)
}
