// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory adapters backed by `DashMap`.
//!
//! Suitable for tests and single-process deployments. The aggregate store
//! is keyed by the full `(user, first_date, last_date)` triple, which
//! enforces the one-row-per-window constraint structurally.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use super::{AggregateStore, FastCache, ProfileStore, RunRepository, ShoeRepository};
use crate::error::{AppError, Result};
use crate::models::{Aggregate, Run, RunId, Shoe, ShoeId, UserId, UserProfile};

/// In-memory run set.
#[derive(Default)]
pub struct MemoryRunRepository {
    runs: DashMap<RunId, Run>,
    next_id: AtomicU64,
}

#[async_trait]
impl RunRepository for MemoryRunRepository {
    async fn runs_in_range(
        &self,
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self
            .runs
            .iter()
            .filter(|entry| {
                let run = entry.value();
                user.map_or(true, |u| run.user == u)
                    && run.date >= first_date
                    && run.date <= last_date
            })
            .map(|entry| entry.value().clone())
            .collect();
        runs.sort_by_key(|run| (run.date, run.id));
        Ok(runs)
    }

    async fn create(&self, mut run: Run) -> Result<Run> {
        run.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn update(&self, run: &Run) -> Result<()> {
        if !self.runs.contains_key(&run.id) {
            return Err(AppError::NotFound(format!("Run {}", run.id)));
        }
        self.runs.insert(run.id, run.clone());
        Ok(())
    }

    async fn delete(&self, id: RunId) -> Result<Option<Run>> {
        Ok(self.runs.remove(&id).map(|(_, run)| run))
    }

    async fn get(&self, id: RunId) -> Result<Option<Run>> {
        Ok(self.runs.get(&id).map(|entry| entry.value().clone()))
    }

    async fn first_run_date(&self, user: UserId) -> Result<Option<NaiveDate>> {
        Ok(self
            .runs
            .iter()
            .filter(|entry| entry.value().user == user)
            .map(|entry| entry.value().date)
            .min())
    }
}

/// In-memory shoe rack.
#[derive(Default)]
pub struct MemoryShoeRepository {
    shoes: DashMap<ShoeId, Shoe>,
    next_id: AtomicU64,
}

#[async_trait]
impl ShoeRepository for MemoryShoeRepository {
    async fn create(&self, mut shoe: Shoe) -> Result<Shoe> {
        shoe.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.shoes.insert(shoe.id, shoe.clone());
        Ok(shoe)
    }

    async fn get(&self, id: ShoeId) -> Result<Option<Shoe>> {
        Ok(self.shoes.get(&id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, shoe: &Shoe) -> Result<()> {
        self.shoes.insert(shoe.id, shoe.clone());
        Ok(())
    }

    async fn delete(&self, id: ShoeId) -> Result<Option<Shoe>> {
        Ok(self.shoes.remove(&id).map(|(_, shoe)| shoe))
    }
}

/// In-memory profile table.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<UserId, UserProfile>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user: UserId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(&user).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        self.profiles.insert(profile.user, profile.clone());
        Ok(())
    }
}

/// In-memory aggregate store.
#[derive(Default)]
pub struct MemoryAggregateStore {
    aggregates: DashMap<(UserId, NaiveDate, NaiveDate), Aggregate>,
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    async fn find(
        &self,
        user: UserId,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Vec<Aggregate>> {
        Ok(self
            .aggregates
            .get(&(user, first_date, last_date))
            .map(|entry| vec![entry.value().clone()])
            .unwrap_or_default())
    }

    async fn insert(&self, aggregate: &Aggregate) -> Result<()> {
        let Some(user) = aggregate.user else {
            return Err(AppError::Storage(
                "refusing to persist an aggregate without an owner".to_string(),
            ));
        };
        self.aggregates.insert(
            (user, aggregate.first_date, aggregate.last_date),
            aggregate.clone(),
        );
        Ok(())
    }

    async fn find_containing(&self, user: UserId, date: NaiveDate) -> Result<Vec<Aggregate>> {
        Ok(self
            .aggregates
            .iter()
            .filter(|entry| {
                let (owner, first, last) = *entry.key();
                owner == user && first <= date && last >= date
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete_containing(&self, user: UserId, date: NaiveDate) -> Result<usize> {
        let keys: Vec<_> = self
            .aggregates
            .iter()
            .filter(|entry| {
                let (owner, first, last) = *entry.key();
                owner == user && first <= date && last >= date
            })
            .map(|entry| *entry.key())
            .collect();
        for key in &keys {
            self.aggregates.remove(key);
        }
        Ok(keys.len())
    }
}

/// In-memory key-value cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

#[async_trait]
impl FastCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        Ok(keys
            .iter()
            .map(|key| self.entries.get(key).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunDuration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_run(user: UserId, day: u32) -> Run {
        Run {
            id: 0,
            user,
            shoe: None,
            date: date(2021, 6, day),
            duration: RunDuration::from_parts(0, 30, 0).unwrap(),
            distance: 5.0,
            average_heart_rate: None,
            calories: None,
            zone: None,
        }
    }

    #[tokio::test]
    async fn test_runs_in_range_filters_by_user_and_date() {
        let repo = MemoryRunRepository::default();
        repo.create(make_run(1, 10)).await.unwrap();
        repo.create(make_run(1, 15)).await.unwrap();
        repo.create(make_run(2, 15)).await.unwrap();
        repo.create(make_run(1, 20)).await.unwrap();

        let runs = repo
            .runs_in_range(Some(1), date(2021, 6, 14), date(2021, 6, 16))
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].date, date(2021, 6, 15));

        let everyone = repo
            .runs_in_range(None, date(2021, 6, 14), date(2021, 6, 16))
            .await
            .unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[tokio::test]
    async fn test_first_run_date() {
        let repo = MemoryRunRepository::default();
        assert_eq!(repo.first_run_date(1).await.unwrap(), None);

        repo.create(make_run(1, 15)).await.unwrap();
        repo.create(make_run(1, 10)).await.unwrap();
        repo.create(make_run(2, 5)).await.unwrap();

        assert_eq!(repo.first_run_date(1).await.unwrap(), Some(date(2021, 6, 10)));
    }

    #[tokio::test]
    async fn test_aggregate_store_enforces_one_row_per_window() {
        let store = MemoryAggregateStore::default();
        let first = date(2021, 6, 14);
        let last = date(2021, 6, 20);

        let ag = Aggregate::compute(Some(1), first, last, &[]);
        store.insert(&ag).await.unwrap();
        store.insert(&ag).await.unwrap();

        assert_eq!(store.find(1, first, last).await.unwrap().len(), 1);
        assert_eq!(store.find_containing(1, date(2021, 6, 16)).await.unwrap().len(), 1);
        assert_eq!(store.delete_containing(1, date(2021, 6, 16)).await.unwrap(), 1);
        assert!(store.find(1, first, last).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_store_rejects_ownerless_rows() {
        let store = MemoryAggregateStore::default();
        let ag = Aggregate::compute(None, date(2021, 6, 14), date(2021, 6, 20), &[]);
        assert!(store.insert(&ag).await.is_err());
    }

    #[tokio::test]
    async fn test_cache_many_operations() {
        let cache = MemoryCache::default();
        cache.set("a", "1").await.unwrap();
        cache.set("b", "2").await.unwrap();

        let keys = vec!["a".to_string(), "missing".to_string(), "b".to_string()];
        let values = cache.get_many(&keys).await.unwrap();
        assert_eq!(values, vec![Some("1".to_string()), None, Some("2".to_string())]);

        cache.delete_many(&keys).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap(), None);
    }
}
