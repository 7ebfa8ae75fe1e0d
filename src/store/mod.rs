// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage and cache interfaces.
//!
//! The core depends only on these traits. In-memory adapters live in
//! `memory`; database- or cache-backed adapters can be supplied by the
//! embedding application.

pub mod memory;

pub use memory::{
    MemoryAggregateStore, MemoryCache, MemoryProfileStore, MemoryRunRepository,
    MemoryShoeRepository,
};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Aggregate, Run, RunId, Shoe, ShoeId, UserId, UserProfile};

/// Typed queries over the run set.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// All runs whose date falls in `[first_date, last_date]`, for one user
    /// or (with `None`) for everyone.
    async fn runs_in_range(
        &self,
        user: Option<UserId>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Vec<Run>>;

    /// Store a new run, assigning its id.
    async fn create(&self, run: Run) -> Result<Run>;

    /// Overwrite an existing run.
    async fn update(&self, run: &Run) -> Result<()>;

    /// Remove a run, returning it if it existed.
    async fn delete(&self, id: RunId) -> Result<Option<Run>>;

    async fn get(&self, id: RunId) -> Result<Option<Run>>;

    /// Date of the user's earliest run.
    async fn first_run_date(&self, user: UserId) -> Result<Option<NaiveDate>>;
}

/// Shoe records and their cumulative mileage.
#[async_trait]
pub trait ShoeRepository: Send + Sync {
    /// Store a new shoe, assigning its id.
    async fn create(&self, shoe: Shoe) -> Result<Shoe>;

    async fn get(&self, id: ShoeId) -> Result<Option<Shoe>>;

    async fn upsert(&self, shoe: &Shoe) -> Result<()>;

    async fn delete(&self, id: ShoeId) -> Result<Option<Shoe>>;
}

/// Physiology profiles, one per user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user: UserId) -> Result<Option<UserProfile>>;

    async fn upsert(&self, profile: &UserProfile) -> Result<()>;
}

/// Persisted per-user aggregates.
///
/// At most one row may exist per `(user, first_date, last_date)` triple.
/// Backends should enforce this with a storage-level constraint where they
/// can; readers still check and surface duplicates as fatal.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Exact-window lookup. Returns every matching row so the caller can
    /// detect duplicates.
    async fn find(
        &self,
        user: UserId,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Vec<Aggregate>>;

    async fn insert(&self, aggregate: &Aggregate) -> Result<()>;

    /// Rows whose window contains `date`.
    async fn find_containing(&self, user: UserId, date: NaiveDate) -> Result<Vec<Aggregate>>;

    /// Bulk-delete rows whose window contains `date`; returns the count removed.
    async fn delete_containing(&self, user: UserId, date: NaiveDate) -> Result<usize>;
}

/// Key-value cache in front of the aggregate store.
///
/// Values are JSON strings so external caches are expressible; there are no
/// TTL semantics, eviction is always explicit.
#[async_trait]
pub trait FastCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Batched lookup; the result is positionally aligned with `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    async fn delete_many(&self, keys: &[String]) -> Result<()>;
}
