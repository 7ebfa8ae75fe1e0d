// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use runlog::config::Config;
use runlog::models::{Gender, UserId, UserProfile};
use runlog::services::{AggregateService, RunInput, RunService, ShoeService};
use runlog::store::{
    MemoryAggregateStore, MemoryCache, MemoryProfileStore, MemoryRunRepository,
    MemoryShoeRepository, ProfileStore,
};

/// Fully wired in-memory application.
/// Raw adapters are exposed so tests can poke at state behind the services.
#[allow(dead_code)]
pub struct TestApp {
    pub run_repo: Arc<MemoryRunRepository>,
    pub shoe_repo: Arc<MemoryShoeRepository>,
    pub profiles: Arc<MemoryProfileStore>,
    pub store: Arc<MemoryAggregateStore>,
    pub cache: Arc<MemoryCache>,
    pub aggregates: Arc<AggregateService>,
    pub runs: RunService,
    pub shoes: ShoeService,
}

#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> TestApp {
    init_tracing();

    let run_repo = Arc::new(MemoryRunRepository::default());
    let shoe_repo = Arc::new(MemoryShoeRepository::default());
    let profiles = Arc::new(MemoryProfileStore::default());
    let store = Arc::new(MemoryAggregateStore::default());
    let cache = Arc::new(MemoryCache::default());

    let aggregates = Arc::new(AggregateService::new(
        config,
        run_repo.clone(),
        store.clone(),
        cache.clone(),
    ));
    let runs = RunService::new(
        run_repo.clone(),
        shoe_repo.clone(),
        profiles.clone(),
        aggregates.clone(),
    );
    let shoes = ShoeService::new(shoe_repo.clone(), profiles.clone());

    TestApp {
        run_repo,
        shoe_repo,
        profiles,
        store,
        cache,
        aggregates,
        runs,
        shoes,
    }
}

/// Store a male, 160 lbs, 30-year-old profile for `user`.
///
/// The birthday is pinned relative to the wall clock so the derived age is
/// exactly 30 whenever the tests run.
#[allow(dead_code)]
pub async fn seed_profile(app: &TestApp, user: UserId) -> UserProfile {
    let profile = UserProfile {
        user,
        gender: Some(Gender::Male),
        weight: Some(160),
        birthday: Some(Utc::now().date_naive() - Days::new(10958)),
        resting_heart_rate: None,
        last_shoe: None,
    };
    app.profiles.upsert(&profile).await.unwrap();
    profile
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Run input with sane defaults: whole minutes, no shoe.
#[allow(dead_code)]
pub fn run_input(
    user: UserId,
    date: NaiveDate,
    minutes: u32,
    distance: f64,
    heart_rate: Option<u32>,
) -> RunInput {
    RunInput {
        user,
        date,
        hours: 0,
        minutes,
        seconds: 0,
        distance,
        average_heart_rate: heart_rate,
        shoe: None,
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
