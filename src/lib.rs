// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runlog: personal running-log aggregation core
//!
//! This crate records runs and shoes, derives per-run metrics (pace,
//! efficiency, calorie burn, heart-rate zone) and serves rolling
//! weekly/monthly aggregates, memoized through a fast cache backed by a
//! persistent store and kept honest by point invalidation on every run
//! mutation. Storage and caching sit behind traits in [`store`]; in-memory
//! adapters are provided.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;
