// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregate;
pub mod runs;
pub mod shoes;
pub mod window;

pub use aggregate::{AggregateService, Dashboard, HistoryReport};
pub use runs::{RunInput, RunService};
pub use shoes::{ShoeInput, ShoeService};
pub use window::Grain;
