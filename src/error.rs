// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use chrono::NaiveDate;

use crate::models::UserId;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duration must not exceed 24 hours")]
    DurationOverflow,

    #[error("Gender must be set to compute calories")]
    GenderNotSet,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// More than one persisted aggregate exists for a single window. This is a
    /// data-integrity failure: retrying cannot fix it, an operator has to clean
    /// up the aggregate store by hand.
    #[error("{count} aggregates stored for user {user} at {first_date} - {last_date}")]
    DuplicateAggregates {
        user: UserId,
        first_date: NaiveDate,
        last_date: NaiveDate,
        count: usize,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors that indicate corrupted persisted state rather than a
    /// transient failure. Callers must not retry these.
    pub fn is_consistency_violation(&self) -> bool {
        matches!(self, AppError::DuplicateAggregates { .. })
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, AppError>;
