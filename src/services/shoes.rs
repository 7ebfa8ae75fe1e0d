// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoe lifecycle: add, retire, delete.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Shoe, ShoeId, UserId};
use crate::store::{ProfileStore, ShoeRepository};

/// Unvalidated shoe input.
#[derive(Debug, Clone)]
pub struct ShoeInput {
    pub user: UserId,
    pub make: String,
    pub model: String,
    /// Mileage already on the shoe when it is registered
    pub miles: f64,
}

/// Manages shoe records and the profile's `last_shoe` back-reference.
pub struct ShoeService {
    shoes: Arc<dyn ShoeRepository>,
    profiles: Arc<dyn ProfileStore>,
}

impl ShoeService {
    pub fn new(shoes: Arc<dyn ShoeRepository>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { shoes, profiles }
    }

    pub async fn add_shoe(&self, input: ShoeInput) -> Result<Shoe> {
        if input.make.trim().is_empty() || input.model.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "shoe make and model must be set".to_string(),
            ));
        }
        if !input.miles.is_finite() || input.miles < 0.0 {
            return Err(AppError::InvalidInput(
                "shoe miles must not be negative".to_string(),
            ));
        }

        let shoe = self
            .shoes
            .create(Shoe {
                id: 0,
                user: input.user,
                make: input.make,
                model: input.model,
                miles: input.miles,
                active: true,
            })
            .await?;
        tracing::info!(user = shoe.user, shoe_id = shoe.id, "Shoe added");
        Ok(shoe)
    }

    /// Mark a shoe retired; it keeps its mileage but stops being offered.
    pub async fn retire_shoe(&self, id: ShoeId) -> Result<Shoe> {
        let mut shoe = self
            .shoes
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shoe {}", id)))?;
        shoe.active = false;
        self.shoes.upsert(&shoe).await?;
        tracing::info!(user = shoe.user, shoe_id = shoe.id, "Shoe retired");
        Ok(shoe)
    }

    /// Delete a shoe, clearing the owner's `last_shoe` back-reference if it
    /// pointed here.
    pub async fn delete_shoe(&self, id: ShoeId) -> Result<Shoe> {
        let shoe = self
            .shoes
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shoe {}", id)))?;

        if let Some(mut profile) = self.profiles.get(shoe.user).await? {
            if profile.last_shoe == Some(id) {
                profile.last_shoe = None;
                self.profiles.upsert(&profile).await?;
            }
        }

        tracing::info!(user = shoe.user, shoe_id = shoe.id, "Shoe removed");
        Ok(shoe)
    }
}
