//! Running shoe records.

use serde::{Deserialize, Serialize};

use super::{ShoeId, UserId};

/// A pair of shoes with cumulative mileage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shoe {
    pub id: ShoeId,
    pub user: UserId,
    pub make: String,
    pub model: String,
    /// Cumulative miles, adjusted as runs are added and removed
    pub miles: f64,
    /// False once the shoe is retired
    pub active: bool,
}
