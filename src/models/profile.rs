//! Runner physiology profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ShoeId, UserId, KG_PER_POUND};

/// Self-reported gender, used to select calorie-regression coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Per-account physiology profile.
///
/// Created alongside the user account; every field is optional because
/// runners fill them in over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: UserId,
    pub gender: Option<Gender>,
    /// Body weight in pounds
    pub weight: Option<u32>,
    pub birthday: Option<NaiveDate>,
    pub resting_heart_rate: Option<u32>,
    /// Most recently used shoe (lookup only, cleared when the shoe is deleted)
    pub last_shoe: Option<ShoeId>,
}

impl UserProfile {
    /// Empty profile for a freshly created account.
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            gender: None,
            weight: None,
            birthday: None,
            resting_heart_rate: None,
            last_shoe: None,
        }
    }

    /// Whole years since the birthday, counting 365-day years.
    pub fn age_in_years(&self, today: NaiveDate) -> Option<u32> {
        let birthday = self.birthday?;
        let days = (today - birthday).num_days().max(0);
        Some((days / 365) as u32)
    }

    /// Age-estimated maximum heart rate (205.8 - 0.685 per year of age).
    pub fn maximum_heart_rate(&self, today: NaiveDate) -> Option<f64> {
        let age = self.age_in_years(today)?;
        Some(205.8 - 0.685 * f64::from(age))
    }

    pub fn weight_in_kg(&self) -> Option<f64> {
        self.weight.map(|lbs| f64::from(lbs) * KG_PER_POUND)
    }

    /// VO2max estimated from the maximum/resting heart-rate ratio.
    pub fn vo2max(&self, today: NaiveDate) -> Option<f64> {
        let resting = self.resting_heart_rate?;
        if resting == 0 {
            return None;
        }
        let max = self.maximum_heart_rate(today)?;
        Some(15.0 * max / f64::from(resting))
    }
}
