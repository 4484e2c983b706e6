use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::aggregation::Timestamped;

/// Meal context of a glucose measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    BeforeBreakfast,
    AfterBreakfast,
    BeforeLunch,
    AfterLunch,
    BeforeDinner,
    AfterDinner,
    Bedtime,
}

impl MealType {
    /// Every meal type, in the order of a day
    pub const ALL: [MealType; 7] = [
        MealType::BeforeBreakfast,
        MealType::AfterBreakfast,
        MealType::BeforeLunch,
        MealType::AfterLunch,
        MealType::BeforeDinner,
        MealType::AfterDinner,
        MealType::Bedtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::BeforeBreakfast => "before_breakfast",
            MealType::AfterBreakfast => "after_breakfast",
            MealType::BeforeLunch => "before_lunch",
            MealType::AfterLunch => "after_lunch",
            MealType::BeforeDinner => "before_dinner",
            MealType::AfterDinner => "after_dinner",
            MealType::Bedtime => "bedtime",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|meal| meal.as_str() == s)
            .ok_or_else(|| format!("Unknown meal type: {}", s))
    }
}

/// Domain model for a blood sugar reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodSugarReading {
    pub id: Uuid,

    /// Glucose level in mg/dL
    pub glucose: u16,

    pub meal_type: MealType,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for BloodSugarReading {
    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Request payload for creating a blood sugar reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateBloodSugarRequest {
    /// Glucose level in mg/dL
    #[validate(range(min = 10, max = 1000, message = "Glucose must be between 10 and 1000 mg/dL"))]
    pub glucose: u16,

    pub meal_type: MealType,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Defaults to the current time
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Request payload for changing a stored reading
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateBloodSugarRequest {
    #[validate(range(min = 10, max = 1000, message = "Glucose must be between 10 and 1000 mg/dL"))]
    pub glucose: Option<u16>,

    pub meal_type: Option<MealType>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub recorded_at: Option<DateTime<Utc>>,
}
