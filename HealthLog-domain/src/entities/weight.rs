use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::aggregation::Timestamped;

/// Domain model for a weight reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WeightReading {
    pub id: Uuid,

    /// Body weight in kilograms
    pub weight: f64,

    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for WeightReading {
    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Request payload for creating a weight reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateWeightRequest {
    /// Body weight in kilograms
    #[validate(range(min = 10.0, max = 1000.0, message = "Weight must be between 10 and 1000 kg"))]
    pub weight: f64,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateWeightRequest {
    #[validate(range(min = 10.0, max = 1000.0, message = "Weight must be between 10 and 1000 kg"))]
    pub weight: Option<f64>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub recorded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_range() {
        let request = CreateWeightRequest { weight: 72.4, notes: None, recorded_at: None };
        assert!(request.validate().is_ok());

        for weight in [5.0, 1200.0, f64::INFINITY] {
            let request = CreateWeightRequest { weight, ..request.clone() };
            assert!(request.validate().is_err(), "weight {} accepted", weight);
        }
    }
}
