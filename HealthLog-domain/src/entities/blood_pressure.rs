use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::aggregation::Timestamped;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureReading {
    /// Unique identifier for the reading
    pub id: Uuid,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,

    /// When the reading was stored
    pub created_at: DateTime<Utc>,
}

impl Timestamped for BloodPressureReading {
    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Request payload for creating a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[validate(schema(function = "validate_create_pair", skip_on_field_errors = true))]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 50, max = 300, message = "Systolic must be between 50 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 30, max = 200, message = "Diastolic must be between 30 and 200"))]
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    #[validate(range(min = 30, max = 220, message = "Pulse must be between 30 and 220"))]
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the reading was taken. Defaults to current time if not provided.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Request payload for changing a stored reading; absent fields are kept
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateBloodPressureRequest {
    #[validate(range(min = 50, max = 300, message = "Systolic must be between 50 and 300"))]
    pub systolic: Option<u16>,

    #[validate(range(min = 30, max = 200, message = "Diastolic must be between 30 and 200"))]
    pub diastolic: Option<u16>,

    #[validate(range(min = 30, max = 220, message = "Pulse must be between 30 and 220"))]
    pub pulse: Option<u16>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub recorded_at: Option<DateTime<Utc>>,
}

fn validate_create_pair(request: &CreateBloodPressureRequest) -> Result<(), ValidationError> {
    validate_pair(request.systolic, request.diastolic)
}

/// Systolic pressure must exceed diastolic pressure
pub fn validate_pair(systolic: u16, diastolic: u16) -> Result<(), ValidationError> {
    if systolic > diastolic {
        Ok(())
    } else {
        let mut error = ValidationError::new("systolic_above_diastolic");
        error.message = Some("Systolic must be greater than diastolic".into());
        Err(error)
    }
}

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic ≥ 180 and/or diastolic ≥ 120)
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Hypertension Stage 1",
            BloodPressureCategory::Hypertension2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        f.write_str(label)
    }
}
