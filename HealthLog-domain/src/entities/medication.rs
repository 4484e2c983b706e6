use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::aggregation::Timestamped;

/// A medication the user tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicationRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    /// e.g. "10mg"
    #[validate(length(min = 1, max = 100, message = "Dosage is required"))]
    pub dosage: String,

    /// e.g. "Once daily"
    #[validate(length(min = 1, max = 100, message = "Frequency is required"))]
    pub frequency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateMedicationRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Dosage is required"))]
    pub dosage: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Frequency is required"))]
    pub frequency: Option<String>,

    pub is_active: Option<bool>,
}

/// A logged dose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub taken: bool,
    pub notes: Option<String>,
    pub taken_at: DateTime<Utc>,
}

impl Timestamped for MedicationLog {
    fn recorded_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

fn default_taken() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicationLogRequest {
    pub medication_id: Uuid,

    /// Defaults to `true`
    #[serde(default = "default_taken")]
    pub taken: bool,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// Defaults to the current time
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateMedicationLogRequest {
    pub taken: Option<bool>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub taken_at: Option<DateTime<Utc>>,
}

/// A dose log joined with the medication it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MedicationLogDetail {
    pub id: Uuid,
    pub medication_id: Uuid,
    /// `None` when the medication no longer exists
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub taken: bool,
    pub notes: Option<String>,
    pub taken_at: DateTime<Utc>,
}
