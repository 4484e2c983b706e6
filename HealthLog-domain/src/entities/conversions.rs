use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use health_log_data::models::{
    BloodPressureRecord, BloodSugarRecord, MedicationLogRecord, MedicationRecord, WeightRecord,
};

use crate::entities::blood_pressure::{BloodPressureReading, CreateBloodPressureRequest};
use crate::entities::blood_sugar::{BloodSugarReading, CreateBloodSugarRequest, MealType};
use crate::entities::medication::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog,
    MedicationLogDetail,
};
use crate::entities::weight::{CreateWeightRequest, WeightReading};

// Conversion functions between domain entities and data models
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Timestamps are kept at the precision they are stored with
pub fn storage_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

pub fn convert_to_domain_blood_pressure(record: BloodPressureRecord) -> BloodPressureReading {
    BloodPressureReading {
        id: record.id,
        systolic: record.systolic,
        diastolic: record.diastolic,
        pulse: record.pulse,
        notes: record.notes,
        recorded_at: record.recorded_at,
        created_at: record.created_at,
    }
}

pub fn convert_to_data_blood_pressure(
    request: CreateBloodPressureRequest,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> BloodPressureRecord {
    let now = storage_precision(now);
    BloodPressureRecord {
        id: Uuid::new_v4(),
        user_id,
        systolic: request.systolic,
        diastolic: request.diastolic,
        pulse: request.pulse,
        notes: request.notes,
        recorded_at: request.recorded_at.map_or(now, storage_precision),
        created_at: now,
    }
}

/// Fails when the stored meal type is not one of the known labels
pub fn convert_to_domain_blood_sugar(record: BloodSugarRecord) -> Result<BloodSugarReading, String> {
    let meal_type: MealType = record.meal_type.parse()?;
    Ok(BloodSugarReading {
        id: record.id,
        glucose: record.glucose,
        meal_type,
        notes: record.notes,
        recorded_at: record.recorded_at,
        created_at: record.created_at,
    })
}

pub fn convert_to_data_blood_sugar(
    request: CreateBloodSugarRequest,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> BloodSugarRecord {
    let now = storage_precision(now);
    BloodSugarRecord {
        id: Uuid::new_v4(),
        user_id,
        glucose: request.glucose,
        meal_type: request.meal_type.as_str().to_string(),
        notes: request.notes,
        recorded_at: request.recorded_at.map_or(now, storage_precision),
        created_at: now,
    }
}

pub fn convert_to_domain_weight(record: WeightRecord) -> WeightReading {
    WeightReading {
        id: record.id,
        weight: record.weight_kg,
        notes: record.notes,
        recorded_at: record.recorded_at,
        created_at: record.created_at,
    }
}

pub fn convert_to_data_weight(
    request: CreateWeightRequest,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> WeightRecord {
    let now = storage_precision(now);
    WeightRecord {
        id: Uuid::new_v4(),
        user_id,
        weight_kg: request.weight,
        notes: request.notes,
        recorded_at: request.recorded_at.map_or(now, storage_precision),
        created_at: now,
    }
}

pub fn convert_to_domain_medication(record: MedicationRecord) -> Medication {
    Medication {
        id: record.id,
        name: record.name,
        dosage: record.dosage,
        frequency: record.frequency,
        is_active: record.is_active,
        created_at: record.created_at,
    }
}

pub fn convert_to_data_medication(
    request: CreateMedicationRequest,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> MedicationRecord {
    MedicationRecord {
        id: Uuid::new_v4(),
        user_id,
        name: request.name.trim().to_string(),
        dosage: request.dosage.trim().to_string(),
        frequency: request.frequency.trim().to_string(),
        is_active: true,
        created_at: storage_precision(now),
    }
}

pub fn convert_to_domain_medication_log(record: MedicationLogRecord) -> MedicationLog {
    MedicationLog {
        id: record.id,
        medication_id: record.medication_id,
        taken: record.taken,
        notes: record.notes,
        taken_at: record.taken_at,
    }
}

pub fn convert_to_data_medication_log(
    request: CreateMedicationLogRequest,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> MedicationLogRecord {
    MedicationLogRecord {
        id: Uuid::new_v4(),
        user_id,
        medication_id: request.medication_id,
        taken: request.taken,
        notes: request.notes,
        taken_at: storage_precision(request.taken_at.unwrap_or(now)),
    }
}

/// Join a dose log with its medication, if the medication is still known
pub fn convert_to_domain_log_detail(
    record: MedicationLogRecord,
    medication: Option<&MedicationRecord>,
) -> MedicationLogDetail {
    MedicationLogDetail {
        id: record.id,
        medication_id: record.medication_id,
        medication_name: medication.map(|m| m.name.clone()),
        dosage: medication.map(|m| m.dosage.clone()),
        frequency: medication.map(|m| m.frequency.clone()),
        taken: record.taken,
        notes: record.notes,
        taken_at: record.taken_at,
    }
}
