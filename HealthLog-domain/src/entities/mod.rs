// Domain entities and value objects
pub mod blood_pressure;
pub mod blood_sugar;
pub mod conversions;
pub mod medication;
pub mod weight;

// Re-export common types for easier imports
pub use blood_pressure::{
    BloodPressureCategory, BloodPressureReading, CreateBloodPressureRequest,
    UpdateBloodPressureRequest,
};
pub use blood_sugar::{BloodSugarReading, CreateBloodSugarRequest, MealType, UpdateBloodSugarRequest};
pub use medication::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog,
    MedicationLogDetail, UpdateMedicationLogRequest, UpdateMedicationRequest,
};
pub use weight::{CreateWeightRequest, UpdateWeightRequest, WeightReading};
