use crate::aggregation::PeriodSummary;
use crate::entities::blood_pressure::BloodPressureCategory;

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// Category of the period's average systolic and diastolic pressure
pub fn categorize_period(summary: &PeriodSummary) -> Option<BloodPressureCategory> {
    let average = |channel: &str| {
        summary
            .channel(channel)
            .and_then(|stats| stats.average)
            .map(|value| value.as_f64().clamp(0.0, f64::from(u16::MAX)) as u16)
    };

    Some(categorize_blood_pressure(average("systolic")?, average("diastolic")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{summarize, Channel};

    #[test]
    fn test_bp_category_normal() {
        let category = categorize_blood_pressure(110, 75);
        assert_eq!(category, BloodPressureCategory::Normal);
    }

    #[test]
    fn test_bp_category_elevated() {
        let category = categorize_blood_pressure(125, 75);
        assert_eq!(category, BloodPressureCategory::Elevated);
    }

    #[test]
    fn test_bp_category_hypertension1() {
        assert_eq!(categorize_blood_pressure(135, 75), BloodPressureCategory::Hypertension1);
        assert_eq!(categorize_blood_pressure(120, 85), BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn test_bp_category_hypertension2() {
        assert_eq!(categorize_blood_pressure(145, 75), BloodPressureCategory::Hypertension2);
        assert_eq!(categorize_blood_pressure(120, 95), BloodPressureCategory::Hypertension2);
    }

    #[test]
    fn test_bp_category_crisis() {
        assert_eq!(categorize_blood_pressure(185, 75), BloodPressureCategory::HypertensiveCrisis);
        assert_eq!(categorize_blood_pressure(120, 125), BloodPressureCategory::HypertensiveCrisis);
    }

    #[test]
    fn test_period_category_uses_rounded_averages() {
        let readings = vec![(128.0, 78.0), (131.0, 79.0)];
        let channels = vec![
            Channel::integer("systolic", |r: &(f64, f64)| Some(r.0)),
            Channel::integer("diastolic", |r: &(f64, f64)| Some(r.1)),
        ];

        // 129.5 rounds to 130, 78.5 rounds to 79
        let summary = summarize(&readings, &channels);
        assert_eq!(categorize_period(&summary), Some(BloodPressureCategory::Hypertension1));

        let empty: Vec<(f64, f64)> = Vec::new();
        assert_eq!(categorize_period(&summarize(&empty, &channels)), None);
    }
}
