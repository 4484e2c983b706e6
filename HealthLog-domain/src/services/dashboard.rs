use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use health_log_data::models::{
    BloodPressureRecord, BloodSugarRecord, MedicationLogRecord, MedicationRecord, StoredRecord,
    WeightRecord,
};
use health_log_data::repository::{RecordFilter, RecordRepository, Repositories, SortOrder};

use crate::aggregation::{
    aggregate, aggregate_compliance, compliance_percentage, summarize, BucketSummary, Channel,
    ComplianceBucket, GroupMode, PeriodSummary,
};
use crate::entities::blood_pressure::{BloodPressureCategory, BloodPressureReading};
use crate::entities::blood_sugar::{BloodSugarReading, MealType};
use crate::entities::conversions;
use crate::entities::medication::MedicationLogDetail;
use crate::entities::weight::WeightReading;
use crate::services::blood_sugar::to_domain as sugar_to_domain;
use crate::services::errors::{map_repo_error, ServiceError};
use crate::services::insights::categorize_period;
use crate::services::medication::day_window;

pub const DEFAULT_CHART_DAYS: u32 = 30;
pub const DEFAULT_WEIGHT_CHART_DAYS: u32 = 90;
pub const MAX_CHART_DAYS: u32 = 3650;

/// Weeks covered by the compliance trend
const COMPLIANCE_TREND_WEEKS: u64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Window and grouping a chart was computed with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMeta {
    pub date_range: DateRange,
    pub group_by: GroupMode,
    pub days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodPressureChart {
    pub data: Vec<BucketSummary>,
    pub summary: PeriodSummary,
    /// Category of the period's average pressure
    pub category: Option<BloodPressureCategory>,
    /// Latest reading, also when it falls before the window
    pub recent_reading: Option<BloodPressureReading>,
    pub meta: ChartMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodSugarChart {
    /// One channel per meal type
    pub data: Vec<BucketSummary>,
    pub summary: PeriodSummary,
    pub total_readings: usize,
    pub meta: ChartMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightChart {
    pub data: Vec<BucketSummary>,
    pub summary: PeriodSummary,
    pub meta: ChartMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodSugarStats {
    /// Glucose over the last calendar month
    pub summary: PeriodSummary,
    pub recent: Option<BloodSugarReading>,
    pub today: Vec<BloodSugarReading>,
    pub weekly_trend: Vec<BloodSugarReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicationStats {
    pub total_active: usize,
    pub today_logs: Vec<MedicationLogDetail>,
    /// Percentage of doses taken over the last week
    pub compliance: u32,
    pub compliance_trend: Vec<ComplianceBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightStats {
    pub recent: Option<WeightReading>,
    /// Difference between the two latest readings
    pub change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodPressureStats {
    pub recent: Option<BloodPressureReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySummary {
    pub today_readings_count: usize,
    pub medications_taken_today: usize,
    pub total_medications_today: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub blood_sugar: BloodSugarStats,
    pub medications: MedicationStats,
    pub weight: WeightStats,
    pub blood_pressure: BloodPressureStats,
    pub summary: TodaySummary,
}

#[async_trait]
pub trait DashboardServiceTrait: Send + Sync {
    async fn blood_pressure_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<BloodPressureChart, ServiceError>;

    async fn blood_sugar_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<BloodSugarChart, ServiceError>;

    async fn weight_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<WeightChart, ServiceError>;

    async fn stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardStats, ServiceError>;
}

/// Charts and statistics over a user's readings
#[derive(Clone)]
pub struct DashboardService {
    blood_pressure: Arc<dyn RecordRepository<BloodPressureRecord>>,
    blood_sugar: Arc<dyn RecordRepository<BloodSugarRecord>>,
    weight: Arc<dyn RecordRepository<WeightRecord>>,
    medications: Arc<dyn RecordRepository<MedicationRecord>>,
    medication_logs: Arc<dyn RecordRepository<MedicationLogRecord>>,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn out_of_range() -> ServiceError {
    ServiceError::Validation("days: Date range is out of bounds".to_string())
}

/// Start of a chart window of `days` days ending at `now`, inclusive
fn chart_window(
    days: Option<u32>,
    default: u32,
    mode: GroupMode,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, ChartMeta), ServiceError> {
    let days = days.unwrap_or(default);
    if days == 0 || days > MAX_CHART_DAYS {
        return Err(ServiceError::Validation(format!(
            "days: Days must be between 1 and {}",
            MAX_CHART_DAYS
        )));
    }

    let start = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(out_of_range)?;
    let meta = ChartMeta {
        date_range: DateRange {
            start: start.date_naive(),
            end: now.date_naive(),
        },
        group_by: mode,
        days,
    };
    Ok((start, meta))
}

fn blood_pressure_channels() -> Vec<Channel<BloodPressureReading>> {
    vec![
        Channel::integer("systolic", |r: &BloodPressureReading| Some(f64::from(r.systolic))),
        Channel::integer("diastolic", |r: &BloodPressureReading| Some(f64::from(r.diastolic))),
        Channel::integer("pulse", |r: &BloodPressureReading| r.pulse.map(f64::from)),
    ]
}

fn meal_channels() -> Vec<Channel<BloodSugarReading>> {
    MealType::ALL
        .into_iter()
        .map(|meal| {
            Channel::integer(meal.as_str(), move |r: &BloodSugarReading| {
                (r.meal_type == meal).then(|| f64::from(r.glucose))
            })
        })
        .collect()
}

fn glucose_channel() -> Vec<Channel<BloodSugarReading>> {
    vec![Channel::integer("glucose", |r: &BloodSugarReading| Some(f64::from(r.glucose)))]
}

fn weight_channel() -> Vec<Channel<WeightReading>> {
    vec![Channel::exact("weight", |r: &WeightReading| Some(r.weight))]
}

impl DashboardService {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            blood_pressure: repositories.blood_pressure.clone(),
            blood_sugar: repositories.blood_sugar.clone(),
            weight: repositories.weight.clone(),
            medications: repositories.medications.clone(),
            medication_logs: repositories.medication_logs.clone(),
        }
    }

    /// Every record matching the filter
    async fn fetch<T: StoredRecord>(
        repository: &Arc<dyn RecordRepository<T>>,
        filter: RecordFilter,
    ) -> Result<Vec<T>, ServiceError> {
        let (records, total) = repository.list(&filter).await.map_err(map_repo_error)?;
        debug!("Fetched {} {} rows for the dashboard", total, T::TABLE);
        Ok(records)
    }

    /// The user's readings in `[since, until]`, oldest first
    async fn window<T: StoredRecord>(
        repository: &Arc<dyn RecordRepository<T>>,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<T>, ServiceError> {
        let filter = RecordFilter::for_user(user_id)
            .since(since)
            .until(until)
            .order(SortOrder::Ascending);
        Self::fetch(repository, filter).await
    }

    /// The user's `count` newest records
    async fn latest<T: StoredRecord>(
        repository: &Arc<dyn RecordRepository<T>>,
        user_id: Uuid,
        count: usize,
    ) -> Result<Vec<T>, ServiceError> {
        Self::fetch(repository, RecordFilter::for_user(user_id).limit(count)).await
    }

    async fn sugar_readings(&self, filter: RecordFilter) -> Result<Vec<BloodSugarReading>, ServiceError> {
        Self::fetch(&self.blood_sugar, filter)
            .await?
            .into_iter()
            .map(sugar_to_domain)
            .collect()
    }

    async fn blood_sugar_stats(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        week_ago: DateTime<Utc>,
        tomorrow: DateTime<Utc>,
    ) -> Result<BloodSugarStats, ServiceError> {
        let month_ago = today
            .checked_sub_months(Months::new(1))
            .map(midnight)
            .ok_or_else(out_of_range)?;

        let month = self
            .sugar_readings(
                RecordFilter::for_user(user_id)
                    .since(month_ago)
                    .order(SortOrder::Ascending),
            )
            .await?;
        let recent = self
            .sugar_readings(RecordFilter::for_user(user_id).limit(1))
            .await?
            .into_iter()
            .next();
        let today_readings = self
            .sugar_readings(
                RecordFilter::for_user(user_id)
                    .since(midnight(today))
                    .before(tomorrow),
            )
            .await?;
        let weekly_trend = self
            .sugar_readings(
                RecordFilter::for_user(user_id)
                    .since(week_ago)
                    .order(SortOrder::Ascending),
            )
            .await?;

        Ok(BloodSugarStats {
            summary: summarize(&month, &glucose_channel()),
            recent,
            today: today_readings,
            weekly_trend,
        })
    }

    async fn medication_stats(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        week_ago: DateTime<Utc>,
    ) -> Result<MedicationStats, ServiceError> {
        let medications = Self::fetch(&self.medications, RecordFilter::for_user(user_id)).await?;
        let total_active = medications.iter().filter(|m| m.is_active).count();

        let (start, end) = day_window(now)?;
        let today_logs = Self::fetch(
            &self.medication_logs,
            RecordFilter::for_user(user_id).since(start).before(end),
        )
        .await?
        .into_iter()
        .map(|log| {
            let medication = medications.iter().find(|m| m.id == log.medication_id);
            conversions::convert_to_domain_log_detail(log, medication)
        })
        .collect();

        let trend_start = start
            .date_naive()
            .checked_sub_days(Days::new(COMPLIANCE_TREND_WEEKS * 7))
            .map(midnight)
            .ok_or_else(out_of_range)?;
        let logs: Vec<_> = Self::fetch(
            &self.medication_logs,
            RecordFilter::for_user(user_id)
                .since(trend_start)
                .before(end)
                .order(SortOrder::Ascending),
        )
        .await?
            .into_iter()
            .map(conversions::convert_to_domain_medication_log)
            .collect();

        let weekly: Vec<_> = logs.iter().filter(|log| log.taken_at >= week_ago).collect();
        let taken = weekly.iter().filter(|log| log.taken).count();

        Ok(MedicationStats {
            total_active,
            today_logs,
            compliance: compliance_percentage(taken, weekly.len()),
            compliance_trend: aggregate_compliance(&logs, GroupMode::Week, |log| log.taken),
        })
    }

    async fn weight_stats(&self, user_id: Uuid) -> Result<WeightStats, ServiceError> {
        let latest: Vec<WeightReading> = Self::latest(&self.weight, user_id, 2)
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_weight)
            .collect();

        let change = match latest.as_slice() {
            [current, previous] => Some(current.weight - previous.weight),
            _ => None,
        };

        Ok(WeightStats {
            recent: latest.into_iter().next(),
            change,
        })
    }

    async fn recent_blood_pressure(&self, user_id: Uuid) -> Result<Option<BloodPressureReading>, ServiceError> {
        Ok(Self::latest(&self.blood_pressure, user_id, 1)
            .await?
            .into_iter()
            .next()
            .map(conversions::convert_to_domain_blood_pressure))
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn blood_pressure_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<BloodPressureChart, ServiceError> {
        let (start, meta) = chart_window(days, DEFAULT_CHART_DAYS, mode, now)?;
        let readings: Vec<_> = Self::window(&self.blood_pressure, user_id, start, now)
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_blood_pressure)
            .collect();

        let channels = blood_pressure_channels();
        let summary = summarize(&readings, &channels);
        let category = categorize_period(&summary);

        Ok(BloodPressureChart {
            data: aggregate(&readings, mode, &channels),
            summary,
            category,
            recent_reading: self.recent_blood_pressure(user_id).await?,
            meta,
        })
    }

    async fn blood_sugar_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<BloodSugarChart, ServiceError> {
        let (start, meta) = chart_window(days, DEFAULT_CHART_DAYS, mode, now)?;
        let readings = self
            .sugar_readings(
                RecordFilter::for_user(user_id)
                    .since(start)
                    .until(now)
                    .order(SortOrder::Ascending),
            )
            .await?;

        Ok(BloodSugarChart {
            data: aggregate(&readings, mode, &meal_channels()),
            summary: summarize(&readings, &glucose_channel()),
            total_readings: readings.len(),
            meta,
        })
    }

    async fn weight_chart(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        mode: GroupMode,
        now: DateTime<Utc>,
    ) -> Result<WeightChart, ServiceError> {
        let (start, meta) = chart_window(days, DEFAULT_WEIGHT_CHART_DAYS, mode, now)?;
        let readings: Vec<_> = Self::window(&self.weight, user_id, start, now)
            .await?
            .into_iter()
            .map(conversions::convert_to_domain_weight)
            .collect();

        let channels = weight_channel();
        Ok(WeightChart {
            data: aggregate(&readings, mode, &channels),
            summary: summarize(&readings, &channels),
            meta,
        })
    }

    async fn stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardStats, ServiceError> {
        let today = now.date_naive();
        let (_, tomorrow) = day_window(now)?;
        let week_ago = today
            .checked_sub_days(Days::new(7))
            .map(midnight)
            .ok_or_else(out_of_range)?;

        let blood_sugar = self.blood_sugar_stats(user_id, today, week_ago, tomorrow).await?;
        let medications = self.medication_stats(user_id, now, week_ago).await?;
        let weight = self.weight_stats(user_id).await?;
        let blood_pressure = BloodPressureStats {
            recent: self.recent_blood_pressure(user_id).await?,
        };

        let summary = TodaySummary {
            today_readings_count: blood_sugar.today.len(),
            medications_taken_today: medications.today_logs.iter().filter(|log| log.taken).count(),
            total_medications_today: medications.today_logs.len(),
        };

        Ok(DashboardStats {
            blood_sugar,
            medications,
            weight,
            blood_pressure,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::StatValue;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn bp(user_id: Uuid, systolic: u16, diastolic: u16, pulse: Option<u16>, recorded_at: DateTime<Utc>) -> BloodPressureRecord {
        BloodPressureRecord {
            id: Uuid::new_v4(),
            user_id,
            systolic,
            diastolic,
            pulse,
            notes: None,
            recorded_at,
            created_at: recorded_at,
        }
    }

    fn sugar(user_id: Uuid, glucose: u16, meal: MealType, recorded_at: DateTime<Utc>) -> BloodSugarRecord {
        BloodSugarRecord {
            id: Uuid::new_v4(),
            user_id,
            glucose,
            meal_type: meal.as_str().to_string(),
            notes: None,
            recorded_at,
            created_at: recorded_at,
        }
    }

    fn weight(user_id: Uuid, weight_kg: f64, recorded_at: DateTime<Utc>) -> WeightRecord {
        WeightRecord {
            id: Uuid::new_v4(),
            user_id,
            weight_kg,
            notes: None,
            recorded_at,
            created_at: recorded_at,
        }
    }

    #[tokio::test]
    async fn test_blood_pressure_chart() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let now = at(20, 12);

        repos.blood_pressure.insert(&bp(user, 180, 100, None, at(1, 8))).await.unwrap();
        repos.blood_pressure.insert(&bp(user, 120, 80, Some(70), at(15, 8))).await.unwrap();
        repos.blood_pressure.insert(&bp(user, 131, 79, None, at(15, 20))).await.unwrap();
        repos.blood_pressure.insert(&bp(user, 140, 90, Some(75), at(18, 8))).await.unwrap();
        // Another user's reading never shows up
        repos.blood_pressure.insert(&bp(Uuid::new_v4(), 200, 120, None, at(19, 8))).await.unwrap();

        let service = DashboardService::new(&repos);
        let chart = service
            .blood_pressure_chart(user, Some(7), GroupMode::Day, now)
            .await
            .unwrap();

        assert_eq!(chart.data.len(), 2);
        let first = &chart.data[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(first.count, 2);
        assert_eq!(first.recorded_at, at(15, 8));
        // 125.5 rounds half away from zero, 79.5 too
        assert_eq!(first.value("systolic"), Some(StatValue::Integer(126)));
        assert_eq!(first.value("diastolic"), Some(StatValue::Integer(80)));
        assert_eq!(first.value("pulse"), Some(StatValue::Integer(70)));

        assert_eq!(chart.summary.count, 3);
        let pulse = chart.summary.channel("pulse").unwrap();
        assert_eq!(pulse.count, 2);
        assert_eq!(pulse.average, Some(StatValue::Integer(73)));

        // Averages 130.33 / 83 fall in the first hypertension stage
        assert_eq!(chart.category, Some(BloodPressureCategory::Hypertension1));
        assert_eq!(chart.recent_reading.map(|r| r.systolic), Some(140));
        assert_eq!(chart.meta.days, 7);
        assert_eq!(chart.meta.date_range.start, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
        assert_eq!(chart.meta.date_range.end, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
    }

    #[tokio::test]
    async fn test_empty_chart_has_no_buckets() {
        let repos = Repositories::in_memory();
        let service = DashboardService::new(&repos);

        let chart = service
            .blood_pressure_chart(Uuid::new_v4(), None, GroupMode::Week, at(20, 12))
            .await
            .unwrap();
        assert!(chart.data.is_empty());
        assert_eq!(chart.summary.count, 0);
        assert_eq!(chart.category, None);
        assert_eq!(chart.meta.days, DEFAULT_CHART_DAYS);
    }

    #[tokio::test]
    async fn test_future_readings_stay_out_of_charts() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let future = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        repos.blood_pressure.insert(&bp(user, 150, 95, None, future)).await.unwrap();

        let service = DashboardService::new(&repos);
        let chart = service
            .blood_pressure_chart(user, Some(7), GroupMode::Day, at(20, 12))
            .await
            .unwrap();

        assert!(chart.data.is_empty());
        assert_eq!(chart.summary.count, 0);
        assert_eq!(chart.category, None);
        assert_eq!(chart.meta.date_range.end, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
    }

    #[tokio::test]
    async fn test_chart_window_ends_at_now_inclusive() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let now = at(20, 12);
        let just_after = now + Duration::milliseconds(1);

        repos.weight.insert(&weight(user, 80.0, now)).await.unwrap();
        repos.weight.insert(&weight(user, 95.0, just_after)).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 110, MealType::BeforeLunch, now)).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 250, MealType::BeforeLunch, just_after)).await.unwrap();

        let service = DashboardService::new(&repos);

        let weights = service.weight_chart(user, None, GroupMode::Day, now).await.unwrap();
        assert_eq!(weights.data.len(), 1);
        assert_eq!(weights.data[0].date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(weights.data[0].count, 1);
        assert_eq!(weights.data[0].value("weight"), Some(StatValue::Decimal(80.0)));
        assert_eq!(weights.summary.count, 1);

        let sugars = service.blood_sugar_chart(user, None, GroupMode::Day, now).await.unwrap();
        assert_eq!(sugars.total_readings, 1);
        assert_eq!(sugars.data[0].value("before_lunch"), Some(StatValue::Integer(110)));
    }

    #[tokio::test]
    async fn test_chart_days_must_be_positive() {
        let service = DashboardService::new(&Repositories::in_memory());
        let result = service
            .weight_chart(Uuid::new_v4(), Some(0), GroupMode::Day, at(20, 12))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_blood_sugar_chart_has_every_meal_channel() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        repos.blood_sugar.insert(&sugar(user, 90, MealType::BeforeBreakfast, at(18, 7))).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 101, MealType::BeforeBreakfast, at(18, 7))).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 150, MealType::AfterDinner, at(18, 20))).await.unwrap();

        let service = DashboardService::new(&repos);
        let chart = service
            .blood_sugar_chart(user, None, GroupMode::Day, at(20, 12))
            .await
            .unwrap();

        assert_eq!(chart.total_readings, 3);
        assert_eq!(chart.data.len(), 1);
        let bucket = &chart.data[0];
        assert_eq!(bucket.channels.len(), MealType::ALL.len());
        assert_eq!(bucket.value("before_breakfast"), Some(StatValue::Integer(96)));
        assert_eq!(bucket.value("after_dinner"), Some(StatValue::Integer(150)));
        assert_eq!(bucket.value("bedtime"), None);
        assert!(bucket.channels.contains_key("bedtime"));

        let glucose = chart.summary.channel("glucose").unwrap();
        assert_eq!(glucose.min, Some(StatValue::Integer(90)));
        assert_eq!(glucose.max, Some(StatValue::Integer(150)));
    }

    #[tokio::test]
    async fn test_weekly_weight_chart_keeps_precision() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        // 2024-03-10 is a Sunday
        repos.weight.insert(&weight(user, 80.25, at(10, 8))).await.unwrap();
        repos.weight.insert(&weight(user, 80.0, at(16, 8))).await.unwrap();
        repos.weight.insert(&weight(user, 79.5, at(17, 8))).await.unwrap();

        let service = DashboardService::new(&repos);
        let chart = service
            .weight_chart(user, None, GroupMode::Week, at(20, 12))
            .await
            .unwrap();

        let dates: Vec<NaiveDate> = chart.data.iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(),
            ]
        );
        assert_eq!(chart.data[0].value("weight"), Some(StatValue::Decimal(80.125)));
        assert_eq!(chart.meta.group_by, GroupMode::Week);
    }

    #[tokio::test]
    async fn test_stats() {
        let repos = Repositories::in_memory();
        let user = Uuid::new_v4();
        let now = at(20, 12);

        repos.blood_sugar.insert(&sugar(user, 100, MealType::BeforeLunch, at(1, 12))).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 120, MealType::AfterLunch, at(15, 13))).await.unwrap();
        repos.blood_sugar.insert(&sugar(user, 140, MealType::Bedtime, at(20, 9))).await.unwrap();

        repos.weight.insert(&weight(user, 81.0, at(10, 8))).await.unwrap();
        repos.weight.insert(&weight(user, 80.5, at(19, 8))).await.unwrap();

        let medication = MedicationRecord {
            id: Uuid::new_v4(),
            user_id: user,
            name: "Metformin".to_string(),
            dosage: "500mg".to_string(),
            frequency: "Twice daily".to_string(),
            is_active: true,
            created_at: at(1, 0),
        };
        repos.medications.insert(&medication).await.unwrap();

        for (taken, taken_at) in [(true, at(16, 8)), (false, at(19, 8)), (true, at(20, 8))] {
            let log = MedicationLogRecord {
                id: Uuid::new_v4(),
                user_id: user,
                medication_id: medication.id,
                taken,
                notes: None,
                taken_at,
            };
            repos.medication_logs.insert(&log).await.unwrap();
        }

        let service = DashboardService::new(&repos);
        let stats = service.stats(user, now).await.unwrap();

        assert_eq!(stats.blood_sugar.summary.count, 3);
        assert_eq!(stats.blood_sugar.recent.as_ref().map(|r| r.glucose), Some(140));
        assert_eq!(stats.blood_sugar.today.len(), 1);
        let trend: Vec<u16> = stats.blood_sugar.weekly_trend.iter().map(|r| r.glucose).collect();
        assert_eq!(trend, vec![120, 140]);

        assert_eq!(stats.medications.total_active, 1);
        assert_eq!(stats.medications.today_logs.len(), 1);
        assert_eq!(
            stats.medications.today_logs[0].medication_name.as_deref(),
            Some("Metformin")
        );
        assert_eq!(stats.medications.compliance, 67);
        let trend_total: usize = stats.medications.compliance_trend.iter().map(|b| b.total).sum();
        assert_eq!(trend_total, 3);

        assert_eq!(stats.weight.recent.as_ref().map(|r| r.weight), Some(80.5));
        assert_eq!(stats.weight.change, Some(-0.5));
        assert!(stats.blood_pressure.recent.is_none());

        assert_eq!(
            stats.summary,
            TodaySummary {
                today_readings_count: 1,
                medications_taken_today: 1,
                total_medications_today: 1,
            }
        );
    }
}
