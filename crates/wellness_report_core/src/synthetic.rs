//! Placeholder generators used when a domain has no real tracking history.
//!
//! Everything produced here is random filler, not a measurement. The
//! collector always registers these as [`DomainProvider::SyntheticPlaceholder`](crate::source::DomainProvider)
//! so the resulting snapshots carry [`Provenance::Synthetic`](crate::model::Provenance).

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::{RngExt, rng};

use crate::SourceError;
use crate::model::{HydrationRecord, MentalHealthRecord, SleepRecord, WeightRecord, WeightUnit};
use crate::source::{FetchRequest, RecordSource};
use crate::utils::{round1, trailing_days};

pub const DEFAULT_HYDRATION_GOAL_ML: u32 = 2500;
pub const HYDRATION_MIN_ML: u32 = 1000;
pub const HYDRATION_MAX_ML: u32 = 3000;

pub const SLEEP_MIN_HOURS: f64 = 5.0;
pub const SLEEP_MAX_HOURS: f64 = 8.0;
pub const SLEEP_MIN_QUALITY: f64 = 60.0;
pub const SLEEP_MAX_QUALITY: f64 = 100.0;

pub const DEFAULT_WEIGHT_BASELINE_KG: f64 = 75.0;
pub const WEIGHT_DAILY_VARIATION_KG: f64 = 0.5;

pub const DEFAULT_EMOTIONAL_STATE: &str = "Calm";
pub const DEFAULT_MENTAL_STRESS_LEVEL: f64 = 35.0;
pub const DEFAULT_MENTAL_RECOMMENDATIONS: [&str; 2] = [
    "Practice mindfulness for 10 minutes daily",
    "Maintain a regular sleep schedule",
];

/// Daily intake uniformly sampled in [1000, 3000] ml against a fixed goal.
#[derive(Clone, Debug)]
pub struct SyntheticHydrationSource {
    goal_ml: u32,
}

impl SyntheticHydrationSource {
    pub fn new(goal_ml: u32) -> Self {
        Self {
            goal_ml: goal_ml.max(1),
        }
    }

    fn generate(&self, today: NaiveDate, days: u32) -> Vec<HydrationRecord> {
        let mut rng = rng();
        trailing_days(today, days)
            .into_iter()
            .map(|date| HydrationRecord {
                date,
                amount_ml: rng.random_range(HYDRATION_MIN_ML..=HYDRATION_MAX_ML),
                goal_ml: self.goal_ml,
            })
            .collect()
    }
}

impl Default for SyntheticHydrationSource {
    fn default() -> Self {
        Self::new(DEFAULT_HYDRATION_GOAL_ML)
    }
}

#[async_trait]
impl RecordSource<HydrationRecord> for SyntheticHydrationSource {
    fn name(&self) -> &str {
        "synthetic:hydration"
    }

    async fn fetch_recent(
        &self,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<HydrationRecord>, SourceError> {
        Ok(self.generate(request.today, window_days(request)))
    }
}

/// Nightly duration in [5, 8) hours and quality in [60, 100).
#[derive(Clone, Debug, Default)]
pub struct SyntheticSleepSource;

impl SyntheticSleepSource {
    fn generate(&self, today: NaiveDate, days: u32) -> Vec<SleepRecord> {
        let mut rng = rng();
        trailing_days(today, days)
            .into_iter()
            .map(|date| {
                let hours: f64 = rng.random_range(SLEEP_MIN_HOURS..SLEEP_MAX_HOURS);
                let quality: f64 = rng.random_range(SLEEP_MIN_QUALITY..SLEEP_MAX_QUALITY);
                SleepRecord {
                    date,
                    // floor keeps both values strictly under their upper bound
                    duration_hours: (hours * 10.0).floor() / 10.0,
                    quality: quality.floor(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl RecordSource<SleepRecord> for SyntheticSleepSource {
    fn name(&self) -> &str {
        "synthetic:sleep"
    }

    async fn fetch_recent(
        &self,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<SleepRecord>, SourceError> {
        Ok(self.generate(request.today, window_days(request)))
    }
}

/// Baseline weight with an independent daily variation in [-0.5, +0.5) kg,
/// rounded to one decimal.
#[derive(Clone, Debug)]
pub struct SyntheticWeightSource {
    baseline_kg: f64,
}

impl SyntheticWeightSource {
    pub fn new(baseline_kg: f64) -> Self {
        Self { baseline_kg }
    }

    fn generate(&self, today: NaiveDate, days: u32) -> Vec<WeightRecord> {
        let mut rng = rng();
        trailing_days(today, days)
            .into_iter()
            .map(|date| {
                let variation: f64 =
                    rng.random_range(-WEIGHT_DAILY_VARIATION_KG..WEIGHT_DAILY_VARIATION_KG);
                WeightRecord {
                    date,
                    weight: round1((self.baseline_kg + variation).max(0.0)),
                    unit: WeightUnit::Kg,
                }
            })
            .collect()
    }
}

impl Default for SyntheticWeightSource {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT_BASELINE_KG)
    }
}

#[async_trait]
impl RecordSource<WeightRecord> for SyntheticWeightSource {
    fn name(&self) -> &str {
        "synthetic:weight"
    }

    async fn fetch_recent(
        &self,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<WeightRecord>, SourceError> {
        Ok(self.generate(request.today, window_days(request)))
    }
}

/// Single canned mental-health entry dated today.
#[derive(Clone, Debug, Default)]
pub struct DefaultMentalHealthSource;

impl DefaultMentalHealthSource {
    pub fn record(today: NaiveDate) -> MentalHealthRecord {
        MentalHealthRecord {
            date: today,
            emotional_state: DEFAULT_EMOTIONAL_STATE.to_string(),
            stress_level: DEFAULT_MENTAL_STRESS_LEVEL,
            recommendations: DEFAULT_MENTAL_RECOMMENDATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[async_trait]
impl RecordSource<MentalHealthRecord> for DefaultMentalHealthSource {
    fn name(&self) -> &str {
        "synthetic:mental-health-default"
    }

    async fn fetch_recent(
        &self,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<MentalHealthRecord>, SourceError> {
        Ok(vec![Self::record(request.today)])
    }
}

fn window_days(request: &FetchRequest<'_>) -> u32 {
    u32::try_from(request.limit).unwrap_or(u32::MAX)
}
