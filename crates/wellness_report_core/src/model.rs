//! Domain records, snapshots and the persisted report shapes.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::display_name_for;

const POUNDS_TO_KG: f64 = 0.453_592_37;

/// One tracked health category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    FacialScan,
    MentalHealth,
    Exercise,
    Hydration,
    Sleep,
    Weight,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::FacialScan,
        Domain::MentalHealth,
        Domain::Exercise,
        Domain::Hydration,
        Domain::Sleep,
        Domain::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::FacialScan => "facialScan",
            Domain::MentalHealth => "mentalHealth",
            Domain::Exercise => "exercise",
            Domain::Hydration => "hydration",
            Domain::Sleep => "sleep",
            Domain::Weight => "weight",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity the report is generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Common behaviour of every dated domain measurement.
pub trait DomainRecord {
    const DOMAIN: Domain;

    fn date(&self) -> NaiveDate;

    /// Check the field invariants: percentages in [0,100], everything else
    /// finite and non-negative.
    fn validate(&self) -> Result<(), String>;
}

fn check_percent(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be within [0, 100], got {value}"))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative number, got {value}"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacialScanRecord {
    pub date: NaiveDate,
    pub stress_level: f64,
    pub sleep_quality: f64,
    pub hydration_level: f64,
    pub skin_health: f64,
}

impl DomainRecord for FacialScanRecord {
    const DOMAIN: Domain = Domain::FacialScan;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        check_percent("stressLevel", self.stress_level)?;
        check_percent("sleepQuality", self.sleep_quality)?;
        check_percent("hydrationLevel", self.hydration_level)?;
        check_percent("skinHealth", self.skin_health)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentalHealthRecord {
    pub date: NaiveDate,
    pub emotional_state: String,
    pub stress_level: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl DomainRecord for MentalHealthRecord {
    const DOMAIN: Domain = Domain::MentalHealth;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        if self.emotional_state.trim().is_empty() {
            return Err("emotionalState must not be empty".into());
        }
        check_percent("stressLevel", self.stress_level)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub date: NaiveDate,
    pub name: String,
    pub duration_minutes: f64,
    pub intensity: Intensity,
}

impl DomainRecord for ExerciseRecord {
    const DOMAIN: Domain = Domain::Exercise;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("durationMinutes", self.duration_minutes)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HydrationRecord {
    pub date: NaiveDate,
    pub amount_ml: u32,
    pub goal_ml: u32,
}

impl DomainRecord for HydrationRecord {
    const DOMAIN: Domain = Domain::Hydration;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        if self.goal_ml == 0 {
            return Err("goalMl must be positive".into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    pub date: NaiveDate,
    pub duration_hours: f64,
    pub quality: f64,
}

impl DomainRecord for SleepRecord {
    const DOMAIN: Domain = Domain::Sleep;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("durationHours", self.duration_hours)?;
        if self.duration_hours > 24.0 {
            return Err(format!(
                "durationHours must not exceed 24, got {}",
                self.duration_hours
            ));
        }
        check_percent("quality", self.quality)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub date: NaiveDate,
    pub weight: f64,
    pub unit: WeightUnit,
}

impl WeightRecord {
    pub fn weight_kg(&self) -> f64 {
        match self.unit {
            WeightUnit::Kg => self.weight,
            WeightUnit::Lb => self.weight * POUNDS_TO_KG,
        }
    }
}

impl DomainRecord for WeightRecord {
    const DOMAIN: Domain = Domain::Weight;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("weight", self.weight)
    }
}

/// Where a snapshot's records came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Records from a real measurement source.
    Measured,
    /// Placeholder generator output, not a measurement.
    Synthetic,
    /// Every source for the domain failed.
    Unavailable,
}

/// Records of one domain, most recent first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainSnapshot<R> {
    pub provenance: Provenance,
    pub records: Vec<R>,
}

impl<R> DomainSnapshot<R> {
    pub fn measured(records: Vec<R>) -> Self {
        Self {
            provenance: Provenance::Measured,
            records,
        }
    }

    pub fn synthetic(records: Vec<R>) -> Self {
        Self {
            provenance: Provenance::Synthetic,
            records,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            provenance: Provenance::Unavailable,
            records: Vec::new(),
        }
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&R> {
        self.records.first()
    }

    /// The oldest record in the retained window, if any.
    pub fn earliest(&self) -> Option<&R> {
        self.records.last()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }
}

impl<R> Default for DomainSnapshot<R> {
    fn default() -> Self {
        Self::measured(Vec::new())
    }
}

/// Per-domain snapshots keyed by domain name when serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainSnapshots {
    pub facial_scan: DomainSnapshot<FacialScanRecord>,
    pub mental_health: DomainSnapshot<MentalHealthRecord>,
    pub exercise: DomainSnapshot<ExerciseRecord>,
    pub hydration: DomainSnapshot<HydrationRecord>,
    pub sleep: DomainSnapshot<SleepRecord>,
    pub weight: DomainSnapshot<WeightRecord>,
}

impl DomainSnapshots {
    pub fn provenance(&self, domain: Domain) -> Provenance {
        match domain {
            Domain::FacialScan => self.facial_scan.provenance,
            Domain::MentalHealth => self.mental_health.provenance,
            Domain::Exercise => self.exercise.provenance,
            Domain::Hydration => self.hydration.provenance,
            Domain::Sleep => self.sleep.provenance,
            Domain::Weight => self.weight.provenance,
        }
    }

    pub fn record_count(&self, domain: Domain) -> usize {
        match domain {
            Domain::FacialScan => self.facial_scan.records.len(),
            Domain::MentalHealth => self.mental_health.records.len(),
            Domain::Exercise => self.exercise.records.len(),
            Domain::Hydration => self.hydration.records.len(),
            Domain::Sleep => self.sleep.records.len(),
            Domain::Weight => self.weight.records.len(),
        }
    }
}

/// Named composite scores, each within [0, 100].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedScores {
    pub overall_wellness: u8,
    pub facial_composite_score: f64,
    pub mental_composite_score: f64,
}

/// Immutable point-in-time health report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ref: Option<String>,
    pub domain_snapshots: DomainSnapshots,
    pub derived_scores: DerivedScores,
}

impl HealthReport {
    /// Assemble a report with a freshly generated id.
    pub fn new(
        owner_ref: Option<String>,
        domain_snapshots: DomainSnapshots,
        derived_scores: DerivedScores,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at,
            owner_ref,
            domain_snapshots,
            derived_scores,
        }
    }
}

/// Lightweight pointer stored in the report index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportIndexEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
}

impl ReportIndexEntry {
    pub fn for_report(report: &HealthReport) -> Self {
        Self {
            id: report.id.clone(),
            created_at: report.created_at,
            display_name: display_name_for(report.created_at),
        }
    }
}
