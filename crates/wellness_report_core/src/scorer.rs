//! Composite wellness scores and on-demand display summaries.
//!
//! Every function here is pure and total: an empty domain short-circuits to a
//! documented default (or `None` for display summaries) instead of dividing
//! by zero. The formulas are simple unweighted averages kept verbatim for
//! behavioral parity; they are illustrative, not a clinical model.

use std::collections::HashMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{
    DerivedScores, DomainSnapshot, DomainSnapshots, ExerciseRecord, FacialScanRecord,
    HydrationRecord, Intensity, MentalHealthRecord, SleepRecord, WeightRecord,
};
use crate::utils::{round1, window_start};

pub const EXCELLENT_THRESHOLD: u8 = 90;
pub const GOOD_THRESHOLD: u8 = 75;
pub const FAIR_THRESHOLD: u8 = 60;

pub const DEFAULT_FACIAL_COMPOSITE: f64 = 75.0;
pub const DEFAULT_MENTAL_COMPOSITE: f64 = 70.0;

const HYDRATION_LOW_PERCENT: f64 = 80.0;
const SLEEP_TARGET_HOURS: f64 = 7.0;
const HIGH_STRESS_LEVEL: f64 = 60.0;
const MIN_WEEKLY_SESSIONS: usize = 3;
const WEEK_DAYS: u32 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum WellnessBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl WellnessBand {
    pub fn from_score(score: u8) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            WellnessBand::Excellent
        } else if score >= GOOD_THRESHOLD {
            WellnessBand::Good
        } else if score >= FAIR_THRESHOLD {
            WellnessBand::Fair
        } else {
            WellnessBand::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WellnessBand::Excellent => "Excellent",
            WellnessBand::Good => "Good",
            WellnessBand::Fair => "Fair",
            WellnessBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for WellnessBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl DerivedScores {
    pub fn band(&self) -> WellnessBand {
        WellnessBand::from_score(self.overall_wellness)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Mean of sleep quality, hydration level, skin health and inverted stress of
/// the latest facial scan.
pub fn facial_composite_score(snapshot: &DomainSnapshot<FacialScanRecord>) -> f64 {
    let Some(latest) = snapshot.latest() else {
        return DEFAULT_FACIAL_COMPOSITE;
    };
    let parts = [
        latest.sleep_quality,
        latest.hydration_level,
        latest.skin_health,
        100.0 - latest.stress_level,
    ];
    mean(parts.into_iter().map(clamp_percent)).unwrap_or(DEFAULT_FACIAL_COMPOSITE)
}

/// Inverted stress level of the latest mental-health entry.
pub fn mental_composite_score(snapshot: &DomainSnapshot<MentalHealthRecord>) -> f64 {
    match snapshot.latest() {
        Some(latest) => clamp_percent(100.0 - latest.stress_level),
        None => DEFAULT_MENTAL_COMPOSITE,
    }
}

/// Rounded mean of the two composites, always within [0, 100].
pub fn overall_wellness(facial: f64, mental: f64) -> u8 {
    let avg = (clamp_percent(facial) + clamp_percent(mental)) / 2.0;
    avg.round().clamp(0.0, 100.0) as u8
}

pub fn derive_scores(snapshots: &DomainSnapshots) -> DerivedScores {
    let facial = facial_composite_score(&snapshots.facial_scan);
    let mental = mental_composite_score(&snapshots.mental_health);
    DerivedScores {
        overall_wellness: overall_wellness(facial, mental),
        facial_composite_score: facial,
        mental_composite_score: mental,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HydrationSummary {
    pub average_ml: f64,
    pub goal_ml: u32,
    pub goal_percent: f64,
}

pub fn hydration_summary(snapshot: &DomainSnapshot<HydrationRecord>) -> Option<HydrationSummary> {
    let average_ml = mean(snapshot.records.iter().map(|r| f64::from(r.amount_ml)))?;
    let goal_ml = snapshot.latest()?.goal_ml;
    let goal_percent = if goal_ml == 0 {
        0.0
    } else {
        average_ml / f64::from(goal_ml) * 100.0
    };
    Some(HydrationSummary {
        average_ml: average_ml.round(),
        goal_ml,
        goal_percent: round1(goal_percent),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct SleepSummary {
    pub average_hours: f64,
    pub average_quality: f64,
}

pub fn sleep_summary(snapshot: &DomainSnapshot<SleepRecord>) -> Option<SleepSummary> {
    Some(SleepSummary {
        average_hours: round1(mean(snapshot.records.iter().map(|r| r.duration_hours))?),
        average_quality: round1(mean(snapshot.records.iter().map(|r| r.quality))?),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeightTrend {
    pub latest_kg: f64,
    pub earliest_kg: f64,
    /// `latest - earliest` over the retained window.
    pub net_change_kg: f64,
}

pub fn weight_trend(snapshot: &DomainSnapshot<WeightRecord>) -> Option<WeightTrend> {
    let latest = snapshot.latest()?.weight_kg();
    let earliest = snapshot.earliest()?.weight_kg();
    Some(WeightTrend {
        latest_kg: round1(latest),
        earliest_kg: round1(earliest),
        net_change_kg: round1(latest - earliest),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSummary {
    pub sessions: usize,
    pub total_minutes: f64,
    pub dominant_intensity: Option<Intensity>,
}

pub fn exercise_summary(snapshot: &DomainSnapshot<ExerciseRecord>) -> Option<ExerciseSummary> {
    if snapshot.is_empty() {
        return None;
    }
    let mut counts: HashMap<Intensity, usize> = HashMap::new();
    for r in &snapshot.records {
        *counts.entry(r.intensity).or_default() += 1;
    }
    // max_by_key keeps the last maximum, so ties resolve toward higher intensity
    let dominant_intensity = [Intensity::Low, Intensity::Moderate, Intensity::High]
        .into_iter()
        .filter(|i| counts.contains_key(i))
        .max_by_key(|i| counts[i]);
    Some(ExerciseSummary {
        sessions: snapshot.records.len(),
        total_minutes: snapshot.records.iter().map(|r| r.duration_minutes).sum(),
        dominant_intensity,
    })
}

/// Exercise sessions dated within the 7 days ending on `today`.
pub fn sessions_this_week(snapshot: &DomainSnapshot<ExerciseRecord>, today: NaiveDate) -> usize {
    let start = window_start(today, WEEK_DAYS);
    snapshot
        .records
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .count()
}

/// Recommendation lines for the report's closing section, relative to
/// `today`. Order is stable and duplicates are removed.
pub fn recommendations(
    snapshots: &DomainSnapshots,
    scores: &DerivedScores,
    today: NaiveDate,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut push = |line: String| {
        if !lines.contains(&line) {
            lines.push(line);
        }
    };

    if let Some(latest) = snapshots.mental_health.latest() {
        for r in &latest.recommendations {
            let r = r.trim();
            if !r.is_empty() {
                push(r.to_string());
            }
        }
        if latest.stress_level > HIGH_STRESS_LEVEL {
            push("Schedule short breaks to bring stress levels down".to_string());
        }
    }
    if let Some(latest) = snapshots.facial_scan.latest() {
        if latest.stress_level > HIGH_STRESS_LEVEL {
            push("Facial scan shows signs of stress; prioritise rest and relaxation".to_string());
        }
    }
    if let Some(h) = hydration_summary(&snapshots.hydration) {
        if h.goal_percent < HYDRATION_LOW_PERCENT {
            push(format!(
                "Increase daily water intake toward your {} ml goal",
                h.goal_ml
            ));
        }
    }
    if let Some(s) = sleep_summary(&snapshots.sleep) {
        if s.average_hours < SLEEP_TARGET_HOURS {
            push("Aim for at least 7 hours of sleep per night".to_string());
        }
    }
    if sessions_this_week(&snapshots.exercise, today) < MIN_WEEKLY_SESSIONS {
        push("Add at least three exercise sessions per week".to_string());
    }

    push(
        match scores.band() {
            WellnessBand::Excellent => "Keep up your current routine",
            WellnessBand::Good => "You are on a good track; small consistent gains will add up",
            WellnessBand::Fair => "Focus on one habit at a time to lift your overall wellness",
            WellnessBand::NeedsImprovement => {
                "Consider talking to a professional about a wellness plan"
            }
        }
        .to_string(),
    );
    lines
}
