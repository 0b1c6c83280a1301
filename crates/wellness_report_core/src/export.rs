//! Flat text rendering of a report.
//!
//! Section order is fixed and every heading is always printed. A section
//! whose domain is empty prints a neutral placeholder line; a section built
//! from placeholder generators is marked as synthetic.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::model::{DomainSnapshot, HealthReport, Provenance};
use crate::scorer::{
    exercise_summary, hydration_summary, recommendations, sleep_summary, weight_trend,
};
use crate::{ReportError, ReportResult};

pub const SECTION_HEADINGS: [&str; 7] = [
    "Mental Health",
    "Facial Analysis",
    "Fitness",
    "Water Intake",
    "Sleep",
    "Weight",
    "Overall Recommendations",
];

const SYNTHETIC_MARKER: &str = "_(synthetic placeholder data)_";
const UNAVAILABLE_LINE: &str = "Data source unavailable; no records could be loaded.";
const RENDER_PLACEHOLDER: &str = "This section could not be rendered.";
const MAX_LISTED_RECORDS: usize = 7;

type Section = ReportResult<Vec<String>>;

/// `health_report_<YYYY-MM-DD>.md`
pub fn export_filename(date: NaiveDate) -> String {
    format!("health_report_{}.md", date.format("%Y-%m-%d"))
}

/// Write the rendered report into `dir` and return the file path.
pub async fn write_export(report: &HealthReport, dir: &Path) -> ReportResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ReportError::Export(format!("create {}: {e}", dir.display())))?;
    let path = dir.join(export_filename(report.created_at.date_naive()));
    tokio::fs::write(&path, render_report(report))
        .await
        .map_err(|e| ReportError::Export(format!("write {}: {e}", path.display())))?;
    Ok(path)
}

pub fn render_report(report: &HealthReport) -> String {
    render_with(report, cfg!(debug_assertions))
}

/// With `strict`, a section that fails to render panics instead of printing
/// the placeholder line.
fn render_with(report: &HealthReport, strict: bool) -> String {
    let scores = &report.derived_scores;
    let mut out = vec![
        "# Health Report".to_string(),
        String::new(),
        format!("Generated: {}", report.created_at.format("%Y-%m-%d %H:%M UTC")),
        format!("Report ID: {}", report.id),
        format!(
            "Overall Wellness: {}/100 ({})",
            scores.overall_wellness,
            scores.band()
        ),
    ];

    let sections: [Section; 7] = [
        mental_health(report),
        facial_analysis(report),
        fitness(report),
        water_intake(report),
        sleep(report),
        weight(report),
        overall_recommendations(report),
    ];
    for (heading, body) in SECTION_HEADINGS.iter().zip(sections) {
        out.push(String::new());
        out.push(format!("## {heading}"));
        out.push(String::new());
        out.extend(section_or_placeholder(heading, body, strict));
    }
    out.push(String::new());
    out.join("\n")
}

fn section_or_placeholder(heading: &str, body: Section, strict: bool) -> Vec<String> {
    match body {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!(section = heading, error = %e, "report section failed to render");
            if strict {
                panic!("section {heading} failed to render: {e}");
            }
            vec![RENDER_PLACEHOLDER.to_string()]
        }
    }
}

fn finite(field: &str, value: f64) -> ReportResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ReportError::Render(format!("{field} is not a finite number")))
    }
}

/// Placeholder line for empty snapshots, `None` when there is data to show.
fn empty_line<R>(snapshot: &DomainSnapshot<R>, what: &str) -> Option<Vec<String>> {
    if !snapshot.is_empty() {
        return None;
    }
    let line = match snapshot.provenance {
        Provenance::Unavailable => UNAVAILABLE_LINE.to_string(),
        _ => format!("No {what} recorded."),
    };
    Some(vec![line])
}

fn mark_synthetic<R>(snapshot: &DomainSnapshot<R>, mut lines: Vec<String>) -> Vec<String> {
    if snapshot.is_synthetic() {
        lines.push(SYNTHETIC_MARKER.to_string());
    }
    lines
}

fn mental_health(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.mental_health;
    if let Some(lines) = empty_line(snapshot, "mental health entries") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(latest) = snapshot.latest() {
        lines.push(format!("- Emotional state: {}", latest.emotional_state));
        lines.push(format!(
            "- Stress level: {:.0}/100",
            finite("stressLevel", latest.stress_level)?
        ));
        lines.push(format!("- Last check-in: {}", latest.date));
    }
    lines.push(format!(
        "- Mental composite score: {:.1}/100",
        finite(
            "mentalCompositeScore",
            report.derived_scores.mental_composite_score
        )?
    ));
    Ok(mark_synthetic(snapshot, lines))
}

fn facial_analysis(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.facial_scan;
    if let Some(lines) = empty_line(snapshot, "facial scans") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(latest) = snapshot.latest() {
        lines.push(format!("- Scan date: {}", latest.date));
        lines.push(format!(
            "- Stress level: {:.0}/100",
            finite("stressLevel", latest.stress_level)?
        ));
        lines.push(format!(
            "- Sleep quality: {:.0}/100",
            finite("sleepQuality", latest.sleep_quality)?
        ));
        lines.push(format!(
            "- Hydration level: {:.0}/100",
            finite("hydrationLevel", latest.hydration_level)?
        ));
        lines.push(format!(
            "- Skin health: {:.0}/100",
            finite("skinHealth", latest.skin_health)?
        ));
    }
    lines.push(format!(
        "- Facial composite score: {:.1}/100",
        finite(
            "facialCompositeScore",
            report.derived_scores.facial_composite_score
        )?
    ));
    Ok(mark_synthetic(snapshot, lines))
}

fn fitness(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.exercise;
    if let Some(lines) = empty_line(snapshot, "exercise sessions") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(summary) = exercise_summary(snapshot) {
        lines.push(format!("- Sessions: {}", summary.sessions));
        lines.push(format!(
            "- Total duration: {:.0} min",
            finite("durationMinutes", summary.total_minutes)?
        ));
        if let Some(intensity) = summary.dominant_intensity {
            lines.push(format!("- Typical intensity: {}", intensity.as_str()));
        }
    }
    for r in snapshot.records.iter().take(MAX_LISTED_RECORDS) {
        lines.push(format!(
            "  - {}: {} ({:.0} min, {})",
            r.date,
            r.name,
            finite("durationMinutes", r.duration_minutes)?,
            r.intensity.as_str()
        ));
    }
    Ok(mark_synthetic(snapshot, lines))
}

fn water_intake(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.hydration;
    if let Some(lines) = empty_line(snapshot, "water intake") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(summary) = hydration_summary(snapshot) {
        lines.push(format!(
            "- Average daily intake: {:.0} ml ({:.1}% of {} ml goal)",
            summary.average_ml, summary.goal_percent, summary.goal_ml
        ));
    }
    for r in snapshot.records.iter().take(MAX_LISTED_RECORDS) {
        lines.push(format!("  - {}: {} ml", r.date, r.amount_ml));
    }
    Ok(mark_synthetic(snapshot, lines))
}

fn sleep(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.sleep;
    if let Some(lines) = empty_line(snapshot, "sleep data") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(summary) = sleep_summary(snapshot) {
        lines.push(format!(
            "- Average duration: {:.1} h",
            finite("durationHours", summary.average_hours)?
        ));
        lines.push(format!(
            "- Average quality: {:.1}/100",
            finite("quality", summary.average_quality)?
        ));
    }
    for r in snapshot.records.iter().take(MAX_LISTED_RECORDS) {
        lines.push(format!(
            "  - {}: {:.1} h, quality {:.0}",
            r.date, r.duration_hours, r.quality
        ));
    }
    Ok(mark_synthetic(snapshot, lines))
}

fn weight(report: &HealthReport) -> Section {
    let snapshot = &report.domain_snapshots.weight;
    if let Some(lines) = empty_line(snapshot, "weight readings") {
        return Ok(lines);
    }
    let mut lines = Vec::new();
    if let Some(trend) = weight_trend(snapshot) {
        lines.push(format!(
            "- Latest: {:.1} kg",
            finite("weight", trend.latest_kg)?
        ));
        lines.push(format!(
            "- Net change over period: {:+.1} kg (from {:.1} kg)",
            finite("weight", trend.net_change_kg)?,
            finite("weight", trend.earliest_kg)?
        ));
    }
    Ok(mark_synthetic(snapshot, lines))
}

fn overall_recommendations(report: &HealthReport) -> Section {
    let lines = recommendations(
        &report.domain_snapshots,
        &report.derived_scores,
        report.created_at.date_naive(),
    );
    if lines.is_empty() {
        return Ok(vec!["No recommendations at this time.".to_string()]);
    }
    Ok(lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DerivedScores, DomainSnapshots, HydrationRecord, MentalHealthRecord, WeightRecord,
        WeightUnit,
    };
    use chrono::{DateTime, Utc};

    fn empty_report() -> HealthReport {
        HealthReport {
            id: "r1".into(),
            created_at: DateTime::parse_from_rfc3339("2026-03-05T09:30:00Z")
                .expect("ts")
                .with_timezone(&Utc),
            owner_ref: None,
            domain_snapshots: DomainSnapshots::default(),
            derived_scores: DerivedScores {
                overall_wellness: 73,
                facial_composite_score: 75.0,
                mental_composite_score: 70.0,
            },
        }
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::parse_from_str("2026-03-05", "%Y-%m-%d").expect("date");
        assert_eq!(export_filename(date), "health_report_2026-03-05.md");
    }

    #[test]
    fn empty_report_keeps_every_heading_in_order() {
        let text = render_report(&empty_report());
        let mut last = 0;
        for heading in SECTION_HEADINGS {
            let pos = text
                .find(&format!("## {heading}\n"))
                .unwrap_or_else(|| panic!("missing heading {heading}"));
            assert!(pos >= last, "{heading} out of order");
            last = pos;
        }
        assert!(text.contains("Overall Wellness: 73/100 (Fair)"));
        assert!(text.contains("No water intake recorded."));
    }

    #[test]
    fn unavailable_and_synthetic_sections_are_flagged() {
        let mut report = empty_report();
        report.domain_snapshots.sleep = DomainSnapshot::unavailable();
        report.domain_snapshots.hydration = DomainSnapshot::synthetic(vec![HydrationRecord {
            date: NaiveDate::parse_from_str("2026-03-05", "%Y-%m-%d").expect("date"),
            amount_ml: 2000,
            goal_ml: 2500,
        }]);
        let text = render_report(&report);
        assert!(text.contains(UNAVAILABLE_LINE));
        assert!(text.contains("- Average daily intake: 2000 ml (80.0% of 2500 ml goal)"));
        assert!(text.contains(SYNTHETIC_MARKER));
    }

    #[test]
    fn weight_section_shows_change_from_earliest_reading() {
        let mut report = empty_report();
        let reading = |d: &str, weight| WeightRecord {
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("date"),
            weight,
            unit: WeightUnit::Kg,
        };
        report.domain_snapshots.weight = DomainSnapshot::measured(vec![
            reading("2026-03-05", 74.2),
            reading("2026-03-01", 75.0),
        ]);
        let text = render_report(&report);
        assert!(text.contains("- Latest: 74.2 kg"));
        assert!(text.contains("- Net change over period: -0.8 kg (from 75.0 kg)"));
    }

    fn report_with_nan_stress() -> HealthReport {
        let mut report = empty_report();
        report.domain_snapshots.mental_health = DomainSnapshot::measured(vec![MentalHealthRecord {
            date: NaiveDate::parse_from_str("2026-03-05", "%Y-%m-%d").expect("date"),
            emotional_state: "Calm".into(),
            stress_level: f64::NAN,
            recommendations: vec![],
        }]);
        report
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "section Mental Health failed to render")]
    fn non_finite_value_panics_in_debug_builds() {
        render_report(&report_with_nan_stress());
    }

    #[test]
    #[should_panic(expected = "failed to render")]
    fn strict_rendering_panics_on_non_finite_value() {
        render_with(&report_with_nan_stress(), true);
    }

    #[test]
    fn lenient_rendering_replaces_only_the_broken_section() {
        let text = render_with(&report_with_nan_stress(), false);
        let mental = text
            .split("## Mental Health\n")
            .nth(1)
            .and_then(|rest| rest.split("## Facial Analysis").next())
            .expect("mental section");
        assert_eq!(mental.trim(), RENDER_PLACEHOLDER);
        for heading in SECTION_HEADINGS {
            assert!(text.contains(&format!("## {heading}\n")), "missing {heading}");
        }
        assert!(text.contains("No facial scans recorded."));
    }

    #[tokio::test]
    async fn write_export_creates_named_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_export(&empty_report(), &dir.path().join("out"))
            .await
            .expect("export");
        assert!(path.ends_with("health_report_2026-03-05.md"));
        let text = tokio::fs::read_to_string(&path).await.expect("read");
        assert!(text.starts_with("# Health Report"));
    }
}
