//! Counters emitted by the pipeline. Without an installed recorder these are no-ops.

use crate::model::Domain;

pub const SOURCE_FAILURES_TOTAL: &str = "wellness_report_source_failures_total";
pub const SYNTHETIC_SNAPSHOTS_TOTAL: &str = "wellness_report_synthetic_snapshots_total";
pub const REPORTS_SAVED_TOTAL: &str = "wellness_report_reports_saved_total";

pub fn record_source_failure(domain: Domain) {
    metrics::counter!(SOURCE_FAILURES_TOTAL, "domain" => domain.as_str()).increment(1);
}

pub fn record_synthetic_snapshot(domain: Domain) {
    metrics::counter!(SYNTHETIC_SNAPSHOTS_TOTAL, "domain" => domain.as_str()).increment(1);
}

pub fn record_report_saved() {
    metrics::counter!(REPORTS_SAVED_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_without_recorder_are_noops() {
        for domain in Domain::ALL {
            record_source_failure(domain);
            record_synthetic_snapshot(domain);
        }
        record_report_saved();
    }
}
