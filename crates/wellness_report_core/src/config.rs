use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::synthetic::{DEFAULT_HYDRATION_GOAL_ML, DEFAULT_WEIGHT_BASELINE_KG};
use crate::{ReportError, ReportResult};

pub const DEFAULT_DATA_DIR: &str = "./wellness-data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DAILY_WINDOW_DAYS: u32 = 7;

/// Credentials of the remote mental-health row store.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: SecretString,
}

#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Root for local domain files (`sources/`) and the report store (`reports/`).
    pub data_dir: PathBuf,
    pub generation_timeout: Duration,
    /// Register placeholder generators for domains without history.
    pub synthetic_placeholders: bool,
    pub hydration_goal_ml: u32,
    pub weight_baseline_kg: f64,
    pub daily_window_days: u32,
    pub remote: Option<RemoteConfig>,
    pub user_id: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            generation_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            synthetic_placeholders: true,
            hydration_goal_ml: DEFAULT_HYDRATION_GOAL_ML,
            weight_baseline_kg: DEFAULT_WEIGHT_BASELINE_KG,
            daily_window_days: DEFAULT_DAILY_WINDOW_DAYS,
            remote: None,
            user_id: None,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> ReportResult<T> {
    match raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| ReportError::Config(format!("{key} has invalid value {s:?}"))),
    }
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> ReportResult<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ReportError::Config(format!(
            "{key} has invalid value {other:?}"
        ))),
    }
}

impl ReportConfig {
    pub fn from_env() -> ReportResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> ReportResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = get("WELLNESS_REPORT_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let timeout_secs = parse_var(
            "WELLNESS_REPORT_TIMEOUT_SECS",
            get("WELLNESS_REPORT_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ReportError::Config(
                "WELLNESS_REPORT_TIMEOUT_SECS must be positive".into(),
            ));
        }
        let synthetic_placeholders = parse_bool(
            "WELLNESS_REPORT_SYNTHETIC",
            get("WELLNESS_REPORT_SYNTHETIC"),
            true,
        )?;
        let hydration_goal_ml = parse_var(
            "WELLNESS_REPORT_HYDRATION_GOAL_ML",
            get("WELLNESS_REPORT_HYDRATION_GOAL_ML"),
            DEFAULT_HYDRATION_GOAL_ML,
        )?;
        if hydration_goal_ml == 0 {
            return Err(ReportError::Config(
                "WELLNESS_REPORT_HYDRATION_GOAL_ML must be positive".into(),
            ));
        }
        let weight_baseline_kg: f64 = parse_var(
            "WELLNESS_REPORT_WEIGHT_BASELINE_KG",
            get("WELLNESS_REPORT_WEIGHT_BASELINE_KG"),
            DEFAULT_WEIGHT_BASELINE_KG,
        )?;
        if !weight_baseline_kg.is_finite() || weight_baseline_kg <= 0.0 {
            return Err(ReportError::Config(
                "WELLNESS_REPORT_WEIGHT_BASELINE_KG must be a positive number".into(),
            ));
        }
        let daily_window_days = parse_var(
            "WELLNESS_REPORT_DAILY_WINDOW_DAYS",
            get("WELLNESS_REPORT_DAILY_WINDOW_DAYS"),
            DEFAULT_DAILY_WINDOW_DAYS,
        )?;
        if daily_window_days == 0 {
            return Err(ReportError::Config(
                "WELLNESS_REPORT_DAILY_WINDOW_DAYS must be positive".into(),
            ));
        }

        let remote_url = get("WELLNESS_REPORT_REMOTE_URL").filter(|s| !s.trim().is_empty());
        let remote = match remote_url {
            None => None,
            Some(base_url) => {
                let api_key = get("WELLNESS_REPORT_REMOTE_KEY")
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| {
                        ReportError::Config(
                            "WELLNESS_REPORT_REMOTE_KEY missing while WELLNESS_REPORT_REMOTE_URL is set"
                                .into(),
                        )
                    })?;
                Some(RemoteConfig {
                    base_url,
                    api_key: SecretString::new(api_key.into()),
                })
            }
        };
        let user_id = get("WELLNESS_REPORT_USER_ID").filter(|s| !s.trim().is_empty());

        Ok(Self {
            data_dir,
            generation_timeout: Duration::from_secs(timeout_secs),
            synthetic_placeholders,
            hydration_goal_ml,
            weight_baseline_kg,
            daily_window_days,
            remote,
            user_id,
        })
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.data_dir.join("sources")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }
}
