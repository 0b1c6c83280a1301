//! Remote mental-health store over a PostgREST-style HTTP interface.
//!
//! Rows of `mental_health_analyses` are fetched newest first with their
//! `recommendations` sub-records joined in.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::SourceError;
use crate::model::MentalHealthRecord;
use crate::source::{FetchRequest, RecordSource};
use crate::utils::parse_record_date;

const TABLE_PATH: &str = "/rest/v1/mental_health_analyses";
const SELECT: &str = "*,recommendations(text)";

/// Source for the authenticated user's mental-health analyses.
#[derive(Clone, Debug)]
pub struct RestMentalHealthSource {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AnalysisRow {
    created_at: String,
    emotional_state: String,
    stress_level: f64,
    #[serde(default)]
    recommendations: Vec<RecommendationRow>,
}

#[derive(Debug, Deserialize)]
struct RecommendationRow {
    text: String,
}

impl RestMentalHealthSource {
    /// Create a new source.
    ///
    /// # Arguments
    /// * `base_url` - Project URL of the row store (e.g., "https://project.example.co")
    /// * `api_key` - Key sent as both `apikey` and bearer token
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, api_key: SecretString, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> SourceError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body: String = body.chars().take(256).collect();
        SourceError::Status { status, body }
    }
}

fn row_into_record(row: AnalysisRow) -> Result<MentalHealthRecord, SourceError> {
    let date = parse_record_date(&row.created_at).ok_or_else(|| {
        SourceError::Malformed(format!("invalid created_at: {}", row.created_at))
    })?;
    Ok(MentalHealthRecord {
        date,
        emotional_state: row.emotional_state,
        stress_level: row.stress_level,
        recommendations: row.recommendations.into_iter().map(|r| r.text).collect(),
    })
}

#[async_trait]
impl RecordSource<MentalHealthRecord> for RestMentalHealthSource {
    fn name(&self) -> &str {
        "remote:mental_health_analyses"
    }

    fn requires_identity(&self) -> bool {
        true
    }

    async fn fetch_recent(
        &self,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<MentalHealthRecord>, SourceError> {
        let Some(identity) = request.identity else {
            return Ok(Vec::new());
        };
        let url = format!("{}{}", self.base_url, TABLE_PATH);
        let req = self.get_request(&url).query(&[
            ("select", SELECT.to_string()),
            ("user_id", format!("eq.{}", identity.user_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", request.limit.to_string()),
        ]);
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        let bytes = resp.bytes().await?;
        let rows: Vec<AnalysisRow> =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Malformed(e.to_string()))?;
        rows.into_iter().map(row_into_record).collect()
    }
}
