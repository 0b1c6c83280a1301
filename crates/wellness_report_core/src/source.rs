//! Pluggable domain data sources.
//!
//! A [`RecordSource`] answers "most recent N records for this identity". The
//! collector wraps each source in a [`DomainProvider`] so that real
//! measurement integrations and synthetic placeholder generators stay
//! distinguishable all the way into the persisted snapshot.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::SourceError;
use crate::model::{Identity, Provenance};

/// Parameters of a single fetch.
#[derive(Clone, Copy, Debug)]
pub struct FetchRequest<'a> {
    pub identity: Option<&'a Identity>,
    /// Maximum number of records (or days, for daily metrics) wanted.
    pub limit: usize,
    /// Reference day for trailing windows.
    pub today: NaiveDate,
}

#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Sources backed by per-user storage return `true`; the collector skips
    /// them when no identity is supplied.
    fn requires_identity(&self) -> bool {
        false
    }

    async fn fetch_recent(&self, request: &FetchRequest<'_>) -> Result<Vec<R>, SourceError>;
}

/// A source tagged with the kind of data it produces.
pub enum DomainProvider<R> {
    Real(Arc<dyn RecordSource<R>>),
    SyntheticPlaceholder(Arc<dyn RecordSource<R>>),
}

impl<R> Clone for DomainProvider<R> {
    fn clone(&self) -> Self {
        match self {
            DomainProvider::Real(s) => DomainProvider::Real(Arc::clone(s)),
            DomainProvider::SyntheticPlaceholder(s) => {
                DomainProvider::SyntheticPlaceholder(Arc::clone(s))
            }
        }
    }
}

impl<R: Send + 'static> DomainProvider<R> {
    pub fn real(source: impl RecordSource<R> + 'static) -> Self {
        DomainProvider::Real(Arc::new(source))
    }

    pub fn synthetic(source: impl RecordSource<R> + 'static) -> Self {
        DomainProvider::SyntheticPlaceholder(Arc::new(source))
    }

    pub fn source(&self) -> &Arc<dyn RecordSource<R>> {
        match self {
            DomainProvider::Real(s) | DomainProvider::SyntheticPlaceholder(s) => s,
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            DomainProvider::Real(_) => Provenance::Measured,
            DomainProvider::SyntheticPlaceholder(_) => Provenance::Synthetic,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, DomainProvider::SyntheticPlaceholder(_))
    }
}

/// Reads records from a local JSON file.
///
/// The file holds either a bare array of records or, with [`at_key`](Self::at_key),
/// an object (such as a cached profile) whose named field holds the array.
/// A missing file means "no history" and yields an empty list.
pub struct JsonFileSource<R> {
    name: String,
    path: PathBuf,
    key: Option<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R> JsonFileSource<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("file:{}", path.display()),
            path,
            key: None,
            _record: PhantomData,
        }
    }

    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

#[async_trait]
impl<R> RecordSource<R> for JsonFileSource<R>
where
    R: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_recent(&self, _request: &FetchRequest<'_>) -> Result<Vec<R>, SourceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SourceError::Io(e.to_string())),
        };
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Malformed(e.to_string()))?;
        let value = match &self.key {
            Some(key) => match value.get(key.as_str()) {
                Some(v) => v.clone(),
                None => return Ok(Vec::new()),
            },
            None => value,
        };
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }
}
