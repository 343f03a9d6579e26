//! Statistics sources
//!
//! A source hands out raw year statistics documents for a selection and
//! lists the years that have any. The file source reads the layout
//!
//! ```text
//! wallets-statistics/<year>.json
//! wallets-statistics/<year>/year-by-wallets/<wallet>.json
//! ```

use async_trait::async_trait;
use finchart_codec::YearStatisticsDocument;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CoreError, CoreResult};

/// Selection of statistics to display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsQuery {
    /// All wallets of a year
    Year(i32),
    /// One wallet of a year
    Wallet { wallet_id: String, year: i32 },
}

impl StatisticsQuery {
    pub fn year(&self) -> i32 {
        match self {
            StatisticsQuery::Year(year) => *year,
            StatisticsQuery::Wallet { year, .. } => *year,
        }
    }

    /// Document path relative to the statistics directory
    pub fn relative_path(&self) -> PathBuf {
        match self {
            StatisticsQuery::Year(year) => PathBuf::from(format!("{}.json", year)),
            StatisticsQuery::Wallet { wallet_id, year } => PathBuf::from(year.to_string())
                .join("year-by-wallets")
                .join(format!("{}.json", wallet_id)),
        }
    }
}

impl std::fmt::Display for StatisticsQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatisticsQuery::Year(year) => write!(f, "{}", year),
            StatisticsQuery::Wallet { wallet_id, year } => write!(f, "{}/{}", year, wallet_id),
        }
    }
}

/// Source of raw statistics documents
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Fetch the document for a selection
    async fn fetch(&self, query: &StatisticsQuery) -> CoreResult<YearStatisticsDocument>;

    /// Distinct years with statistics, ascending
    async fn available_years(&self) -> CoreResult<Vec<i32>>;
}

/// Reads documents from a statistics directory
#[derive(Debug, Clone)]
pub struct FileStatisticsSource {
    root: PathBuf,
}

impl FileStatisticsSource {
    /// `root` is the `wallets-statistics` directory itself
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl StatisticsSource for FileStatisticsSource {
    async fn fetch(&self, query: &StatisticsQuery) -> CoreResult<YearStatisticsDocument> {
        let path = self.root.join(query.relative_path());
        log::debug!(target: "finchart::source", "Reading {}", path.display());

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CoreError::StatisticsNotFound {
                    path: path.to_string_lossy().to_string(),
                }
            } else {
                log::error!(target: "finchart::source", "Failed to read {}: {}", path.display(), e);
                CoreError::IoError
            }
        })?;

        Ok(YearStatisticsDocument::from_json(&content)?)
    }

    async fn available_years(&self) -> CoreResult<Vec<i32>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut years = BTreeSet::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(year) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i32>().ok())
            {
                years.insert(year);
            }
        }

        Ok(years.into_iter().collect())
    }
}

/// Holds documents in memory
#[derive(Debug, Default)]
pub struct InMemoryStatisticsSource {
    documents: RwLock<HashMap<StatisticsQuery, YearStatisticsDocument>>,
}

impl InMemoryStatisticsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, query: StatisticsQuery, document: YearStatisticsDocument) -> Self {
        self.insert(query, document);
        self
    }

    pub fn insert(&self, query: StatisticsQuery, document: YearStatisticsDocument) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(query, document);
        }
    }
}

#[async_trait]
impl StatisticsSource for InMemoryStatisticsSource {
    async fn fetch(&self, query: &StatisticsQuery) -> CoreResult<YearStatisticsDocument> {
        let documents = self.documents.read().map_err(|_| CoreError::IoError)?;
        documents
            .get(query)
            .cloned()
            .ok_or_else(|| CoreError::StatisticsNotFound {
                path: query.to_string(),
            })
    }

    async fn available_years(&self) -> CoreResult<Vec<i32>> {
        let documents = self.documents.read().map_err(|_| CoreError::IoError)?;
        let years: BTreeSet<i32> = documents.keys().map(|q| q.year()).collect();
        Ok(years.into_iter().collect())
    }
}
