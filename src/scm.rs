use crate::error::{ChangelogError, Result};
use crate::model::{ChangeLogSet, ChangeSet};
use crate::range::ChangeLogQuery;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One changelog query against one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogRequest {
    pub repository: String,
    pub basedir: PathBuf,
    pub query: ChangeLogQuery,
}

impl ChangeLogRequest {
    pub fn for_query(repository: impl Into<String>, basedir: impl Into<PathBuf>, query: ChangeLogQuery) -> Self {
        Self {
            repository: repository.into(),
            basedir: basedir.into(),
            query,
        }
    }
}

/// What an SCM backend hands back for one request.
#[derive(Debug, Clone, Default)]
pub struct ChangeLogResult {
    pub success: bool,
    pub provider_message: Option<String>,
    pub command_output: Option<String>,
    pub change_log: Option<ChangeLogSet>,
}

impl ChangeLogResult {
    pub fn succeeded(change_log: ChangeLogSet) -> Self {
        Self {
            success: true,
            change_log: Some(change_log),
            ..Self::default()
        }
    }

    pub fn failed(provider_message: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message: Some(provider_message.into()),
            ..Self::default()
        }
    }

    fn failure_message(&self) -> String {
        self.provider_message
            .as_deref()
            .or(self.command_output.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("the SCM provider reported a failure without a message")
            .to_string()
    }
}

/// Capability to query change history. Implemented by the surrounding
/// application; the reports only consume it.
pub trait ChangeLogSource {
    fn change_log(&self, request: &ChangeLogRequest) -> ChangeLogResult;
}

/// Runs one request per query, in order. The first unsuccessful result
/// aborts the whole run with its provider message.
pub fn fetch_change_logs(
    source: &dyn ChangeLogSource,
    repository: &str,
    basedir: &Path,
    queries: &[ChangeLogQuery],
) -> Result<Vec<ChangeLogSet>> {
    let mut sets = Vec::with_capacity(queries.len());
    for query in queries {
        let request = ChangeLogRequest::for_query(repository, basedir, query.clone());
        debug!(repository, kind = query.kind(), "requesting changelog");
        let result = source.change_log(&request);
        if !result.success {
            let message = result.failure_message();
            warn!(repository, %message, "changelog request failed");
            return Err(ChangelogError::Backend { message });
        }
        let set = result.change_log.unwrap_or_default();
        info!(repository, change_sets = set.len(), "changelog received");
        sets.push(set);
    }
    Ok(sets)
}

/// Serves queries from a previously persisted changelog document.
#[derive(Debug, Clone)]
pub struct XmlCacheSource {
    change_sets: Vec<ChangeSet>,
}

impl XmlCacheSource {
    /// Flattens every set of the cached document into one history,
    /// keeping document order.
    pub fn new(sets: Vec<ChangeLogSet>) -> Self {
        let change_sets = sets
            .iter()
            .flat_map(|set| set.change_sets().iter().cloned())
            .collect();
        Self { change_sets }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(crate::xml::parse_file(path)?.sets))
    }

    fn by_dates(&self, start: &chrono::DateTime<chrono::Utc>, end: &chrono::DateTime<chrono::Utc>) -> Vec<ChangeSet> {
        let (low, high) = if start <= end { (start, end) } else { (end, start) };
        self.change_sets
            .iter()
            .filter(|cs| cs.date() >= low && cs.date() <= high)
            .cloned()
            .collect()
    }

    fn by_revisions(&self, start: &str, end: &str) -> Vec<ChangeSet> {
        let touches = |cs: &ChangeSet, rev: &str| cs.files().iter().any(|f| f.revision() == rev);

        let first = if start.is_empty() {
            Some(0)
        } else {
            self.change_sets.iter().position(|cs| touches(cs, start))
        };
        let last = if end.is_empty() {
            self.change_sets.len().checked_sub(1)
        } else {
            self.change_sets.iter().rposition(|cs| touches(cs, end))
        };

        match (first, last) {
            (Some(first), Some(last)) if first <= last => self.change_sets[first..=last].to_vec(),
            _ => Vec::new(),
        }
    }
}

impl ChangeLogSource for XmlCacheSource {
    fn change_log(&self, request: &ChangeLogRequest) -> ChangeLogResult {
        let set = match &request.query {
            ChangeLogQuery::Dates { start, end, .. } => ChangeLogSet::new(self.by_dates(start, end))
                .with_dates(Some(start.date_naive()), Some(end.date_naive())),
            ChangeLogQuery::Revisions { start, end } => ChangeLogSet::new(self.by_revisions(start, end))
                .with_versions(
                    Some(start.clone()).filter(|s| !s.is_empty()),
                    Some(end.clone()).filter(|e| !e.is_empty()),
                ),
        };
        ChangeLogResult::succeeded(set)
    }
}
