//! Concurrent catalog ranking.
//!
//! `rank_all` fans out one analysis per catalog entry and waits for every
//! branch to settle. Failed entries are dropped from the map. `rank_for` is a
//! pure derivation over that map and is recomputed whenever the model changes.

use crate::analyzer::SiteAnalyzer;
use crate::catalog::CatalogEntry;
use crate::error::{EngineError, Result};
use crate::types::AnalysisResult;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

/// Successful analyses keyed by URL.
pub type RankingMap = BTreeMap<String, AnalysisResult>;

/// Everything a fan-out produced, including the entries that failed.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    pub results: RankingMap,
    /// Failing URLs in catalog order.
    pub failures: Vec<(String, EngineError)>,
}

/// One row of a ranking view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub result: &'a AnalysisResult,
    /// 1-based, relative to the model the view was built for.
    pub position: usize,
    pub grams: f64,
}

impl AsRef<CatalogEntry> for RankedEntry<'_> {
    fn as_ref(&self) -> &CatalogEntry {
        self.entry
    }
}

/// Owned copy of a [`RankedEntry`], for views that outlive the map they were
/// built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub entry: CatalogEntry,
    pub result: AnalysisResult,
    pub position: usize,
    pub grams: f64,
}

impl From<RankedEntry<'_>> for RankedRow {
    fn from(row: RankedEntry<'_>) -> Self {
        Self {
            entry: row.entry.clone(),
            result: row.result.clone(),
            position: row.position,
            grams: row.grams,
        }
    }
}

impl AsRef<CatalogEntry> for RankedRow {
    fn as_ref(&self) -> &CatalogEntry {
        &self.entry
    }
}

/// Runs the analyzer over a whole catalog.
pub struct CatalogRanker {
    analyzer: Arc<SiteAnalyzer>,
    limiter: Option<Arc<Semaphore>>,
}

impl CatalogRanker {
    pub fn new(analyzer: Arc<SiteAnalyzer>) -> Self {
        Self {
            analyzer,
            limiter: None,
        }
    }

    /// Cap the number of provider calls in flight at once.
    pub fn with_max_concurrent(mut self, max: Option<usize>) -> Self {
        self.limiter = max.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    pub fn analyzer(&self) -> &SiteAnalyzer {
        &self.analyzer
    }

    /// Analyze every entry concurrently and keep the successes.
    pub async fn rank_all(&self, catalog: &[CatalogEntry]) -> Result<RankingMap> {
        Ok(self.rank_all_detailed(catalog).await?.results)
    }

    /// Like [`rank_all`](Self::rank_all), but also reports which entries failed.
    ///
    /// Errors only when the fan-out itself cannot start, i.e. there is no
    /// Tokio runtime to spawn on. A branch that panics counts as a failure of
    /// its own entry.
    pub async fn rank_all_detailed(&self, catalog: &[CatalogEntry]) -> Result<FanOutReport> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| EngineError::FanOut(format!("no async runtime: {e}")))?;

        let mut tasks = JoinSet::new();
        let mut branches: HashMap<Id, (usize, String)> = HashMap::with_capacity(catalog.len());
        for (index, entry) in catalog.iter().enumerate() {
            let analyzer = Arc::clone(&self.analyzer);
            let limiter = self.limiter.clone();
            let url = entry.url.clone();

            let handle = tasks.spawn_on(
                async move {
                    let _permit = match limiter {
                        Some(sem) => match sem.acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(e) => {
                                return (index, url, Err(EngineError::FanOut(e.to_string())));
                            }
                        },
                        None => None,
                    };
                    let outcome = analyzer.analyze(&url).await;
                    (index, url, outcome)
                },
                &runtime,
            );
            branches.insert(handle.id(), (index, entry.url.clone()));
        }

        let mut report = FanOutReport::default();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (_, url, Ok(result)))) => {
                    report.results.insert(url, result);
                }
                Ok((_, (index, url, Err(err)))) => failures.push((index, url, err)),
                Err(join_err) => {
                    let Some((index, url)) = branches.remove(&join_err.id()) else {
                        warn!(error = %join_err, "unknown analysis task settled");
                        continue;
                    };
                    warn!(url = %url, error = %join_err, "analysis task aborted");
                    let err = EngineError::MetricsUnavailable {
                        url: url.clone(),
                        reason: format!("analysis task aborted: {join_err}"),
                    };
                    failures.push((index, url, err));
                }
            }
        }

        failures.sort_by_key(|(index, _, _)| *index);
        report.failures = failures.into_iter().map(|(_, url, err)| (url, err)).collect();

        debug!(
            entries = catalog.len(),
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "fan-out settled"
        );
        Ok(report)
    }
}

/// Order the analyzed catalog entries by one model's grams, lowest first.
///
/// Entries without a result are left out. Ties keep catalog order. Fails only
/// if a present result has no estimate for `model`.
pub fn rank_for<'a>(
    model: &str,
    results: &'a RankingMap,
    catalog: &'a [CatalogEntry],
) -> Result<Vec<RankedEntry<'a>>> {
    let mut rows = Vec::with_capacity(results.len());
    for (index, entry) in catalog.iter().enumerate() {
        let Some(result) = results.get(&entry.url) else {
            continue;
        };
        let grams = result
            .grams(model)
            .ok_or_else(|| EngineError::UnknownModel(model.to_string()))?;
        rows.push((index, entry, result, grams));
    }

    rows.sort_by(|a, b| a.3.total_cmp(&b.3).then(a.0.cmp(&b.0)));

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, (_, entry, result, grams))| RankedEntry {
            entry,
            result,
            position: i + 1,
            grams,
        })
        .collect())
}

/// Rows of `view` in one category, keeping their whole-catalog positions.
pub fn filter_category<R>(view: &[R], category: &str) -> Vec<R>
where
    R: AsRef<CatalogEntry> + Clone,
{
    view.iter()
        .filter(|row| row.as_ref().category == category)
        .cloned()
        .collect()
}
