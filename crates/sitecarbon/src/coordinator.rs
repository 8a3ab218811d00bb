//! Owner of the mutable engine state: the current interactive result and the
//! ranking lifecycle.
//!
//! Both slots are replaced wholesale when an operation settles and are never
//! edited field by field.

use crate::analyzer::{validate_url, SiteAnalyzer};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{EstimateParams, ModelRegistry};
use crate::provider::{MetricsProvider, SimulatedProvider};
use crate::ranker::{rank_for, CatalogRanker, RankedRow, RankingMap};
use crate::types::AnalysisResult;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Ranking lifecycle: `Idle -> Loading -> Ready | Failed`, and `Ready` may reload.
#[derive(Debug, Clone)]
pub enum RankingState {
    Idle,
    Loading,
    /// Possibly partial: failed entries are simply absent.
    Ready(Arc<RankingMap>),
    /// The fan-out itself could not run.
    Failed(String),
}

impl RankingState {
    pub fn is_ready(&self) -> bool {
        matches!(self, RankingState::Ready(_))
    }

    pub fn results(&self) -> Option<&Arc<RankingMap>> {
        match self {
            RankingState::Ready(map) => Some(map),
            _ => None,
        }
    }
}

/// Clears the in-flight flag when the interactive analysis settles.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Coordinator {
    analyzer: Arc<SiteAnalyzer>,
    ranker: CatalogRanker,
    catalog: Arc<Catalog>,
    params: EstimateParams,
    current: RwLock<Option<Arc<AnalysisResult>>>,
    ranking: RwLock<RankingState>,
    in_flight: AtomicBool,
    generation: AtomicU64,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        registry: ModelRegistry,
        catalog: Catalog,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let analyzer = Arc::new(
            SiteAnalyzer::new(provider, Arc::new(registry)).with_timeout(config.timeout()),
        );
        let ranker =
            CatalogRanker::new(Arc::clone(&analyzer)).with_max_concurrent(config.max_concurrent);

        Ok(Self {
            analyzer,
            ranker,
            catalog: Arc::new(catalog),
            params: config.interactive_params,
            current: RwLock::new(None),
            ranking: RwLock::new(RankingState::Idle),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        })
    }

    /// Simulated provider and the standard model registry.
    pub fn from_config(config: &EngineConfig, catalog: Catalog) -> Result<Self> {
        let provider = Arc::new(SimulatedProvider::new(config.simulation.clone()));
        Self::new(provider, ModelRegistry::standard(), catalog, config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.analyzer.registry()
    }

    /// Interactive analysis of one URL.
    ///
    /// Refused with [`EngineError::Busy`] while another interactive analysis is
    /// running. On failure the previous result stays current.
    pub async fn analyze(&self, url: &str) -> Result<Arc<AnalysisResult>> {
        validate_url(url)?;
        let _in_flight = InFlight::claim(&self.in_flight).ok_or(EngineError::Busy)?;

        match self.analyzer.analyze_with(url, &self.params).await {
            Ok(result) => {
                let result = Arc::new(result);
                *self.current.write().await = Some(Arc::clone(&result));
                info!(url, "analysis stored as current result");
                Ok(result)
            }
            Err(err) => {
                warn!(url, error = %err, "analysis failed; keeping previous result");
                Err(err)
            }
        }
    }

    pub async fn current_result(&self) -> Option<Arc<AnalysisResult>> {
        self.current.read().await.clone()
    }

    pub async fn ranking_state(&self) -> RankingState {
        self.ranking.read().await.clone()
    }

    /// Re-rank the whole catalog. The new map replaces the old one.
    ///
    /// If a newer refresh starts before this one settles, this one's outcome
    /// is returned but not stored.
    pub async fn refresh_rankings(&self) -> RankingState {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *self.ranking.write().await = RankingState::Loading;
        info!(entries = self.catalog.len(), "ranking catalog");

        let state = match self.ranker.rank_all_detailed(self.catalog.entries()).await {
            Ok(report) => {
                for (url, err) in &report.failures {
                    warn!(url = %url, error = %err, "catalog entry left out of ranking");
                }
                info!(
                    ranked = report.results.len(),
                    omitted = report.failures.len(),
                    "ranking ready"
                );
                RankingState::Ready(Arc::new(report.results))
            }
            Err(err) => {
                warn!(error = %err, "ranking failed");
                RankingState::Failed(err.to_string())
            }
        };

        if self.generation.load(Ordering::Acquire) == generation {
            *self.ranking.write().await = state.clone();
        } else {
            debug!(generation, "discarding superseded ranking");
        }
        state
    }

    /// Ranking view of the current `Ready` map under `model`.
    pub async fn ranking(&self, model: &str) -> Result<Vec<RankedRow>> {
        let results = match &*self.ranking.read().await {
            RankingState::Ready(map) => Arc::clone(map),
            RankingState::Idle => return Err(EngineError::RankingNotReady("idle".to_string())),
            RankingState::Loading => {
                return Err(EngineError::RankingNotReady("loading".to_string()))
            }
            RankingState::Failed(reason) => {
                return Err(EngineError::RankingNotReady(format!("failed: {reason}")))
            }
        };
        let view = rank_for(model, &results, self.catalog.entries())?;
        Ok(view.into_iter().map(RankedRow::from).collect())
    }
}
