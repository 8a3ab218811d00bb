//! Sitecarbon: estimate the carbon emissions of serving a web page and rank
//! a catalog of pages by that estimate.
//!
//! The public surface is small: [`SiteAnalyzer::analyze`],
//! [`CatalogRanker::rank_all`], [`rank_for`], [`classify`] and the two model
//! functions [`models::one_byte`] and [`models::swd`]. [`Coordinator`] wraps
//! them with the state an interactive front end needs.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod grade;
pub mod models;
pub mod provider;
pub mod ranker;
pub mod types;

pub use analyzer::{validate_url, SiteAnalyzer};
pub use catalog::{Catalog, CatalogEntry};
pub use config::{EngineConfig, SimulationConfig};
pub use coordinator::{Coordinator, RankingState};
pub use error::{EngineError, Result};
pub use grade::{classify, Grade};
pub use models::{EstimateParams, ModelRegistry};
pub use provider::{FetchError, MetricsProvider, SimulatedProvider};
pub use ranker::{
    filter_category, rank_for, CatalogRanker, FanOutReport, RankedEntry, RankedRow, RankingMap,
};
pub use types::{AnalysisResult, Metrics, ModelEstimate};
