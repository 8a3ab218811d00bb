//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the estimation and ranking engine.
///
/// Individual catalog failures during a ranking fan-out are never turned into
/// an error of their own; they only show up as missing entries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Rejected before any work started (bad URL, bad parameter, bad config).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The metrics provider failed or timed out for this URL.
    #[error("metrics unavailable for {url}: {reason}")]
    MetricsUnavailable { url: String, reason: String },

    /// No emissions model is registered under this identifier.
    #[error("unknown emissions model: {0}")]
    UnknownModel(String),

    /// A catalog or registry key was declared twice.
    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    /// An interactive analysis is already in flight on this coordinator.
    #[error("an analysis is already in progress")]
    Busy,

    /// The concurrent fan-out could not be started.
    #[error("ranking fan-out failed: {0}")]
    FanOut(String),

    /// A ranking view was requested before a ranking settled successfully.
    #[error("rankings are not ready: {0}")]
    RankingNotReady(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
