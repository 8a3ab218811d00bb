//! Metrics provider contract and the simulated stand-in.
//!
//! The analyzer only sees [`MetricsProvider`]; randomness stays inside the
//! simulation and never reaches model or grading code.

use crate::config::SimulationConfig;
use crate::types::Metrics;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a metrics provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("fetch failed: {0}")]
    Network(String),
}

/// Source of page metrics for a URL.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch_metrics(&self, url: &str) -> Result<Metrics, FetchError>;
}

/// Random metrics with a fixed latency.
pub struct SimulatedProvider {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedProvider {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Draw one sample, or `None` when the simulated fetch should fail.
    fn sample(&self) -> Option<Metrics> {
        let cfg = &self.config;
        // Poisoned only if a draw panicked; the generator state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if cfg.failure_rate > 0.0 && rng.gen_bool(cfg.failure_rate.min(1.0)) {
            return None;
        }

        Some(Metrics {
            byte_size: rng.gen_range(cfg.byte_size.0..=cfg.byte_size.1),
            request_count: rng.gen_range(cfg.request_count.0..=cfg.request_count.1),
            load_time_ms: rng.gen_range(cfg.load_time_ms.0..=cfg.load_time_ms.1),
            is_green_hosting: rng.gen_bool(cfg.green_probability.clamp(0.0, 1.0)),
        })
    }
}

#[async_trait]
impl MetricsProvider for SimulatedProvider {
    async fn fetch_metrics(&self, url: &str) -> Result<Metrics, FetchError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        self.sample()
            .ok_or_else(|| FetchError::Network(format!("simulated failure for {url}")))
    }
}
