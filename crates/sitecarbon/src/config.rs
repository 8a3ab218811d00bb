//! Engine configuration with `SITECARBON_*` environment overrides.

use crate::error::{EngineError, Result};
use crate::models::EstimateParams;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Settings for [`crate::provider::SimulatedProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub latency_ms: u64,
    /// Inclusive range.
    pub byte_size: (u64, u64),
    pub request_count: (u32, u32),
    pub load_time_ms: (u64, u64),
    pub green_probability: f64,
    /// Probability that a fetch fails.
    pub failure_rate: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1_500,
            byte_size: (500_000, 2_500_000),
            request_count: (20, 100),
            load_time_ms: (1_000, 4_000),
            green_probability: 0.4,
            failure_rate: 0.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.byte_size.0 > self.byte_size.1
            || self.request_count.0 > self.request_count.1
            || self.load_time_ms.0 > self.load_time_ms.1
        {
            return Err(EngineError::InvalidInput(
                "simulation ranges must have min <= max".to_string(),
            ));
        }
        for (name, p) in [
            ("green probability", self.green_probability),
            ("failure rate", self.failure_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::InvalidInput(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    /// Per-analysis timeout; a timeout counts as unavailable metrics.
    pub timeout_ms: Option<u64>,
    /// Cap on in-flight provider calls during a ranking fan-out.
    pub max_concurrent: Option<usize>,
    /// Parameters applied to interactive single-URL analyses.
    pub interactive_params: EstimateParams,
}

impl EngineConfig {
    /// Defaults overlaid with `SITECARBON_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let sim = &mut config.simulation;

        if let Some(v) = parse_var(&lookup, "SITECARBON_LATENCY_MS")? {
            sim.latency_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "SITECARBON_GREEN_PROBABILITY")? {
            sim.green_probability = v;
        }
        if let Some(v) = parse_var(&lookup, "SITECARBON_FAILURE_RATE")? {
            sim.failure_rate = v;
        }
        sim.seed = parse_var(&lookup, "SITECARBON_SEED")?.or(sim.seed);
        config.timeout_ms = parse_var(&lookup, "SITECARBON_TIMEOUT_MS")?;
        config.max_concurrent = parse_var(&lookup, "SITECARBON_MAX_CONCURRENT")?;
        if let Some(name) = lookup("SITECARBON_PARAMS") {
            config.interactive_params = EstimateParams::preset(name.trim())?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.interactive_params.validate()?;
        if self.max_concurrent == Some(0) {
            return Err(EngineError::InvalidInput(
                "max concurrent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EngineError::InvalidInput(format!("{key}: cannot parse '{raw}'"))),
    }
}
