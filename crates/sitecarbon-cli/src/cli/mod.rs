//! CLI subcommand implementations for the sitecarbon binary.

pub mod analyze_cmd;
pub mod models_cmd;
pub mod output;
pub mod rank_cmd;

use anyhow::{Context, Result};
use sitecarbon::{EngineConfig, EstimateParams};

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub latency_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub seed: Option<u64>,
    pub max_concurrent: Option<usize>,
    /// Named estimate-parameter preset for interactive analyses.
    pub params: Option<String>,
}

/// Defaults, then `SITECARBON_*` variables, then flags.
pub fn engine_config(overrides: &ConfigOverrides) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env().context("invalid SITECARBON_* environment")?;
    if let Some(ms) = overrides.latency_ms {
        config.simulation.latency_ms = ms;
    }
    if overrides.timeout_ms.is_some() {
        config.timeout_ms = overrides.timeout_ms;
    }
    if overrides.seed.is_some() {
        config.simulation.seed = overrides.seed;
    }
    if overrides.max_concurrent.is_some() {
        config.max_concurrent = overrides.max_concurrent;
    }
    if let Some(name) = &overrides.params {
        config.interactive_params = EstimateParams::preset(name).context("invalid --params")?;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = engine_config(&ConfigOverrides {
            latency_ms: Some(0),
            timeout_ms: Some(750),
            seed: Some(5),
            max_concurrent: Some(2),
            params: None,
        })
        .unwrap();
        assert_eq!(config.simulation.latency_ms, 0);
        assert_eq!(config.timeout_ms, Some(750));
        assert_eq!(config.simulation.seed, Some(5));
        assert_eq!(config.max_concurrent, Some(2));
    }

    #[test]
    fn test_params_flag_selects_preset() {
        let config = engine_config(&ConfigOverrides {
            params: Some("canada-returning".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            config.interactive_params,
            EstimateParams::canada_returning_visitors()
        );

        let overrides = ConfigOverrides {
            params: Some("nowhere".to_string()),
            ..Default::default()
        };
        assert!(engine_config(&overrides).is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let overrides = ConfigOverrides {
            max_concurrent: Some(0),
            ..Default::default()
        };
        assert!(engine_config(&overrides).is_err());
    }
}
