//! Emissions models: pure byte-count to grams-of-CO2 estimators.
//!
//! Models live in a [`ModelRegistry`] and are looked up by identifier. Nothing
//! outside this module branches on a model's name.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the per-megabyte model.
pub const ONE_BYTE: &str = "oneByte";
/// Identifier of the per-kilobit model.
pub const SWD: &str = "swd";

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Grams per MB transferred.
const ONE_BYTE_GREEN_RATE: f64 = 1.8;
const ONE_BYTE_GRID_RATE: f64 = 4.6;

/// Grams per kilobit transferred.
const SWD_GREEN_RATE: f64 = 0.0015;
const SWD_GRID_RATE: f64 = 0.0035;

/// Signature shared by every registered model.
pub type EstimateFn = fn(byte_size: u64, green_hosting: bool, params: &EstimateParams) -> f64;

/// Optional adjustments applied to an estimate.
///
/// The default value leaves both multipliers at exactly 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateParams {
    /// Regional grid intensity relative to the global average.
    #[serde(default)]
    pub grid_factor: Option<f64>,
    /// Share of page data re-downloaded by returning visitors.
    #[serde(default)]
    pub data_reload_ratio: Option<f64>,
    /// Share of visits that are first visits.
    #[serde(default)]
    pub first_visit_share: Option<f64>,
}

/// Preset names accepted by [`EstimateParams::preset`].
pub const PARAM_PRESETS: [&str; 2] = ["none", "canada-returning"];

impl EstimateParams {
    /// Look up a named parameter set.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "none" => Ok(Self::default()),
            "canada-returning" => Ok(Self::canada_returning_visitors()),
            other => Err(EngineError::InvalidInput(format!(
                "unknown parameter preset '{other}' (available: {})",
                PARAM_PRESETS.join(", ")
            ))),
        }
    }

    /// Canadian grid, 75% first visits, returning visitors reload 2% of the page.
    pub fn canada_returning_visitors() -> Self {
        Self {
            grid_factor: Some(0.3),
            data_reload_ratio: Some(0.02),
            first_visit_share: Some(0.75),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(f) = self.grid_factor {
            if !(f.is_finite() && f >= 0.0) {
                return Err(EngineError::InvalidInput(format!(
                    "grid factor must be a non-negative number, got {f}"
                )));
            }
        }
        for (name, value) in [
            ("data reload ratio", self.data_reload_ratio),
            ("first visit share", self.first_visit_share),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(EngineError::InvalidInput(format!(
                        "{name} must be within [0, 1], got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Multiplier on the emission rate.
    pub fn rate_factor(&self) -> f64 {
        self.grid_factor.unwrap_or(1.0)
    }

    /// Share of the page's bytes actually transferred per visit.
    pub fn transfer_share(&self) -> f64 {
        match self.first_visit_share {
            Some(first) => first + (1.0 - first) * self.data_reload_ratio.unwrap_or(0.0),
            None => 1.0,
        }
    }
}

/// Per-megabyte model: `(bytes / 2^20) * rate`.
pub fn one_byte(byte_size: u64, green_hosting: bool, params: &EstimateParams) -> f64 {
    let rate = if green_hosting {
        ONE_BYTE_GREEN_RATE
    } else {
        ONE_BYTE_GRID_RATE
    };
    let megabytes = byte_size as f64 * params.transfer_share() / BYTES_PER_MB;
    megabytes * (rate * params.rate_factor())
}

/// Per-kilobit model: `(bytes * 8 / 1024) * rate`.
pub fn swd(byte_size: u64, green_hosting: bool, params: &EstimateParams) -> f64 {
    let rate = if green_hosting {
        SWD_GREEN_RATE
    } else {
        SWD_GRID_RATE
    };
    let kilobits = byte_size as f64 * params.transfer_share() * 8.0 / 1024.0;
    kilobits * (rate * params.rate_factor())
}

/// A registered model.
#[derive(Clone, Copy)]
pub struct EmissionsModel {
    pub id: &'static str,
    /// Human label, e.g. "OneByte".
    pub name: &'static str,
    pub estimate: EstimateFn,
}

impl fmt::Debug for EmissionsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmissionsModel")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of models keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<EmissionsModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the per-megabyte and per-kilobit models.
    pub fn standard() -> Self {
        Self {
            models: vec![
                EmissionsModel {
                    id: ONE_BYTE,
                    name: "OneByte",
                    estimate: one_byte,
                },
                EmissionsModel {
                    id: SWD,
                    name: "SWD",
                    estimate: swd,
                },
            ],
        }
    }

    /// Add a model. Identifiers must be unique.
    pub fn register(&mut self, model: EmissionsModel) -> Result<()> {
        if self.get(model.id).is_some() {
            return Err(EngineError::DuplicateEntry(format!("model '{}'", model.id)));
        }
        self.models.push(model);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&EmissionsModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registered models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EmissionsModel> {
        self.models.iter()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Estimate grams of CO2 with the model registered under `id`.
    pub fn estimate(
        &self,
        id: &str,
        byte_size: u64,
        green_hosting: bool,
        params: &EstimateParams,
    ) -> Result<f64> {
        params.validate()?;
        let model = self
            .get(id)
            .ok_or_else(|| EngineError::UnknownModel(id.to_string()))?;
        Ok((model.estimate)(byte_size, green_hosting, params))
    }
}
