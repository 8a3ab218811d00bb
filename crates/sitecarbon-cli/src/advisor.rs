//! Advisory-text client: turns an analysis into a consultant prompt and asks a
//! remote text generator for reduction tips.
//!
//! The endpoint accepts `{"prompt": "..."}` and answers `{"response": "..."}`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sitecarbon::format::format_bytes;
use sitecarbon::AnalysisResult;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TipRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct TipResponse {
    response: Option<String>,
}

/// Build the tip prompt from an analysis, graded under `model`.
pub fn build_prompt(result: &AnalysisResult, model: &str) -> String {
    let grade = result
        .grade(model)
        .map(|g| g.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let green = if result.metrics.is_green_hosting {
        "Yes"
    } else {
        "No"
    };

    format!(
        "You are a web sustainability consultant. Your goal is to provide concise, actionable \
tips to improve a website's carbon footprint. Focus on practical advice for developers and \
designers. Respond with a short, friendly introduction followed by a bulleted list of tips.
A website was analyzed with the following metrics:
- Page size: {size}
- Requests: {requests}
- Load time: {load}ms
- Grade ({model}): {grade}
- Green Hosting: {green}

Based on these metrics, what are 3-5 specific, actionable tips to reduce its carbon footprint? \
Focus on things like image optimization, code minification, and caching.",
        size = format_bytes(result.metrics.byte_size),
        requests = result.metrics.request_count,
        load = result.metrics.load_time_ms,
    )
}

const ADVISOR_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the advisory endpoint.
pub struct AdvisoryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AdvisoryClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Returns None if SITECARBON_ADVISOR_URL is not set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SITECARBON_ADVISOR_URL").ok()?;
        Some(Self::new(&url))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&TipRequest { prompt })
            .timeout(ADVISOR_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("failed to reach advisor at {}", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("advisor returned HTTP {status}");
        }

        let body: TipResponse = resp.json().await.context("invalid advisor response")?;
        match body.response {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => bail!("advisor returned no text"),
        }
    }

    /// Prompt built from `result` and sent in one step.
    pub async fn tips_for(&self, result: &AnalysisResult, model: &str) -> Result<String> {
        self.generate(&build_prompt(result, model)).await
    }
}
