//! Single-URL analysis pipeline: fetch metrics, run every model, grade.

use crate::error::{EngineError, Result};
use crate::grade::classify;
use crate::models::{EstimateParams, ModelRegistry};
use crate::provider::{FetchError, MetricsProvider};
use crate::types::{AnalysisResult, Metrics, ModelEstimate};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

/// Reject anything that is not an `http(s)://` URL without whitespace or quotes.
pub fn validate_url(url: &str) -> Result<()> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"^https?://[^\s"]+$"#).expect("url regex is valid"));

    if url.is_empty() {
        return Err(EngineError::InvalidInput("url is empty".to_string()));
    }
    if !re.is_match(url) {
        return Err(EngineError::InvalidInput(format!(
            "'{url}' is not a valid URL; it must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Runs the analysis pipeline against a metrics provider.
pub struct SiteAnalyzer {
    provider: Arc<dyn MetricsProvider>,
    registry: Arc<ModelRegistry>,
    timeout: Option<Duration>,
}

impl SiteAnalyzer {
    pub fn new(provider: Arc<dyn MetricsProvider>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            provider,
            registry,
            timeout: None,
        }
    }

    /// Bound each provider call; an elapsed timeout is reported as unavailable metrics.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Analyze with default (zero) estimate parameters.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        self.analyze_with(url, &EstimateParams::default()).await
    }

    /// Analyze a URL. No retry; a provider failure yields no result at all.
    pub async fn analyze_with(&self, url: &str, params: &EstimateParams) -> Result<AnalysisResult> {
        validate_url(url)?;
        params.validate()?;

        let metrics = self
            .fetch(url)
            .await
            .map_err(|e| EngineError::MetricsUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let result = self.assemble(url, metrics, params);
        debug!(
            url,
            bytes = metrics.byte_size,
            green = metrics.is_green_hosting,
            "analysis complete"
        );
        Ok(result)
    }

    async fn fetch(&self, url: &str) -> std::result::Result<Metrics, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.fetch_metrics(url))
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => self.provider.fetch_metrics(url).await,
        }
    }

    /// Pure step: one estimate per registered model.
    fn assemble(&self, url: &str, metrics: Metrics, params: &EstimateParams) -> AnalysisResult {
        let estimates: BTreeMap<String, ModelEstimate> = self
            .registry
            .iter()
            .map(|model| {
                let grams = (model.estimate)(metrics.byte_size, metrics.is_green_hosting, params);
                let estimate = ModelEstimate {
                    model: model.id.to_string(),
                    grams,
                    grade: classify(grams),
                };
                (model.id.to_string(), estimate)
            })
            .collect();

        AnalysisResult {
            url: url.to_string(),
            metrics,
            estimates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::models::{ONE_BYTE, SWD};
    use async_trait::async_trait;

    struct FixedProvider(Metrics);

    #[async_trait]
    impl MetricsProvider for FixedProvider {
        async fn fetch_metrics(&self, _url: &str) -> std::result::Result<Metrics, FetchError> {
            Ok(self.0)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl MetricsProvider for FailingProvider {
        async fn fetch_metrics(&self, _url: &str) -> std::result::Result<Metrics, FetchError> {
            Err(FetchError::Network("connection reset".to_string()))
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl MetricsProvider for SlowProvider {
        async fn fetch_metrics(&self, _url: &str) -> std::result::Result<Metrics, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(FetchError::Network("unreachable".to_string()))
        }
    }

    fn metrics(byte_size: u64, green: bool) -> Metrics {
        Metrics {
            byte_size,
            request_count: 42,
            load_time_ms: 1_800,
            is_green_hosting: green,
        }
    }

    fn analyzer(provider: impl MetricsProvider + 'static) -> SiteAnalyzer {
        SiteAnalyzer::new(Arc::new(provider), Arc::new(ModelRegistry::standard()))
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("https://exa mple.com").is_err());
        assert!(validate_url("https://example.com\n").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[tokio::test]
    async fn test_one_estimate_per_model() {
        let result = analyzer(FixedProvider(metrics(1_000_000, true)))
            .analyze("https://example.com")
            .await
            .unwrap();

        assert_eq!(result.estimates.len(), 2);
        let one = result.estimate(ONE_BYTE).unwrap();
        assert_eq!(one.grams, 1.8 * 1_000_000.0 / 1_048_576.0);
        assert_eq!(one.grade, Grade::B);
        assert_eq!(result.grade(SWD), Some(Grade::F));
        assert_eq!(result.metrics.request_count, 42);
    }

    #[tokio::test]
    async fn test_extra_model_shows_up_in_result() {
        fn flat(_: u64, _: bool, _: &EstimateParams) -> f64 {
            0.1
        }
        let mut registry = ModelRegistry::standard();
        registry
            .register(crate::models::EmissionsModel {
                id: "flat",
                name: "Flat",
                estimate: flat,
            })
            .unwrap();
        let analyzer = SiteAnalyzer::new(
            Arc::new(FixedProvider(metrics(10, false))),
            Arc::new(registry),
        );

        let result = analyzer.analyze("https://example.com").await.unwrap();
        assert_eq!(result.estimates.len(), 3);
        assert_eq!(result.grade("flat"), Some(Grade::APlus));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_fetch() {
        let err = analyzer(FailingProvider).analyze("not a url").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_metrics_unavailable() {
        let err = analyzer(FailingProvider)
            .analyze("https://example.com")
            .await
            .unwrap_err();
        match err {
            EngineError::MetricsUnavailable { url, reason } => {
                assert_eq!(url, "https://example.com");
                assert!(reason.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_metrics_unavailable() {
        let analyzer = analyzer(SlowProvider).with_timeout(Some(Duration::from_millis(20)));
        let err = analyzer.analyze("https://example.com").await.unwrap_err();
        assert!(matches!(err, EngineError::MetricsUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_params_applied_to_every_model() {
        let analyzer = analyzer(FixedProvider(metrics(2_000_000, false)));
        let plain = analyzer.analyze("https://example.com").await.unwrap();
        let tuned = analyzer
            .analyze_with(
                "https://example.com",
                &EstimateParams::canada_returning_visitors(),
            )
            .await
            .unwrap();
        for model in [ONE_BYTE, SWD] {
            assert!(tuned.grams(model).unwrap() < plain.grams(model).unwrap());
        }
    }
}
