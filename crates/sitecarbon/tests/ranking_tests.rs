//! End-to-end ranking over stubbed metrics.

use async_trait::async_trait;
use sitecarbon::models::{ONE_BYTE, SWD};
use sitecarbon::{
    rank_for, CatalogEntry, CatalogRanker, FetchError, Grade, Metrics, MetricsProvider,
    ModelRegistry, SiteAnalyzer,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_test::assert_ok;

/// Fixed byte sizes, all green. Unknown URLs fail.
struct StubProvider {
    sizes: HashMap<&'static str, u64>,
}

#[async_trait]
impl MetricsProvider for StubProvider {
    async fn fetch_metrics(&self, url: &str) -> Result<Metrics, FetchError> {
        // Completion order deliberately differs from catalog order.
        let delay = (url.len() % 3) as u64 * 5;
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;

        let byte_size = self
            .sizes
            .get(url)
            .copied()
            .ok_or_else(|| FetchError::Network(format!("{url}: connection refused")))?;
        Ok(Metrics {
            byte_size,
            request_count: 25,
            load_time_ms: 1_500,
            is_green_hosting: true,
        })
    }
}

const A: &str = "https://a.test/";
const B: &str = "https://b.test/";
const C: &str = "https://c.test/";
const BROKEN: &str = "https://broken.test/";

fn ranker(sizes: &[(&'static str, u64)]) -> CatalogRanker {
    let provider = StubProvider {
        sizes: sizes.iter().copied().collect(),
    };
    let analyzer = SiteAnalyzer::new(Arc::new(provider), Arc::new(ModelRegistry::standard()));
    CatalogRanker::new(Arc::new(analyzer))
}

fn catalog(urls: &[&str]) -> Vec<CatalogEntry> {
    urls.iter()
        .map(|u| CatalogEntry::new(u, u, "ALL"))
        .collect()
}

#[tokio::test]
async fn test_end_to_end_one_byte_ranking() {
    let ranker = ranker(&[(A, 1_000_000), (B, 2_000_000), (C, 500_000)]);
    let catalog = catalog(&[A, B, C]);

    let results = assert_ok!(ranker.rank_all(&catalog).await);
    assert_eq!(results.len(), 3);

    let a = &results[A];
    assert!((a.grams(ONE_BYTE).unwrap() - 1.7166).abs() < 1e-3);
    assert_eq!(a.grade(ONE_BYTE), Some(Grade::B));
    assert!((results[B].grams(ONE_BYTE).unwrap() - 3.4332).abs() < 1e-3);
    assert_eq!(results[B].grade(ONE_BYTE), Some(Grade::D));
    assert!((results[C].grams(ONE_BYTE).unwrap() - 0.8583).abs() < 1e-3);
    assert_eq!(results[C].grade(ONE_BYTE), Some(Grade::A));

    let view = assert_ok!(rank_for(ONE_BYTE, &results, &catalog));
    let order: Vec<(&str, usize)> = view
        .iter()
        .map(|r| (r.entry.url.as_str(), r.position))
        .collect();
    assert_eq!(order, vec![(C, 1), (A, 2), (B, 3)]);
}

#[tokio::test]
async fn test_failing_entry_is_omitted_everywhere() {
    let ranker = ranker(&[(A, 1_000_000), (B, 2_000_000), (C, 500_000)]);
    let catalog = catalog(&[A, BROKEN, B, C]);

    let results = assert_ok!(ranker.rank_all(&catalog).await);
    assert_eq!(results.len(), catalog.len() - 1);
    assert!(!results.contains_key(BROKEN));

    for model in [ONE_BYTE, SWD] {
        let view = assert_ok!(rank_for(model, &results, &catalog));
        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|r| r.entry.url != BROKEN));
    }
}

#[tokio::test]
async fn test_every_result_has_one_estimate_per_model() {
    let ranker = ranker(&[(A, 10), (B, 20_000_000)]);
    let results = assert_ok!(ranker.rank_all(&catalog(&[A, B])).await);
    for result in results.values() {
        assert_eq!(result.estimates.len(), 2);
        assert!(result.estimates.values().all(|e| e.grams >= 0.0));
    }
}

#[tokio::test]
async fn test_identical_sizes_rank_in_catalog_order() {
    let ranker = ranker(&[(A, 800_000), (B, 800_000), (C, 800_000)]);
    let catalog = catalog(&[C, A, B]);

    let results = assert_ok!(ranker.rank_all(&catalog).await);
    for model in [ONE_BYTE, SWD] {
        let view = assert_ok!(rank_for(model, &results, &catalog));
        let urls: Vec<&str> = view.iter().map(|r| r.entry.url.as_str()).collect();
        assert_eq!(urls, vec![C, A, B]);
    }
}

#[tokio::test]
async fn test_rerun_replaces_results() {
    let first = ranker(&[(A, 100), (B, 200)]);
    let second = ranker(&[(A, 300)]);
    let catalog = catalog(&[A, B]);

    let before = assert_ok!(first.rank_all(&catalog).await);
    let after = assert_ok!(second.rank_all(&catalog).await);
    assert_eq!(before.len(), 2);
    assert_eq!(after.len(), 1);
    assert_eq!(after[A].metrics.byte_size, 300);
}
