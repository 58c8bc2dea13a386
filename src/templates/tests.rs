use super::*;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn candidate(id: &str, url: &str, source: &str) -> Candidate {
    Candidate::new(id, format!("name {id}"), url, source)
}

struct StaticSource {
    name: &'static str,
    items: Vec<Candidate>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TemplateSource for StaticSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
}

struct BrokenSource;

#[async_trait]
impl TemplateSource for BrokenSource {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        Err(SourceError::Status {
            origin: "broken",
            status: 503,
        })
    }
}

struct SlowSource;

#[async_trait]
impl TemplateSource for SlowSource {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![candidate("slow", "https://slow/x.png", "slow")])
    }
}

#[test]
fn test_merge_dedupes_by_id_keeping_first_seen() {
    let a = vec![
        candidate("1", "https://a/1.png", "a"),
        candidate("2", "https://a/2.png", "a"),
    ];
    let b = vec![
        candidate("2", "https://b/2.png", "b"),
        candidate("3", "https://b/3.png", "b"),
    ];

    let merged = merge_candidates(vec![a, b]);

    let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(merged[1].source, "a");
}

#[test]
fn test_merge_dedupes_by_url() {
    let merged = merge_candidates(vec![
        vec![candidate("1", "https://same/x.png", "a")],
        vec![candidate("reddit:9", "https://same/x.png", "b")],
    ]);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, "1");
}

#[test]
fn test_merge_keeps_distinct_candidates_with_empty_urls() {
    let merged = merge_candidates(vec![vec![
        candidate("1", "", "a"),
        candidate("2", "", "a"),
    ]]);

    assert_eq!(merged.len(), 2);
}

#[tokio::test]
async fn test_load_isolates_failing_sources() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = TemplatePool::new(Duration::from_secs(5))
        .with_source(BrokenSource)
        .with_source(StaticSource {
            name: "good",
            items: vec![candidate("1", "https://g/1.png", "good")],
            calls: Arc::clone(&calls),
        });

    let loaded = pool.load().await;

    assert_eq!(loaded, vec![candidate("1", "https://g/1.png", "good")]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_times_out_slow_source() {
    let pool = TemplatePool::new(Duration::from_millis(200))
        .with_source(SlowSource)
        .with_source(StaticSource {
            name: "good",
            items: vec![candidate("1", "https://g/1.png", "good")],
            calls: Arc::new(AtomicUsize::new(0)),
        });

    let loaded = pool.load().await;

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].source, "good");
}

#[tokio::test]
async fn test_load_uses_static_fallback_when_all_fail() {
    let pool = TemplatePool::default().with_source(BrokenSource);

    let loaded = pool.load().await;

    assert_eq!(loaded, static_fallback());
    assert_eq!(loaded.len(), 3);
    assert!(loaded.iter().all(|c| c.source == "fallback"));
}

#[tokio::test]
async fn test_load_with_no_sources_uses_static_fallback() {
    assert_eq!(TemplatePool::default().load().await, static_fallback());
}

#[test]
fn test_cache_respects_ttl() {
    let mut cache = TemplateCache::default();
    let start = Instant::now();
    let ttl = Duration::from_secs(1800);
    assert!(cache.get(start, ttl).is_none());

    let pool = Arc::new(static_fallback());
    cache.store(Arc::clone(&pool), start);

    let hit = cache.get(start + Duration::from_secs(60), ttl).expect("fresh");
    assert!(Arc::ptr_eq(&hit, &pool));
    assert!(cache.get(start + ttl, ttl).is_none());

    cache.clear();
    assert!(cache.loaded_at().is_none());
}

#[test]
fn test_pool_reports_source_names() {
    let pool = TemplatePool::default()
        .with_source(BrokenSource)
        .with_source(SlowSource);
    assert_eq!(pool.source_names(), vec!["broken", "slow"]);
}
