use std::sync::atomic::Ordering;

use tempfile::TempDir;

use super::*;
use crate::compliance::ComplianceLog;
use crate::generator::{GeneratorError, ImageBackend};
use crate::ideas::FALLBACK_IDEA;
use crate::mock::{
    FixedChecker, StaticImageBackend, StaticTemplateSource, offline_parts, sample_candidates,
};
use crate::ranking::RankingError;

fn offline(dir: &TempDir) -> Orchestrator {
    Orchestrator::new(offline_parts(dir.path(), sample_candidates()))
}

#[tokio::test]
async fn test_template_cache_is_idempotent_within_ttl() {
    let dir = TempDir::new().unwrap();
    let source = StaticTemplateSource::new("static", sample_candidates());
    let fetches = source.fetch_counter();

    let mut parts = offline_parts(dir.path(), Vec::new());
    parts.templates = TemplatePool::default().with_source(source);
    let orchestrator = Orchestrator::new(parts);

    let first = orchestrator.templates().await;
    let second = orchestrator.templates().await;

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, sample_candidates());
}

#[tokio::test]
async fn test_expired_cache_refetches() {
    let dir = TempDir::new().unwrap();
    let source = StaticTemplateSource::new("static", sample_candidates());
    let fetches = source.fetch_counter();

    let mut parts = offline_parts(dir.path(), Vec::new());
    parts.templates = TemplatePool::default().with_source(source);
    parts.template_ttl = Duration::ZERO;
    let orchestrator = Orchestrator::new(parts);

    orchestrator.templates().await;
    orchestrator.templates().await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let dir = TempDir::new().unwrap();
    let source = StaticTemplateSource::new("static", sample_candidates());
    let fetches = source.fetch_counter();

    let mut parts = offline_parts(dir.path(), Vec::new());
    parts.templates = TemplatePool::default().with_source(source);
    let orchestrator = Orchestrator::new(parts);

    orchestrator.templates().await;
    orchestrator.invalidate_templates();
    orchestrator.templates().await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_get_templates_ranks_matching_names_first() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let ranked = orchestrator.get_templates("cat", Some(2), &[]).await.unwrap();

    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|s| s.candidate.name.contains("cat")));
}

#[tokio::test]
async fn test_get_templates_rejects_zero_k() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let err = orchestrator.get_templates("cat", Some(0), &[]).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Ranking(RankingError::InvalidTopK)));
}

#[tokio::test]
async fn test_search_templates_uses_literal_plan_offline() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let search = orchestrator.search_templates("office", None).await.unwrap();

    assert_eq!(search.plan.search_prompt, "office");
    assert!(search.plan.tags.is_empty());
    assert!(search.templates[0].candidate.name.contains("office"));
}

#[tokio::test]
async fn test_get_idea_serves_fallback_without_sources() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let idea = orchestrator.get_idea().await;
    assert_eq!(idea.idea, FALLBACK_IDEA);
    assert_eq!(idea.source, "fallback");
}

#[tokio::test]
async fn test_suggest_captions_come_from_local_templates() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let suggestions = orchestrator.suggest_captions("mondays", None).await;

    assert_eq!(suggestions.source, "local");
    assert!(!suggestions.captions.is_empty());
}

#[tokio::test]
async fn test_generate_meme_runs_compliance_first() {
    let dir = TempDir::new().unwrap();
    let backend = StaticImageBackend::returning("memegen", "https://img.test/out.png");
    let calls = backend.call_counter();

    let mut parts = offline_parts(dir.path(), sample_candidates());
    parts.generator =
        ImageGenerator::new(vec![ImageBackend::Memegen]).with_backend(ImageBackend::Memegen, backend);
    parts.compliance = ComplianceChain::new().with_checker(FixedChecker::blocking("policy", "nope"));
    let orchestrator = Orchestrator::new(parts);

    let request = GenerateRequest::new("memegen:drake", "top", "bottom");
    let err = orchestrator.generate_meme(&request).await.unwrap_err();

    match err {
        OrchestratorError::Blocked { reason } => assert_eq!(reason, "policy: nope"),
        other => panic!("expected Blocked, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generate_meme_returns_first_backend_url() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let request = GenerateRequest::new("memegen:drake", "old way", "new way");
    let meme = orchestrator.generate_meme(&request).await.unwrap();

    assert_eq!(meme.backend, "memegen");
    assert!(meme.meme_url.ends_with("/images/drake/old_way/new_way.png"));
}

#[tokio::test]
async fn test_generate_meme_exhaustion_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut parts = offline_parts(dir.path(), sample_candidates());
    parts.generator = ImageGenerator::new(vec![ImageBackend::Imgflip, ImageBackend::Memegen])
        .with_backend(ImageBackend::Imgflip, StaticImageBackend::failing("imgflip"))
        .with_backend(ImageBackend::Memegen, StaticImageBackend::failing("memegen"));
    let orchestrator = Orchestrator::new(parts);

    let err = orchestrator
        .generate_meme(&GenerateRequest::new("61579", "a", "b"))
        .await
        .unwrap_err();

    match err {
        OrchestratorError::Generator(GeneratorError::Exhausted(exhausted)) => {
            assert_eq!(exhausted.failures.len(), 2);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_check_caption_logs_every_verdict() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit.csv");
    let mut parts = offline_parts(dir.path(), sample_candidates());
    parts.compliance = ComplianceChain::new()
        .with_checker(crate::compliance::BannedWordChecker::default())
        .with_log(Arc::new(ComplianceLog::new(log_path.clone())));
    let orchestrator = Orchestrator::new(parts);

    let ok = orchestrator.check_caption("hello there").await;
    let blocked = orchestrator.check_caption("just lynch it").await;

    assert_eq!(ok.status(), "ok");
    assert_eq!(blocked.status(), "blocked");

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.lines().count(), 3);
}

#[tokio::test]
async fn test_plan_meme_falls_back_to_local_offline() {
    let dir = TempDir::new().unwrap();
    let orchestrator = offline(&dir);

    let plan = orchestrator.plan_meme("code review").await;
    assert!(!plan.image_prompt.is_empty());
    assert_eq!(plan.captions.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_cache_entry() {
    let dir = TempDir::new().unwrap();
    let orchestrator = Arc::new(offline(&dir));
    let warm = orchestrator.templates().await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.templates().await })
        })
        .collect();

    for handle in handles {
        let pool = handle.await.unwrap();
        assert!(Arc::ptr_eq(&pool, &warm));
    }
}
