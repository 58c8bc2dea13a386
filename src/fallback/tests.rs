use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;

#[derive(Clone)]
enum Behavior {
    Succeed(&'static str),
    Fail(StrategyError),
}

struct ScriptedStrategy {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStrategy {
    fn new(name: &'static str, behavior: Behavior) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                behavior,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Strategy<(), String> for ScriptedStrategy {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, _input: &()) -> Result<String, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(v) => Ok(v.to_string()),
            Behavior::Fail(e) => Err(e.clone()),
        }
    }
}

fn non_empty(value: &String) -> bool {
    !value.trim().is_empty()
}

#[tokio::test]
async fn test_first_acceptable_result_wins() {
    let (a, a_calls) = ScriptedStrategy::new("a", Behavior::Fail(StrategyError::Status { status: 503 }));
    let (b, b_calls) = ScriptedStrategy::new("b", Behavior::Succeed("from b"));
    let (c, c_calls) = ScriptedStrategy::new("c", Behavior::Succeed("from c"));

    let chain = FallbackChain::new("test")
        .with_strategy(a)
        .with_strategy(b)
        .with_strategy(c)
        .with_predicate(non_empty);

    let outcome = chain.execute(&(), 0, "fallback".to_string()).await;

    assert_eq!(outcome.value, "from b");
    assert_eq!(outcome.strategy_name(), Some("b"));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].strategy, "a");
    assert_eq!(outcome.attempts(), 2);
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0, "must stop at first acceptor");
}

#[tokio::test]
async fn test_predicate_rejection_counts_as_failure() {
    let (blank, blank_calls) = ScriptedStrategy::new("blank", Behavior::Succeed("   "));
    let (good, _) = ScriptedStrategy::new("good", Behavior::Succeed("caption"));

    let chain = FallbackChain::new("test")
        .with_strategy(blank)
        .with_strategy(good)
        .with_predicate(non_empty);

    let outcome = chain.execute(&(), 0, "fallback".to_string()).await;

    assert_eq!(outcome.value, "caption");
    assert_eq!(blank_calls.load(Ordering::SeqCst), 1, "rejected strategy is not retried");
    assert_eq!(outcome.failures[0].reason, StrategyError::Rejected.to_string());
}

#[tokio::test]
async fn test_all_failures_return_fallback_with_one_entry_per_attempt() {
    let (a, _) = ScriptedStrategy::new("a", Behavior::Fail(StrategyError::transport("timeout")));
    let (b, _) = ScriptedStrategy::new("b", Behavior::Fail(StrategyError::malformed("no url")));
    let (c, _) = ScriptedStrategy::new("c", Behavior::Succeed(""));

    let chain = FallbackChain::new("test")
        .with_strategy(a)
        .with_strategy(b)
        .with_strategy(c)
        .with_predicate(non_empty);

    let outcome = chain.execute(&(), 0, "fallback".to_string()).await;

    assert!(outcome.is_fallback());
    assert_eq!(outcome.value, "fallback");
    assert_eq!(outcome.source.as_str(), "fallback");
    let names: Vec<_> = outcome.failures.iter().map(|f| f.strategy.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_empty_chain_returns_fallback_immediately() {
    let chain: FallbackChain<(), String> = FallbackChain::new("empty");

    let outcome = chain.execute(&(), 3, "default".to_string()).await;

    assert!(outcome.is_fallback());
    assert_eq!(outcome.value, "default");
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_try_execute_surfaces_exhaustion() {
    let (a, _) = ScriptedStrategy::new("a", Behavior::Fail(StrategyError::unavailable("no key")));

    let chain = FallbackChain::new("images").with_strategy(a);

    let err = chain.try_execute(&(), 0).await.unwrap_err();

    assert_eq!(err.chain, "images");
    assert_eq!(err.failures.len(), 1);
    assert!(err.summary().contains("a: unavailable: no key"));
}

#[tokio::test]
async fn test_try_execute_on_empty_chain_is_exhausted() {
    let chain: FallbackChain<(), String> = FallbackChain::new("empty");

    let err = chain.try_execute(&(), 0).await.unwrap_err();

    assert!(err.failures.is_empty());
    assert_eq!(err.summary(), "no strategies configured");
}

#[tokio::test]
async fn test_offset_wraps_around() {
    let (a, a_calls) = ScriptedStrategy::new("a", Behavior::Succeed("a"));
    let (b, _) = ScriptedStrategy::new("b", Behavior::Fail(StrategyError::Status { status: 500 }));
    let (c, _) = ScriptedStrategy::new("c", Behavior::Fail(StrategyError::Status { status: 500 }));

    let chain = FallbackChain::new("test")
        .with_strategy(a)
        .with_strategy(b)
        .with_strategy(c);

    let outcome = chain.execute(&(), 1, "fallback".to_string()).await;

    assert_eq!(outcome.strategy_name(), Some("a"));
    let names: Vec<_> = outcome.failures.iter().map(|f| f.strategy.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rotation_visits_every_source_as_first() {
    let chain = FallbackChain::new("ideas")
        .with_strategy(ScriptedStrategy::new("s0", Behavior::Succeed("0")).0)
        .with_strategy(ScriptedStrategy::new("s1", Behavior::Succeed("1")).0)
        .with_strategy(ScriptedStrategy::new("s2", Behavior::Succeed("2")).0);

    let mut rotation = Rotation::new();
    let mut winners = Vec::new();
    for _ in 0..chain.len() * 2 {
        let offset = rotation.advance(chain.len());
        let outcome = chain.execute(&(), offset, "fallback".to_string()).await;
        winners.push(outcome.strategy_name().unwrap_or_default().to_string());
    }

    for name in ["s0", "s1", "s2"] {
        assert!(winners.iter().any(|w| w == name), "{name} never started first");
    }
    assert_eq!(winners[..3], ["s0", "s1", "s2"]);
}

#[test]
fn test_rotation_with_zero_len() {
    let mut rotation = Rotation::new();
    assert_eq!(rotation.advance(0), 0);
    assert_eq!(rotation.advance(2), 0);
    assert_eq!(rotation.advance(2), 1);
    assert_eq!(rotation.peek(2), 0);
}

#[test]
fn test_outcome_map_keeps_provenance() {
    let outcome = ExecutionOutcome {
        value: 2,
        source: OutcomeSource::Strategy("double".to_string()),
        failures: vec![],
    };

    let mapped = outcome.map(|v| v * 2);

    assert_eq!(mapped.value, 4);
    assert_eq!(mapped.strategy_name(), Some("double"));
}

#[test]
fn test_chain_reports_strategy_names_in_order() {
    let chain = FallbackChain::new("test")
        .with_strategy(ScriptedStrategy::new("first", Behavior::Succeed("x")).0)
        .with_strategy(ScriptedStrategy::new("second", Behavior::Succeed("y")).0);

    assert_eq!(chain.strategy_names(), vec!["first", "second"]);
    assert_eq!(chain.label(), "test");
    assert!(!chain.is_empty());
}
