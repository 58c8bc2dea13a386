use async_trait::async_trait;
use serde::Serialize;

use super::error::StrategyError;

/// One named way of producing a `T` from an `I`.
///
/// Implementations return a typed failure instead of panicking or swallowing
/// errors; the chain decides what to do with it.
#[async_trait]
pub trait Strategy<I, T>: Send + Sync
where
    I: Send + Sync,
    T: Send,
{
    /// Stable identifier used in logs and in [`ExecutionOutcome::source`].
    fn name(&self) -> &str;

    /// Attempts to produce a result.
    async fn invoke(&self, input: &I) -> Result<T, StrategyError>;
}

/// Record of a strategy that was attempted and failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub strategy: String,
    pub reason: String,
}

impl AttemptFailure {
    pub fn new(strategy: impl Into<String>, error: &StrategyError) -> Self {
        Self {
            strategy: strategy.into(),
            reason: error.to_string(),
        }
    }
}

/// Where the value of an [`ExecutionOutcome`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSource {
    /// The named strategy produced an accepted result.
    Strategy(String),
    /// Every strategy failed and the caller's static fallback was used.
    Fallback,
}

impl OutcomeSource {
    /// Strategy name, or `"fallback"`.
    pub fn as_str(&self) -> &str {
        match self {
            OutcomeSource::Strategy(name) => name,
            OutcomeSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for OutcomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one fallback run.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome<T> {
    /// Accepted result, or the fallback value.
    pub value: T,
    /// Which strategy produced `value`.
    pub source: OutcomeSource,
    /// Failed attempts in attempt order.
    pub failures: Vec<AttemptFailure>,
}

impl<T> ExecutionOutcome<T> {
    /// Name of the winning strategy (`None` when the fallback was used).
    pub fn strategy_name(&self) -> Option<&str> {
        match &self.source {
            OutcomeSource::Strategy(name) => Some(name),
            OutcomeSource::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == OutcomeSource::Fallback
    }

    /// Number of strategies invoked during the run.
    pub fn attempts(&self) -> usize {
        self.failures.len() + usize::from(!self.is_fallback())
    }

    /// Maps the value while keeping provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExecutionOutcome<U> {
        ExecutionOutcome {
            value: f(self.value),
            source: self.source,
            failures: self.failures,
        }
    }
}

/// Round-robin starting offset shared by every call to one chain.
///
/// The counter is plain data; callers keep it inside a mutex-guarded state so the
/// read and the increment happen as one step.
#[derive(Debug, Default, Clone)]
pub struct Rotation {
    next: usize,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the offset for this call and advances the counter.
    pub fn advance(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let offset = self.next % len;
        self.next = (offset + 1) % len;
        offset
    }

    /// Offset the next call will start from (for diagnostics).
    pub fn peek(&self, len: usize) -> usize {
        if len == 0 { 0 } else { self.next % len }
    }
}
