use std::sync::Arc;

use tracing::{debug, warn};

use super::error::{ExhaustedError, StrategyError};
use super::types::{AttemptFailure, ExecutionOutcome, OutcomeSource, Strategy};

/// Caller-supplied acceptance check on a strategy result.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Ordered list of strategies plus the validity predicate they are judged by.
pub struct FallbackChain<I, T> {
    label: &'static str,
    strategies: Vec<Arc<dyn Strategy<I, T>>>,
    predicate: Predicate<T>,
}

impl<I, T> Clone for FallbackChain<I, T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            strategies: self.strategies.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<I, T> std::fmt::Debug for FallbackChain<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("label", &self.label)
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

impl<I, T> FallbackChain<I, T>
where
    I: Send + Sync,
    T: Send,
{
    /// Creates an empty chain that accepts every result.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            strategies: Vec::new(),
            predicate: Arc::new(|_| true),
        }
    }

    /// Appends a strategy (builder style).
    pub fn with_strategy(mut self, strategy: impl Strategy<I, T> + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Appends a shared strategy.
    pub fn push(&mut self, strategy: Arc<dyn Strategy<I, T>>) {
        self.strategies.push(strategy);
    }

    /// Replaces the validity predicate.
    pub fn with_predicate(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Arc::new(predicate);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy names in configured order.
    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    /// Runs the chain and falls back to `fallback` when every strategy failed.
    pub async fn execute(&self, input: &I, offset: usize, fallback: T) -> ExecutionOutcome<T> {
        match self.walk(input, offset).await {
            Ok(outcome) => outcome,
            Err(failures) => {
                warn!(
                    chain = self.label,
                    attempts = failures.len(),
                    "All strategies failed, using static fallback"
                );
                ExecutionOutcome {
                    value: fallback,
                    source: OutcomeSource::Fallback,
                    failures,
                }
            }
        }
    }

    /// Runs the chain and reports exhaustion instead of substituting a value.
    pub async fn try_execute(
        &self,
        input: &I,
        offset: usize,
    ) -> Result<ExecutionOutcome<T>, ExhaustedError> {
        self.walk(input, offset).await.map_err(|failures| {
            warn!(
                chain = self.label,
                attempts = failures.len(),
                "All strategies failed"
            );
            ExhaustedError {
                chain: self.label,
                failures,
            }
        })
    }

    async fn walk(
        &self,
        input: &I,
        offset: usize,
    ) -> Result<ExecutionOutcome<T>, Vec<AttemptFailure>> {
        let len = self.strategies.len();
        let mut failures = Vec::new();
        if len == 0 {
            return Err(failures);
        }

        let start = offset % len;
        for step in 0..len {
            let strategy = &self.strategies[(start + step) % len];
            let name = strategy.name();

            let error = match strategy.invoke(input).await {
                Ok(value) if (self.predicate)(&value) => {
                    debug!(
                        chain = self.label,
                        strategy = %name,
                        failed_before = failures.len(),
                        "Strategy accepted"
                    );
                    return Ok(ExecutionOutcome {
                        value,
                        source: OutcomeSource::Strategy(name.to_string()),
                        failures,
                    });
                }
                Ok(_) => StrategyError::Rejected,
                Err(e) => e,
            };

            warn!(chain = self.label, strategy = %name, reason = %error, "Strategy failed");
            failures.push(AttemptFailure::new(name, &error));
        }

        Err(failures)
    }
}
