use std::sync::Arc;

use tracing::{debug, info, warn};

use super::audit::ComplianceLog;
use super::types::{Checker, ComplianceVerdict};

/// All-must-pass chain: checkers run strictly in order and the first block wins.
#[derive(Clone, Default)]
pub struct ComplianceChain {
    checkers: Vec<Arc<dyn Checker>>,
    log: Option<Arc<ComplianceLog>>,
}

impl std::fmt::Debug for ComplianceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceChain")
            .field("checkers", &self.checker_names())
            .field("log", &self.log.as_ref().map(|l| l.path().to_path_buf()))
            .finish()
    }
}

impl ComplianceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checker(mut self, checker: impl Checker + 'static) -> Self {
        self.checkers.push(Arc::new(checker));
        self
    }

    pub fn with_log(mut self, log: Arc<ComplianceLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn checker_names(&self) -> Vec<String> {
        self.checkers.iter().map(|c| c.name().to_string()).collect()
    }

    /// Runs the chain and records the verdict in the audit log.
    ///
    /// A failed append is logged; it never changes the verdict.
    #[tracing::instrument(skip(self, caption), fields(len = caption.len()))]
    pub async fn evaluate(&self, caption: &str) -> ComplianceVerdict {
        let verdict = self.run(caption).await;

        if let Some(log) = &self.log {
            if let Err(e) = log.append(verdict.status(), caption, &verdict.reason).await {
                warn!(error = %e, "Failed to append compliance log");
            }
        }

        verdict
    }

    async fn run(&self, caption: &str) -> ComplianceVerdict {
        let mut details = Vec::with_capacity(self.checkers.len());

        for checker in &self.checkers {
            let outcome = checker.check(caption).await;
            debug!(checker = %checker.name(), passed = outcome.passed, reason = %outcome.reason, "Checker ran");

            if !outcome.passed {
                info!(checker = %checker.name(), reason = %outcome.reason, "Caption blocked");
                return ComplianceVerdict {
                    passed: false,
                    reason: format!("{}: {}", checker.name(), outcome.reason),
                    decided_by: Some(checker.name().to_string()),
                };
            }
            details.push(format!("{}:{}", checker.name(), outcome.reason));
        }

        ComplianceVerdict {
            passed: true,
            reason: details.join(";"),
            decided_by: None,
        }
    }
}
