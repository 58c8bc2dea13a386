use async_trait::async_trait;
use serde::Serialize;

/// Answer of a single checker. Checkers never fail: an internal error is a pass
/// with a reason saying so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub reason: String,
}

impl CheckOutcome {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
        }
    }
}

/// One policy check over a caption.
#[async_trait]
pub trait Checker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, caption: &str) -> CheckOutcome;
}

/// Result of running the whole chain over one caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceVerdict {
    pub passed: bool,
    /// Blocking checker's reason, or every checker's `name:reason` on a pass.
    pub reason: String,
    /// Checker that blocked; `None` when the caption passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
}

impl ComplianceVerdict {
    /// `"ok"` or `"blocked"`, as written to the audit log.
    pub fn status(&self) -> &'static str {
        if self.passed { "ok" } else { "blocked" }
    }
}
