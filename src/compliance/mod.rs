//! Compliance: an all-must-pass chain of caption checkers with an audit log.
//!
//! Each checker fails open on its own (unconfigured or unreachable means pass),
//! but the chain blocks on the first checker that runs and objects. Every
//! evaluation is appended to the CSV log.

mod audit;
mod chain;
mod checkers;
mod error;
mod types;


pub use audit::ComplianceLog;
pub use chain::ComplianceChain;
pub use checkers::{
    BannedWordChecker, HuggingFaceToxicityChecker, OpenAiModerationChecker, PerspectiveChecker,
};
pub use error::{AuditError, BannedWordsError};
pub use types::{CheckOutcome, Checker, ComplianceVerdict};

use std::sync::Arc;

use crate::config::Config;
use crate::providers::{HuggingFaceClient, OpenAiClient, PerspectiveClient};

/// Builds the standard chain: moderation, banned words, toxicity, Perspective.
pub fn standard_chain(
    config: &Config,
    openai: OpenAiClient,
    huggingface: HuggingFaceClient,
    perspective: PerspectiveClient,
) -> Result<ComplianceChain, BannedWordsError> {
    let banned = match &config.banned_words_path {
        Some(path) => BannedWordChecker::from_file(path)?,
        None => BannedWordChecker::default(),
    };

    Ok(ComplianceChain::new()
        .with_checker(OpenAiModerationChecker::new(openai))
        .with_checker(banned)
        .with_checker(
            HuggingFaceToxicityChecker::new(huggingface).with_threshold(config.toxicity_threshold),
        )
        .with_checker(PerspectiveChecker::new(perspective).with_threshold(config.toxicity_threshold))
        .with_log(Arc::new(ComplianceLog::new(config.compliance_log_path.clone()))))
}
