//! The four checkers, in chain order.
//!
//! External checkers pass with `skip_*` when unconfigured and `*_error` when the
//! call fails, so only a check that actually ran can block.

use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use super::error::BannedWordsError;
use super::types::{CheckOutcome, Checker};
use crate::constants::DEFAULT_TOXICITY_THRESHOLD;
use crate::providers::{HuggingFaceClient, OpenAiClient, PerspectiveClient};

/// OpenAI content-policy classifier (`omni-moderation-latest`).
#[derive(Debug, Clone)]
pub struct OpenAiModerationChecker {
    client: OpenAiClient,
}

impl OpenAiModerationChecker {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Checker for OpenAiModerationChecker {
    fn name(&self) -> &str {
        "openai_moderation"
    }

    async fn check(&self, caption: &str) -> CheckOutcome {
        if !self.client.is_configured() {
            return CheckOutcome::pass("skip_openai");
        }
        match self.client.moderate(caption).await {
            Ok(true) => CheckOutcome::block("flagged"),
            Ok(false) => CheckOutcome::pass("ok"),
            Err(e) => {
                warn!(error = %e, "Moderation call failed, passing");
                CheckOutcome::pass("openai_error")
            }
        }
    }
}

const DEFAULT_BANNED_WORDS: &[&str] = &[
    "kill yourself",
    "kys",
    "heil hitler",
    "white power",
    "gas the",
    "lynch",
];

/// Case-insensitive whole-word (or whole-phrase) match against a word list.
#[derive(Debug, Clone)]
pub struct BannedWordChecker {
    entries: Vec<String>,
}

impl Default for BannedWordChecker {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_WORDS.iter().copied())
    }
}

impl BannedWordChecker {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for entry in entries {
            let entry = normalize(entry.as_ref());
            if !entry.is_empty() && !normalized.contains(&entry) {
                normalized.push(entry);
            }
        }
        Self {
            entries: normalized,
        }
    }

    /// Reads one entry per line; blank lines and `#` comments are ignored.
    pub fn from_file(path: &Path) -> Result<Self, BannedWordsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| BannedWordsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry found in `text`, if any.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        let padded = format!(" {} ", normalize(text));
        self.entries
            .iter()
            .find(|entry| padded.contains(&format!(" {entry} ")))
            .map(String::as_str)
    }
}

#[async_trait]
impl Checker for BannedWordChecker {
    fn name(&self) -> &str {
        "banned_words"
    }

    async fn check(&self, caption: &str) -> CheckOutcome {
        match self.find_match(caption) {
            Some(entry) => CheckOutcome::block(format!("banned word '{entry}'")),
            None => CheckOutcome::pass("ok"),
        }
    }
}

/// Lowercase alphanumeric words separated by single spaces.
fn normalize(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// HuggingFace toxicity classifier.
#[derive(Debug, Clone)]
pub struct HuggingFaceToxicityChecker {
    client: HuggingFaceClient,
    threshold: f32,
}

impl HuggingFaceToxicityChecker {
    pub fn new(client: HuggingFaceClient) -> Self {
        Self {
            client,
            threshold: DEFAULT_TOXICITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

fn is_toxic_label(label: &str) -> bool {
    let label = label.to_lowercase();
    if label.starts_with("non") || label.starts_with("not") || label == "neutral" {
        return false;
    }
    label.contains("toxic")
        || matches!(
            label.as_str(),
            "obscene" | "threat" | "insult" | "identity_hate" | "hate" | "offensive"
        )
}

#[async_trait]
impl Checker for HuggingFaceToxicityChecker {
    fn name(&self) -> &str {
        "huggingface_toxicity"
    }

    async fn check(&self, caption: &str) -> CheckOutcome {
        if !self.client.is_configured() {
            return CheckOutcome::pass("skip_huggingface");
        }
        match self.client.classify(caption).await {
            Ok(labels) => {
                let worst = labels
                    .iter()
                    .filter(|l| is_toxic_label(&l.label))
                    .max_by(|a, b| a.score.total_cmp(&b.score));
                match worst {
                    Some(l) if l.score >= self.threshold => {
                        CheckOutcome::block(format!("{} score {:.2}", l.label, l.score))
                    }
                    _ => CheckOutcome::pass("ok"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Toxicity classification failed, passing");
                CheckOutcome::pass("huggingface_error")
            }
        }
    }
}

/// Google Perspective `TOXICITY` summary score.
#[derive(Debug, Clone)]
pub struct PerspectiveChecker {
    client: PerspectiveClient,
    threshold: f32,
}

impl PerspectiveChecker {
    pub fn new(client: PerspectiveClient) -> Self {
        Self {
            client,
            threshold: DEFAULT_TOXICITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl Checker for PerspectiveChecker {
    fn name(&self) -> &str {
        "perspective"
    }

    async fn check(&self, caption: &str) -> CheckOutcome {
        if !self.client.is_configured() {
            return CheckOutcome::pass("skip_perspective");
        }
        match self.client.toxicity(caption).await {
            Ok(score) if score >= self.threshold => {
                CheckOutcome::block(format!("toxicity score {score:.2}"))
            }
            Ok(_) => CheckOutcome::pass("ok"),
            Err(e) => {
                warn!(error = %e, "Perspective call failed, passing");
                CheckOutcome::pass("perspective_error")
            }
        }
    }
}
