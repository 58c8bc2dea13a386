use serde::{Deserialize, Serialize};

use crate::constants::CAPTION_SEPARATOR;

/// Top and bottom text of a meme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub top: String,
    pub bottom: String,
}

impl Caption {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }

    /// Splits `"TOP // BOTTOM"` on the first separator; without one the whole
    /// text is the top line.
    pub fn parse(text: &str) -> Self {
        match text.split_once(CAPTION_SEPARATOR) {
            Some((top, bottom)) => Self::new(top.trim(), bottom.trim()),
            None => Self::new(text.trim(), ""),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.top.trim().is_empty() && self.bottom.trim().is_empty()
    }

    /// Text checked by the compliance chain.
    pub fn joined(&self) -> String {
        if self.bottom.is_empty() {
            self.top.clone()
        } else {
            format!("{} {} {}", self.top, CAPTION_SEPARATOR, self.bottom)
        }
    }
}

impl std::fmt::Display for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Input of the caption chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRequest {
    pub prompt: String,
    pub template: Option<String>,
}

impl CaptionRequest {
    pub fn new(prompt: impl Into<String>, template: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            template: template.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Prompt text sent to the text-generation models.
    pub fn instruction(&self) -> String {
        match &self.template {
            Some(template) => format!(
                "Write funny meme captions about \"{}\" for the \"{}\" template.",
                self.prompt, template
            ),
            None => format!("Write funny meme captions about \"{}\".", self.prompt),
        }
    }
}

/// Prefers about six words per line and distinct top and bottom text.
pub fn score_caption(caption: &Caption) -> f32 {
    fn word_count(text: &str) -> f32 {
        text.split_whitespace().count().max(1) as f32
    }

    let top = word_count(&caption.top);
    let bottom = word_count(&caption.bottom);
    let length_score = (-((top - 6.0).powi(2) + (bottom - 6.0).powi(2)) / 20.0).exp();
    let diversity = if caption.top.trim().to_lowercase() == caption.bottom.trim().to_lowercase() {
        0.5
    } else {
        1.0
    };
    length_score * diversity
}

/// Stable sort, best caption first.
pub fn rank_captions(captions: &mut [Caption]) {
    captions.sort_by(|a, b| score_caption(b).total_cmp(&score_caption(a)));
}

/// Drops a leading `1.`, `2)`, `-` or `*` list marker. Bare leading numbers
/// are caption text.
fn strip_list_marker(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        return match rest.strip_prefix(['.', ')']) {
            Some(after) => after,
            None => line,
        };
    }
    line.trim_start_matches(['-', '*'])
}

/// Turns a free-form model reply into captions: one per line, list markers and
/// quotes stripped, at most `limit`.
pub fn parse_caption_lines(raw: &str, limit: usize) -> Vec<Caption> {
    raw.lines()
        .map(|line| {
            strip_list_marker(line.trim())
                .trim()
                .trim_matches('"')
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(Caption::parse)
        .filter(|caption| !caption.is_blank())
        .take(limit)
        .collect()
}
