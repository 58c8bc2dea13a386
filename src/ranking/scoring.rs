use crate::constants::{COSINE_EPSILON, TAG_BONUS_MAX_MATCHES, TAG_BONUS_PER_MATCH};

/// Cosine similarity with [`COSINE_EPSILON`] added to each norm.
///
/// Returns `0.0` for an all-zero vector instead of `NaN`. Vectors of different
/// length are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / ((norm_a.sqrt() + COSINE_EPSILON) * (norm_b.sqrt() + COSINE_EPSILON))
}

/// 0.05 per distinct tag contained in `name` (case-insensitive), at most 3 tags.
pub fn tag_bonus(name: &str, tags: &[String]) -> f32 {
    let name = name.to_lowercase();
    let mut matched: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || matched.contains(&tag) {
            continue;
        }
        if name.contains(&tag) {
            matched.push(tag);
        }
    }
    matched.len().min(TAG_BONUS_MAX_MATCHES) as f32 * TAG_BONUS_PER_MATCH
}

/// Lowercases, trims and drops empty or repeated tags.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
