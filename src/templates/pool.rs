//! Concurrent fan-out over the template sources and the TTL cache of the result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tracing::{info, warn};

use super::error::SourceError;
use super::sources::TemplateSource;
use super::types::{Candidate, static_fallback};
use crate::constants::DEFAULT_HTTP_TIMEOUT;

/// Merges source lists in order, dropping any candidate whose id or url was
/// already seen. First occurrence wins.
pub fn merge_candidates<I>(lists: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut seen_ids = HashSet::new();
    let mut seen_urls = HashSet::new();
    let mut merged = Vec::new();

    for candidate in lists.into_iter().flatten() {
        if seen_ids.contains(&candidate.id) {
            continue;
        }
        if !candidate.url.is_empty() && seen_urls.contains(&candidate.url) {
            continue;
        }
        seen_ids.insert(candidate.id.clone());
        if !candidate.url.is_empty() {
            seen_urls.insert(candidate.url.clone());
        }
        merged.push(candidate);
    }

    merged
}

/// The set of sources fetched together.
#[derive(Clone)]
pub struct TemplatePool {
    sources: Vec<Arc<dyn TemplateSource>>,
    timeout: Duration,
}

impl std::fmt::Debug for TemplatePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePool")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for TemplatePool {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_TIMEOUT)
    }
}

impl TemplatePool {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            timeout,
        }
    }

    pub fn with_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn push(&mut self, source: Arc<dyn TemplateSource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Fetches every source concurrently and merges the results in source order.
    ///
    /// A failing or slow source contributes nothing; an empty merge yields the
    /// static fallback so the pool is never empty.
    pub async fn load(&self) -> Vec<Candidate> {
        let timeout = self.timeout;
        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let origin = source.name();
                match tokio::time::timeout(timeout, source.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout {
                        origin,
                        millis: timeout.as_millis(),
                    }),
                }
            }
        });

        let results = join_all(fetches).await;

        let mut lists = Vec::with_capacity(results.len());
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(candidates) => {
                    info!(source = source.name(), count = candidates.len(), "Template source loaded");
                    lists.push(candidates);
                }
                Err(e) => warn!(source = source.name(), error = %e, "Template source failed"),
            }
        }

        let merged = merge_candidates(lists);
        if merged.is_empty() {
            warn!("No templates from any source, using static fallback");
            return static_fallback();
        }
        merged
    }
}

/// Last loaded pool and when it was loaded. Rebuilt wholesale on expiry.
#[derive(Debug, Default, Clone)]
pub struct TemplateCache {
    entry: Option<(Arc<Vec<Candidate>>, Instant)>,
}

impl TemplateCache {
    /// Returns the cached pool if it is younger than `ttl` at `now`.
    pub fn get(&self, now: Instant, ttl: Duration) -> Option<Arc<Vec<Candidate>>> {
        match &self.entry {
            Some((pool, loaded_at)) if now.saturating_duration_since(*loaded_at) < ttl => {
                Some(Arc::clone(pool))
            }
            _ => None,
        }
    }

    /// Replaces the cached pool; last writer wins.
    pub fn store(&mut self, pool: Arc<Vec<Candidate>>, loaded_at: Instant) {
        self.entry = Some((pool, loaded_at));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn loaded_at(&self) -> Option<Instant> {
        self.entry.as_ref().map(|(_, at)| *at)
    }
}
