use serde::Serialize;

use crate::captions::Caption;
use crate::fallback::Rotation;
use crate::planner::SearchPlan;
use crate::ranking::ScoredCandidate;
use crate::templates::TemplateCache;

/// The only state mutated by concurrent requests.
#[derive(Debug, Default)]
pub struct OrchestratorState {
    pub idea_rotation: Rotation,
    pub template_cache: TemplateCache,
}

/// Ranked captions and the strategy that wrote them.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionSuggestions {
    pub captions: Vec<Caption>,
    pub source: String,
}

/// Planner output plus the templates it ranked.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSearch {
    pub plan: SearchPlan,
    pub templates: Vec<ScoredCandidate>,
}
