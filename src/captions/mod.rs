//! Caption generation: OpenAI, then HuggingFace, then DeepAI, then local
//! templates. Results are scored and returned best first.

mod strategies;
mod types;


pub use strategies::{DeepAiCaptions, HuggingFaceCaptions, LocalCaptions, OpenAiCaptions};
pub use types::{Caption, CaptionRequest, parse_caption_lines, rank_captions, score_caption};

use tracing::info;

use crate::fallback::{ExecutionOutcome, FallbackChain, Strategy};
use crate::providers::{DeepAiClient, HuggingFaceClient, OpenAiClient};

#[derive(Debug, Clone)]
pub struct CaptionAgent {
    chain: FallbackChain<CaptionRequest, Vec<Caption>>,
}

fn has_caption(captions: &Vec<Caption>) -> bool {
    captions.iter().any(|c| !c.is_blank())
}

impl CaptionAgent {
    pub fn new(openai: OpenAiClient, huggingface: HuggingFaceClient, deepai: DeepAiClient) -> Self {
        Self::from_chain(
            FallbackChain::new("captions")
                .with_strategy(OpenAiCaptions::new(openai))
                .with_strategy(HuggingFaceCaptions::new(huggingface))
                .with_strategy(DeepAiCaptions::new(deepai))
                .with_strategy(LocalCaptions),
        )
    }

    /// Wraps a custom chain; the non-blank predicate is always applied.
    pub fn from_chain(chain: FallbackChain<CaptionRequest, Vec<Caption>>) -> Self {
        Self {
            chain: chain.with_predicate(has_caption),
        }
    }

    pub fn with_strategies(
        strategies: impl IntoIterator<Item = std::sync::Arc<dyn Strategy<CaptionRequest, Vec<Caption>>>>,
    ) -> Self {
        let mut chain = FallbackChain::new("captions");
        for strategy in strategies {
            chain.push(strategy);
        }
        Self::from_chain(chain)
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.chain.strategy_names()
    }

    /// Suggests captions for `request`, best first; never fails.
    pub async fn suggest(&self, request: &CaptionRequest) -> ExecutionOutcome<Vec<Caption>> {
        let fallback = vec![Caption::new(request.prompt.trim(), "make it meme")];
        let mut outcome = self.chain.execute(request, 0, fallback).await;
        outcome.value.retain(|c| !c.is_blank());
        rank_captions(&mut outcome.value);
        info!(
            source = %outcome.source,
            count = outcome.value.len(),
            "Captions suggested"
        );
        outcome
    }
}
