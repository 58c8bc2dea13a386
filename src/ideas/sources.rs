use async_trait::async_trait;
use serde_json::Value;

use crate::fallback::{Strategy, StrategyError};

/// The closed set of idea sources, each with its own extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaSource {
    JokeApi,
    IcanHazDadJoke,
    Quotable,
    ZenQuotes,
    AdviceSlip,
}

impl IdeaSource {
    pub const ALL: [IdeaSource; 5] = [
        IdeaSource::JokeApi,
        IdeaSource::IcanHazDadJoke,
        IdeaSource::Quotable,
        IdeaSource::ZenQuotes,
        IdeaSource::AdviceSlip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IdeaSource::JokeApi => "JokeAPI",
            IdeaSource::IcanHazDadJoke => "icanhazdadjoke",
            IdeaSource::Quotable => "Quotable",
            IdeaSource::ZenQuotes => "ZenQuotes",
            IdeaSource::AdviceSlip => "AdviceSlip",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            IdeaSource::JokeApi => "https://v2.jokeapi.dev/joke/Any?safe-mode&type=single",
            IdeaSource::IcanHazDadJoke => "https://icanhazdadjoke.com/",
            IdeaSource::Quotable => "https://api.quotable.io/random",
            IdeaSource::ZenQuotes => "https://zenquotes.io/api/random",
            IdeaSource::AdviceSlip => "https://api.adviceslip.com/advice",
        }
    }

    /// Pulls the idea text out of a source's JSON body.
    pub fn extract(self, body: &Value) -> Option<String> {
        let text = match self {
            IdeaSource::JokeApi => {
                if body.get("type").and_then(Value::as_str) != Some("single") {
                    return None;
                }
                body.get("joke")
            }
            IdeaSource::IcanHazDadJoke => body.get("joke"),
            IdeaSource::Quotable => body.get("content"),
            IdeaSource::ZenQuotes => body.as_array().and_then(|a| a.first()).and_then(|q| q.get("q")),
            IdeaSource::AdviceSlip => body.pointer("/slip/advice"),
        };
        text.and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// One idea source bound to an HTTP client and URL.
#[derive(Debug, Clone)]
pub struct IdeaStrategy {
    http: reqwest::Client,
    source: IdeaSource,
    url: String,
}

impl IdeaStrategy {
    pub fn new(http: reqwest::Client, source: IdeaSource) -> Self {
        Self {
            http,
            source,
            url: source.default_url().to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn source(&self) -> IdeaSource {
        self.source
    }
}

#[async_trait]
impl Strategy<(), String> for IdeaStrategy {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn invoke(&self, _input: &()) -> Result<String, StrategyError> {
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| StrategyError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StrategyError::malformed(e.to_string()))?;

        self.source
            .extract(&body)
            .ok_or_else(|| StrategyError::malformed(format!("{} payload had no idea text", self.source.name())))
    }
}
