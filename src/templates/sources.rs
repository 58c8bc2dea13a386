//! Template feeds: Imgflip, the r/memes listing and Memegen.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::SourceError;
use super::types::Candidate;

pub const IMGFLIP_API_URL: &str = "https://api.imgflip.com";
pub const REDDIT_MEMES_URL: &str = "https://www.reddit.com/r/memes.json?limit=50";
pub const MEMEGEN_API_URL: &str = "https://api.memegen.link";

/// One independent template feed.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError>;
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    origin: &'static str,
    url: &str,
) -> Result<T, SourceError> {
    debug!(source = origin, url = %url, "Fetching templates");
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|source| SourceError::Request { origin, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            origin,
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(|e| SourceError::Malformed {
        origin,
        reason: e.to_string(),
    })
}

#[derive(Deserialize)]
struct ImgflipResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgflipData>,
}

#[derive(Deserialize)]
struct ImgflipData {
    memes: Vec<ImgflipMeme>,
}

#[derive(Deserialize)]
struct ImgflipMeme {
    id: String,
    name: String,
    url: String,
}

/// `GET {base}/get_memes`.
#[derive(Debug, Clone)]
pub struct ImgflipSource {
    http: reqwest::Client,
    base_url: String,
}

impl ImgflipSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: IMGFLIP_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TemplateSource for ImgflipSource {
    fn name(&self) -> &'static str {
        "imgflip"
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        let url = format!("{}/get_memes", self.base_url);
        let body: ImgflipResponse = get_json(&self.http, self.name(), &url).await?;

        let data = match body.data {
            Some(data) if body.success => data,
            _ => {
                return Err(SourceError::Malformed {
                    origin: self.name(),
                    reason: "success flag not set".to_string(),
                });
            }
        };

        Ok(data
            .memes
            .into_iter()
            .map(|m| Candidate::new(m.id, m.name, m.url, "imgflip"))
            .collect())
    }
}

#[derive(Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Deserialize)]
struct RedditPost {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    post_hint: Option<String>,
}

impl RedditPost {
    fn is_image(&self) -> bool {
        let url = self.url.to_lowercase();
        self.post_hint.as_deref() == Some("image")
            || [".jpg", ".jpeg", ".png", ".gif"]
                .iter()
                .any(|ext| url.ends_with(ext))
    }
}

/// r/memes JSON listing; only image posts become candidates.
#[derive(Debug, Clone)]
pub struct RedditSource {
    http: reqwest::Client,
    url: String,
}

impl RedditSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            url: REDDIT_MEMES_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

#[async_trait]
impl TemplateSource for RedditSource {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        let listing: RedditListing = get_json(&self.http, self.name(), &self.url).await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| post.is_image())
            .map(|post| Candidate::new(format!("reddit:{}", post.id), post.title, post.url, "reddit"))
            .collect())
    }
}

#[derive(Deserialize)]
struct MemegenTemplate {
    id: String,
    name: String,
    #[serde(default)]
    blank: Option<String>,
}

/// `GET {base}/templates/`; ids are prefixed `memegen:` and point at the blank image.
#[derive(Debug, Clone)]
pub struct MemegenSource {
    http: reqwest::Client,
    base_url: String,
}

impl MemegenSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: MEMEGEN_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TemplateSource for MemegenSource {
    fn name(&self) -> &'static str {
        "memegen"
    }

    async fn fetch(&self) -> Result<Vec<Candidate>, SourceError> {
        let url = format!("{}/templates/", self.base_url);
        let templates: Vec<MemegenTemplate> = get_json(&self.http, self.name(), &url).await?;

        let base = self.base_url.clone();
        Ok(templates
            .into_iter()
            .map(|t| {
                let blank = t
                    .blank
                    .filter(|b| !b.is_empty())
                    .unwrap_or_else(|| format!("{}/images/{}.png", base, t.id));
                Candidate::new(format!("memegen:{}", t.id), t.name, blank, "memegen")
            })
            .collect())
    }
}
