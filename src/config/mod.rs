//! Environment-backed configuration.
//!
//! Service settings use `MEMEFORGE_*` variables; provider credentials and model
//! names keep the names the providers document (`OPENAI_API_KEY`, ...).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_OPENAI_TIMEOUT, DEFAULT_RATE_LIMIT_MAX_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW, DEFAULT_TEMPLATE_CACHE_TTL, DEFAULT_TOP_K,
    DEFAULT_TOXICITY_THRESHOLD,
};
use crate::generator::ImageBackend;
use crate::providers::grok::DEFAULT_GROK_MODEL;
use crate::providers::openai::DEFAULT_OPENAI_BASE_URL;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory for rendered images. Default: `./outputs`.
    pub output_dir: PathBuf,

    /// Append-only compliance audit log. Default: `./logs/compliance_logs.csv`.
    pub compliance_log_path: PathBuf,

    /// Optional banned-word list (one entry per line).
    pub banned_words_path: Option<PathBuf>,

    /// Use paid OpenAI endpoints when a key is present. Default: `true`.
    pub use_paid_api: bool,

    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_text_model: String,
    pub openai_image_model: String,
    pub openai_embedding_model: String,
    pub openai_timeout: Duration,

    pub huggingface_api_token: Option<String>,
    pub huggingface_caption_model: String,
    pub huggingface_toxicity_model: String,

    pub deepai_api_key: Option<String>,
    pub perspective_api_key: Option<String>,

    pub imgflip_username: Option<String>,
    pub imgflip_password: Option<String>,

    /// `true` when `XAI_API_KEY` is set (read by `genai` directly).
    pub grok_enabled: bool,
    pub grok_model: String,

    /// Timeout for the free third-party APIs. Default: 15s.
    pub http_timeout: Duration,

    /// Template pool time-to-live. Default: 30 minutes.
    pub template_cache_ttl: Duration,

    /// Default number of ranked templates. Default: `10`.
    pub top_k: usize,

    /// Toxicity score at or above which a caption is blocked. Default: `0.8`.
    pub toxicity_threshold: f32,

    /// Requests admitted per client per window. Default: `30`.
    pub rate_limit_max_requests: u32,

    /// Rate-limit window. Default: 60s.
    pub rate_limit_window: Duration,

    /// Image backends in preference order.
    pub image_backends: Vec<ImageBackend>,

    /// Keys accepted by the security gateway; empty disables the key check.
    pub gateway_api_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            output_dir: PathBuf::from("./outputs"),
            compliance_log_path: PathBuf::from("./logs/compliance_logs.csv"),
            banned_words_path: None,
            use_paid_api: true,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_text_model: "gpt-4o-mini".to_string(),
            openai_image_model: "gpt-image-1".to_string(),
            openai_embedding_model: "text-embedding-3-small".to_string(),
            openai_timeout: DEFAULT_OPENAI_TIMEOUT,
            huggingface_api_token: None,
            huggingface_caption_model: "distilgpt2".to_string(),
            huggingface_toxicity_model: "unitary/toxic-bert".to_string(),
            deepai_api_key: None,
            perspective_api_key: None,
            imgflip_username: None,
            imgflip_password: None,
            grok_enabled: false,
            grok_model: DEFAULT_GROK_MODEL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            template_cache_ttl: DEFAULT_TEMPLATE_CACHE_TTL,
            top_k: DEFAULT_TOP_K,
            toxicity_threshold: DEFAULT_TOXICITY_THRESHOLD,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            image_backends: ImageBackend::default_order(),
            gateway_api_keys: Vec::new(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "MEMEFORGE_PORT";
    const ENV_BIND_ADDR: &'static str = "MEMEFORGE_BIND_ADDR";
    const ENV_OUTPUT_DIR: &'static str = "MEMEFORGE_OUTPUT_DIR";
    const ENV_COMPLIANCE_LOG: &'static str = "MEMEFORGE_COMPLIANCE_LOG";
    const ENV_BANNED_WORDS_FILE: &'static str = "BANNED_WORDS_FILE";
    const ENV_USE_PAID_API: &'static str = "USE_PAID_API";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_OPENAI_BASE_URL: &'static str = "MEMEFORGE_OPENAI_BASE_URL";
    const ENV_OPENAI_TEXT_MODEL: &'static str = "OPENAI_TEXT_MODEL";
    const ENV_OPENAI_IMAGE_MODEL: &'static str = "OPENAI_IMAGE_MODEL";
    const ENV_OPENAI_EMBEDDING_MODEL: &'static str = "OPENAI_EMBEDDING_MODEL";
    const ENV_OPENAI_TIMEOUT: &'static str = "OPENAI_TIMEOUT";
    const ENV_HF_TOKEN: &'static str = "HUGGINGFACE_API_TOKEN";
    const ENV_HF_CAPTION_MODEL: &'static str = "CAPTION_MODEL";
    const ENV_HF_TOXICITY_MODEL: &'static str = "TOXICITY_MODEL";
    const ENV_DEEPAI_KEY: &'static str = "DEEPAI_API_KEY";
    const ENV_PERSPECTIVE_KEY: &'static str = "PERSPECTIVE_API_KEY";
    const ENV_IMGFLIP_USERNAME: &'static str = "IMGFLIP_USERNAME";
    const ENV_IMGFLIP_PASSWORD: &'static str = "IMGFLIP_PASSWORD";
    const ENV_XAI_API_KEY: &'static str = "XAI_API_KEY";
    const ENV_GROK_MODEL: &'static str = "GROK_MODEL";
    const ENV_HTTP_TIMEOUT: &'static str = "MEMEFORGE_HTTP_TIMEOUT_SECS";
    const ENV_CACHE_TTL: &'static str = "MEMEFORGE_TEMPLATE_CACHE_TTL_SECS";
    const ENV_TOP_K: &'static str = "TOP_K_TEMPLATES";
    const ENV_TOXICITY_THRESHOLD: &'static str = "MEMEFORGE_TOXICITY_THRESHOLD";
    const ENV_RATE_LIMIT_MAX: &'static str = "MEMEFORGE_RATE_LIMIT_MAX";
    const ENV_RATE_LIMIT_WINDOW: &'static str = "MEMEFORGE_RATE_LIMIT_WINDOW_SECS";
    const ENV_IMAGE_BACKENDS: &'static str = "MEMEFORGE_IMAGE_BACKENDS";
    const ENV_GATEWAY_KEYS: &'static str = "MEMEFORGE_GATEWAY_KEYS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            output_dir: Self::parse_path_from_env(Self::ENV_OUTPUT_DIR, defaults.output_dir),
            compliance_log_path: Self::parse_path_from_env(
                Self::ENV_COMPLIANCE_LOG,
                defaults.compliance_log_path,
            ),
            banned_words_path: Self::parse_optional_string_from_env(Self::ENV_BANNED_WORDS_FILE)
                .map(PathBuf::from),
            use_paid_api: Self::parse_bool_from_env(Self::ENV_USE_PAID_API, defaults.use_paid_api),
            openai_api_key: Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY),
            openai_base_url: Self::parse_string_from_env(
                Self::ENV_OPENAI_BASE_URL,
                defaults.openai_base_url,
            ),
            openai_text_model: Self::parse_string_from_env(
                Self::ENV_OPENAI_TEXT_MODEL,
                defaults.openai_text_model,
            ),
            openai_image_model: Self::parse_string_from_env(
                Self::ENV_OPENAI_IMAGE_MODEL,
                defaults.openai_image_model,
            ),
            openai_embedding_model: Self::parse_string_from_env(
                Self::ENV_OPENAI_EMBEDDING_MODEL,
                defaults.openai_embedding_model,
            ),
            openai_timeout: Self::parse_secs_from_env(
                Self::ENV_OPENAI_TIMEOUT,
                defaults.openai_timeout,
            )?,
            huggingface_api_token: Self::parse_optional_string_from_env(Self::ENV_HF_TOKEN),
            huggingface_caption_model: Self::parse_string_from_env(
                Self::ENV_HF_CAPTION_MODEL,
                defaults.huggingface_caption_model,
            ),
            huggingface_toxicity_model: Self::parse_string_from_env(
                Self::ENV_HF_TOXICITY_MODEL,
                defaults.huggingface_toxicity_model,
            ),
            deepai_api_key: Self::parse_optional_string_from_env(Self::ENV_DEEPAI_KEY),
            perspective_api_key: Self::parse_optional_string_from_env(Self::ENV_PERSPECTIVE_KEY),
            imgflip_username: Self::parse_optional_string_from_env(Self::ENV_IMGFLIP_USERNAME),
            imgflip_password: Self::parse_optional_string_from_env(Self::ENV_IMGFLIP_PASSWORD),
            grok_enabled: Self::parse_optional_string_from_env(Self::ENV_XAI_API_KEY).is_some(),
            grok_model: Self::parse_string_from_env(Self::ENV_GROK_MODEL, defaults.grok_model),
            http_timeout: Self::parse_secs_from_env(Self::ENV_HTTP_TIMEOUT, defaults.http_timeout)?,
            template_cache_ttl: Self::parse_secs_from_env(
                Self::ENV_CACHE_TTL,
                defaults.template_cache_ttl,
            )?,
            top_k: Self::parse_number_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            toxicity_threshold: Self::parse_number_from_env(
                Self::ENV_TOXICITY_THRESHOLD,
                defaults.toxicity_threshold,
            )?,
            rate_limit_max_requests: Self::parse_number_from_env(
                Self::ENV_RATE_LIMIT_MAX,
                defaults.rate_limit_max_requests,
            )?,
            rate_limit_window: Self::parse_secs_from_env(
                Self::ENV_RATE_LIMIT_WINDOW,
                defaults.rate_limit_window,
            )?,
            image_backends: Self::parse_backends_from_env(defaults.image_backends)?,
            gateway_api_keys: Self::parse_list_from_env(Self::ENV_GATEWAY_KEYS),
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.output_dir.clone(),
            });
        }

        if let Some(ref path) = self.banned_words_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.rate_limit_max_requests == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RATE_LIMIT_MAX,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.rate_limit_window.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RATE_LIMIT_WINDOW,
                reason: "must be at least 1 second".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.toxicity_threshold) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOXICITY_THRESHOLD,
                reason: format!("{} is outside [0, 1]", self.toxicity_threshold),
            });
        }

        if self.image_backends.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_IMAGE_BACKENDS,
                reason: "at least one backend is required".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Returns `true` when both Imgflip credentials are present.
    pub fn imgflip_configured(&self) -> bool {
        self.imgflip_username.is_some() && self.imgflip_password.is_some()
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_backends_from_env(default: Vec<ImageBackend>) -> Result<Vec<ImageBackend>, ConfigError> {
        match Self::parse_optional_string_from_env(Self::ENV_IMAGE_BACKENDS) {
            Some(value) => ImageBackend::parse_list(&value),
            None => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_list_from_env(var_name: &str) -> Vec<String> {
        Self::parse_optional_string_from_env(var_name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match Self::parse_optional_string_from_env(var_name) {
            Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
            None => default,
        }
    }

    fn parse_number_from_env<T: FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name,
                value,
            }),
            None => Ok(default),
        }
    }

    fn parse_secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            None => Ok(default),
        }
    }
}
