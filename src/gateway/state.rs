use std::sync::Arc;

use crate::config::Config;
use crate::orchestrator::{Orchestrator, OrchestratorError};
use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct HandlerState {
    pub orchestrator: Arc<Orchestrator>,

    pub limiter: Arc<RateLimiter>,

    /// Keys accepted by `/v1/secure`; empty disables the check.
    pub gateway_keys: Arc<Vec<String>>,
}

impl HandlerState {
    pub fn new(orchestrator: Orchestrator, limiter: RateLimiter, gateway_keys: Vec<String>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            limiter: Arc::new(limiter),
            gateway_keys: Arc::new(gateway_keys),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, OrchestratorError> {
        Ok(Self::new(
            Orchestrator::from_config(config)?,
            RateLimiter::from_config(config),
            config.gateway_api_keys.clone(),
        ))
    }

    pub fn requires_key(&self) -> bool {
        !self.gateway_keys.is_empty()
    }

    pub fn accepts_key(&self, key: Option<&str>) -> bool {
        match key {
            Some(key) => self.gateway_keys.iter().any(|k| k == key),
            None => false,
        }
    }
}
