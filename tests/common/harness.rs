//! Test server harness: the real router on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use memeforge::gateway::{HandlerState, create_router_with_state};
use memeforge::orchestrator::{Orchestrator, OrchestratorParts};
use memeforge::ratelimit::RateLimiter;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct TestServerConfig {
    pub parts: OrchestratorParts,
    pub max_requests: u32,
    pub window: Duration,
    pub gateway_keys: Vec<String>,
}

impl TestServerConfig {
    pub fn new(parts: OrchestratorParts) -> Self {
        Self {
            parts,
            max_requests: 1_000,
            window: Duration::from_secs(60),
            gateway_keys: Vec::new(),
        }
    }

    pub fn with_rate_limit(mut self, max_requests: u32, window: Duration) -> Self {
        self.max_requests = max_requests;
        self.window = window;
        self
    }

    pub fn with_gateway_key(mut self, key: &str) -> Self {
        self.gateway_keys.push(key.to_string());
        self
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub orchestrator: Arc<Orchestrator>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub async fn wait_for_server_ready(addr: SocketAddr) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();
    loop {
        if start.elapsed() > STARTUP_WAIT_TIMEOUT {
            return Err(ServerStartupError::Timeout);
        }
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(STARTUP_POLL_INTERVAL).await,
        }
    }
}

/// Spawns the gateway over `config.parts` and waits until it accepts connections.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let state = HandlerState::new(
        Orchestrator::new(config.parts),
        RateLimiter::new(config.max_requests, config.window),
        config.gateway_keys,
    );
    let orchestrator = Arc::clone(&state.orchestrator);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(addr).await?;

    Ok(TestServer {
        addr,
        orchestrator,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
