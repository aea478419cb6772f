//! End-to-end invoice lifecycle tests.
//!
//! Scenarios drive the client library the way the portal does: sign in,
//! open an invoice, walk its action flows and check what the backend ends up
//! holding. By default they run against [`FakeBackend`], an in-process
//! backend with real state. The smoke tests target a live backend instead.
//!
//! ## Usage
//!
//! ```bash
//! # Fake backend only
//! cargo test -p workflow-tests
//!
//! # Also the live smoke tests
//! INVOICEME_API_URL=http://localhost:8080/api cargo test -p workflow-tests -- --ignored
//! ```

pub mod fake_backend;

pub use fake_backend::{Cancellation, FakeBackend};

use anyhow::{anyhow, Result};
use invoiceme_client::session::MemoryCredentialStore;
use invoiceme_client::workflow::InvoiceDetailView;
use invoiceme_client::{
    Backend, ClientError, ClientSettings, Navigator, RequestNavigator, RestGateway,
    SessionContext, UserInfo, View,
};
use std::sync::{Arc, Once};
use std::time::Duration;
use uuid::Uuid;

/// Credentials the seeded backend accepts.
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "password";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug,invoiceme_client=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Live backend location and demo credentials from the environment.
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    pub settings: ClientSettings,
    pub username: String,
    pub password: String,
}

impl BackendEndpoint {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            settings: ClientSettings::from_env()?,
            username: std::env::var("INVOICEME_USERNAME")
                .unwrap_or_else(|_| DEMO_USERNAME.to_string()),
            password: std::env::var("INVOICEME_PASSWORD")
                .unwrap_or_else(|_| DEMO_PASSWORD.to_string()),
        })
    }

    /// Health lives at the server root, outside the `/api` prefix.
    pub fn health_url(&self) -> String {
        let base = self.settings.normalized_base_url();
        let origin = base.strip_suffix("/api").unwrap_or(base);
        format!("{}/actuator/health", origin)
    }
}

/// One signed-in (or not yet signed-in) client session.
pub struct WorkflowTestContext {
    pub backend: Backend,
    pub session: Arc<SessionContext>,
    pub navigator: Arc<RequestNavigator>,
}

impl WorkflowTestContext {
    /// Fresh session pointed at `base_url`, currently showing `view`.
    pub async fn new(base_url: &str, view: View) -> Result<Self> {
        init_tracing();

        let session = Arc::new(SessionContext::new(Arc::new(MemoryCredentialStore::new())));
        session.hydrate().await?;
        let navigator = Arc::new(RequestNavigator::new(view));
        let gateway = RestGateway::new(
            reqwest::Client::new(),
            &ClientSettings::new(base_url),
            session.clone(),
            navigator.clone(),
        )
        .with_request_id(Uuid::new_v4().to_string());

        Ok(Self {
            backend: Backend::new(Arc::new(gateway)),
            session,
            navigator,
        })
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<UserInfo> {
        let user = self.session.login(username, password).await?;
        self.navigator.navigate(View::Dashboard);
        Ok(user)
    }

    pub async fn open_invoice(&self, id: Uuid) -> Result<InvoiceDetailView, ClientError> {
        self.navigator.navigate(View::InvoiceDetail(id.to_string()));
        InvoiceDetailView::load(self.backend.clone(), id).await
    }
}

/// Wait for the live backend to report healthy.
///
/// Polls the health endpoint until it responds with 200 OK.
/// Times out after the specified duration.
pub async fn wait_for_backend(endpoint: &BackendEndpoint, timeout: Duration) -> Result<()> {
    let url = endpoint.health_url();
    let client = reqwest::Client::new();
    let start = std::time::Instant::now();

    tracing::info!(url = %url, "Waiting for backend to be healthy...");

    loop {
        let problem = match client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Backend is healthy");
                return Ok(());
            }
            Ok(resp) => format!("status: {}", resp.status()),
            Err(e) => format!("error: {}", e),
        };

        if start.elapsed() > timeout {
            return Err(anyhow!("Timeout waiting for backend at {} ({})", url, problem));
        }

        tracing::debug!(problem = %problem, "Waiting for backend");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
