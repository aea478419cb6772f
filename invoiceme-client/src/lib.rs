//! Client side of InvoiceMe: a typed REST client for the backend, the
//! signed-in session, and the invoice lifecycle workflows built on top.

pub mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod resources;
pub mod session;
pub mod validation;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ClientSettings;
pub use error::ClientError;
pub use gateway::{Navigator, RequestNavigator, RestGateway, View};
pub use resources::Backend;
pub use session::{AuthState, CredentialStore, RouteDecision, SessionContext, UserInfo};

use std::sync::Arc;

/// Build a [`Backend`] for one session. Hydrates the session first so that
/// credentials persisted by an earlier process or request are picked up.
pub async fn connect(
    client: reqwest::Client,
    settings: &ClientSettings,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
) -> Result<Backend, ClientError> {
    let session = Arc::new(SessionContext::new(store));
    session.hydrate().await?;
    let gateway = RestGateway::new(client, settings, session, navigator);
    Ok(Backend::new(Arc::new(gateway)))
}
