//! Credential storage inside the cookie session.

use async_trait::async_trait;
use invoiceme_client::{ClientError, CredentialStore};
use tower_sessions::Session;

/// Keeps the client's credential keys in the browser's server-side session,
/// so each browser signs in independently.
#[derive(Clone)]
pub struct SessionCredentialStore {
    session: Session,
}

impl SessionCredentialStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

fn storage_error(e: tower_sessions::session::Error) -> ClientError {
    ClientError::Storage(e.to_string())
}

#[async_trait]
impl CredentialStore for SessionCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.session.get::<String>(key).await.map_err(storage_error)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ClientError> {
        self.session.insert(key, value).await.map_err(storage_error)
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.session
            .remove::<String>(key)
            .await
            .map(drop)
            .map_err(storage_error)
    }
}
