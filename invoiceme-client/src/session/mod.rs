//! Session/credential holder.
//!
//! A [`SessionContext`] owns the signed-in state for one process (or, in the
//! portal, one browser session). It starts in [`AuthState::Loading`] and must
//! be hydrated from its store before protected views decide anything, so a
//! refresh never produces a spurious redirect to the login view.

pub mod store;

pub use store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIALS_KEY, USER_INFO_KEY,
};

use crate::error::ClientError;
use base64::{engine::general_purpose, Engine as _};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    pub is_authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Storage has not been read yet.
    Loading,
    Anonymous,
    Authenticated(UserInfo),
}

/// What a protected view should do with the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    ShowLoading,
    Render(UserInfo),
    RedirectToLogin,
}

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    state: RwLock<AuthState>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            state: RwLock::new(AuthState::Loading),
        }
    }

    /// Read persisted credentials and user-info into memory.
    pub async fn hydrate(&self) -> Result<AuthState, ClientError> {
        let state = match (self.credentials_raw().await?, self.current_user().await?) {
            (Some(_), Some(user)) => AuthState::Authenticated(user),
            (Some(_), None) => {
                tracing::warn!("Credentials present without user info; clearing them");
                self.store.remove(CREDENTIALS_KEY).await?;
                AuthState::Anonymous
            }
            _ => AuthState::Anonymous,
        };

        *self.state.write().await = state.clone();
        Ok(state)
    }

    /// Encode and persist credentials. Nothing is sent to the backend here;
    /// the first authenticated request validates them.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserInfo, ClientError> {
        let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
        let user = UserInfo {
            username: username.to_string(),
            is_authenticated: true,
        };
        let user_json =
            serde_json::to_string(&user).map_err(|e| ClientError::Storage(e.to_string()))?;

        self.store.set(CREDENTIALS_KEY, encoded).await?;
        self.store.set(USER_INFO_KEY, user_json).await?;
        *self.state.write().await = AuthState::Authenticated(user.clone());

        tracing::info!(username = %user.username, "Credentials stored");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store.remove(CREDENTIALS_KEY).await?;
        self.store.remove(USER_INFO_KEY).await?;
        *self.state.write().await = AuthState::Anonymous;
        Ok(())
    }

    /// Persisted user-info; unreadable records count as absent.
    pub async fn current_user(&self) -> Result<Option<UserInfo>, ClientError> {
        let Some(raw) = self.store.get(USER_INFO_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable user info");
                Ok(None)
            }
        }
    }

    pub async fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.credentials_raw().await?.is_some())
    }

    /// Encoded credentials for the Authorization header.
    pub async fn credentials(&self) -> Result<Option<Secret<String>>, ClientError> {
        Ok(self.credentials_raw().await?.map(Secret::new))
    }

    pub async fn auth_state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn route_decision(&self) -> RouteDecision {
        match self.auth_state().await {
            AuthState::Loading => RouteDecision::ShowLoading,
            AuthState::Anonymous => RouteDecision::RedirectToLogin,
            AuthState::Authenticated(user) => RouteDecision::Render(user),
        }
    }

    async fn credentials_raw(&self) -> Result<Option<String>, ClientError> {
        self.store.get(CREDENTIALS_KEY).await
    }
}
