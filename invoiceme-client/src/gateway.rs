//! REST gateway: one configured HTTP client for every backend call.
//!
//! Authenticated calls carry `Authorization: Basic <credentials>` when the
//! session has them. A 401 outside the login view ends the session and sends
//! the user to the login view; on the login view it is returned as a plain
//! HTTP error so the login form can report it without looping.

use crate::config::ClientSettings;
use crate::error::ClientError;
use crate::session::SessionContext;
use invoiceme_core::observability::TracedClientExt;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Mutex};

/// Top-level views a user can be navigated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Invoices,
    InvoiceDetail(String),
    InvoiceEdit(String),
    Customers,
    Reminders,
    Payments,
    /// Any other location, identified by its path.
    Other(String),
}

impl View {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => View::Login,
            [] | ["dashboard"] => View::Dashboard,
            ["invoices"] => View::Invoices,
            ["invoices", id] => View::InvoiceDetail(id.to_string()),
            ["invoices", id, "edit"] => View::InvoiceEdit(id.to_string()),
            ["customers"] => View::Customers,
            ["reminders"] => View::Reminders,
            ["payments"] => View::Payments,
            _ => View::Other(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::Login => "/login".to_string(),
            View::Dashboard => "/dashboard".to_string(),
            View::Invoices => "/invoices".to_string(),
            View::InvoiceDetail(id) => format!("/invoices/{}", id),
            View::InvoiceEdit(id) => format!("/invoices/{}/edit", id),
            View::Customers => "/customers".to_string(),
            View::Reminders => "/reminders".to_string(),
            View::Payments => "/payments".to_string(),
            View::Other(path) => path.clone(),
        }
    }
}

/// Where the user currently is, and how to move them.
pub trait Navigator: Send + Sync {
    fn current_view(&self) -> View;
    fn navigate(&self, view: View);
}

/// Navigator for one request or one headless session: starts at a view and
/// remembers the last navigation request.
pub struct RequestNavigator {
    current: Mutex<View>,
    requested: Mutex<Option<View>>,
}

impl RequestNavigator {
    pub fn new(current: View) -> Self {
        Self {
            current: Mutex::new(current),
            requested: Mutex::new(None),
        }
    }

    pub fn at_path(path: &str) -> Self {
        Self::new(View::from_path(path))
    }

    /// The most recent navigation, if any.
    pub fn requested(&self) -> Option<View> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

impl Navigator for RequestNavigator {
    fn current_view(&self) -> View {
        self.current
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(View::Other(String::new()))
    }

    fn navigate(&self, view: View) {
        tracing::debug!(to = %view.path(), "Navigation requested");
        if let Ok(mut current) = self.current.lock() {
            *current = view.clone();
        }
        if let Ok(mut requested) = self.requested.lock() {
            *requested = Some(view);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Authenticated,
    Public,
}

pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    navigator: Arc<dyn Navigator>,
    request_id: Option<String>,
}

impl RestGateway {
    pub fn new(
        client: reqwest::Client,
        settings: &ClientSettings,
        session: Arc<SessionContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url: settings.normalized_base_url().to_string(),
            session,
            navigator,
            request_id: None,
        }
    }

    /// Forward a correlation ID on every call made through this gateway.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .dispatch::<(), ()>(Method::GET, path, None, None, Access::Authenticated)
            .await?;
        decode(response).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch::<Q, ()>(Method::GET, path, Some(query), None, Access::Authenticated)
            .await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch::<(), B>(Method::POST, path, None, Some(body), Access::Authenticated)
            .await?;
        decode(response).await
    }

    /// POST without a request body, for lifecycle actions like `/send`.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .dispatch::<(), ()>(Method::POST, path, None, None, Access::Authenticated)
            .await?;
        decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch::<(), B>(Method::PUT, path, None, Some(body), Access::Authenticated)
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.dispatch::<(), ()>(Method::DELETE, path, None, None, Access::Authenticated)
            .await?;
        Ok(())
    }

    /// Unauthenticated GET for the public payment portal.
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .dispatch::<(), ()>(Method::GET, path, None, None, Access::Public)
            .await?;
        decode(response).await
    }

    /// Unauthenticated POST for the public payment portal.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch::<(), B>(Method::POST, path, None, Some(body), Access::Public)
            .await?;
        decode(response).await
    }

    async fn dispatch<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        access: Access,
    ) -> Result<reqwest::Response, ClientError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.traced(method.clone(), &url);

        if access == Access::Authenticated {
            if let Some(credentials) = self.session.credentials().await? {
                request = request.basic_credentials(credentials.expose_secret());
            }
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send(self.request_id.as_deref())
            .await
            .map_err(|e| {
                tracing::error!(method = %method, url = %url, error = %e, "Backend request failed");
                ClientError::Network(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED
            && access == Access::Authenticated
            && self.navigator.current_view() != View::Login
        {
            tracing::warn!(url = %url, "Backend rejected credentials; ending session");
            self.session.logout().await?;
            self.navigator.navigate(View::Login);
            return Err(ClientError::SessionExpired);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "Backend returned an error status"
        );
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await.map_err(ClientError::Network)?;

    // Endpoints that answer 2xx without a body decode as JSON null, which
    // lets callers ask for `()`.
    let slice: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(slice).map_err(|e| ClientError::Decode(e.to_string()))
}
