use crate::services::in_flight::{InFlightActions, InFlightGuard};
use crate::services::session_store::SessionCredentialStore;
use crate::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{NaiveDate, Utc};
use invoiceme_client::chat::ChatSession;
use invoiceme_client::workflow::{ActionOutcome, DetailError, InvoiceDetailView, InvoiceFlows};
use invoiceme_client::{
    Backend, ClientError, RequestNavigator, RestGateway, SessionContext, UserInfo, View,
};
use invoiceme_core::error::AppError;
use invoiceme_core::middleware::RequestId;
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::detail::InvoiceDetailResponse;

/// Session key for the assistant conversation.
pub const CHAT_SESSION_KEY: &str = "chat_session";

fn flows_key(invoice_id: Uuid) -> String {
    format!("invoice_flows:{}", invoice_id)
}

pub(crate) fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::Error::new(e))
}

/// Per-request view of the backend, signed in as whoever owns the cookie
/// session.
pub struct PortalContext {
    pub backend: Backend,
    pub session: Session,
    navigator: Arc<RequestNavigator>,
    in_flight: InFlightActions,
}

#[async_trait]
impl FromRequestParts<AppState> for PortalContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::InternalError(anyhow::anyhow!(message)))?;

        let context = Arc::new(SessionContext::new(Arc::new(SessionCredentialStore::new(
            session.clone(),
        ))));
        context.hydrate().await?;

        let navigator = Arc::new(RequestNavigator::at_path(parts.uri.path()));
        let mut gateway = RestGateway::new(
            state.http.clone(),
            &state.client_settings,
            context,
            navigator.clone(),
        );
        if let Some(RequestId(id)) = parts.extensions.get::<RequestId>() {
            gateway = gateway.with_request_id(id.clone());
        }

        Ok(Self {
            backend: Backend::new(Arc::new(gateway)),
            session,
            navigator,
            in_flight: state.in_flight.clone(),
        })
    }
}

impl PortalContext {
    pub fn session_context(&self) -> &Arc<SessionContext> {
        self.backend.gateway.session()
    }

    pub async fn user(&self) -> Result<Option<UserInfo>, AppError> {
        Ok(self.session_context().current_user().await?)
    }

    /// True once a backend call during this request ended the session.
    pub fn session_expired(&self) -> bool {
        self.navigator.requested() == Some(View::Login)
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn flows(&self, invoice_id: Uuid) -> Result<InvoiceFlows, AppError> {
        Ok(self
            .session
            .get::<InvoiceFlows>(&flows_key(invoice_id))
            .await
            .map_err(session_error)?
            .unwrap_or_default())
    }

    /// Idle flows are dropped from the session rather than stored.
    pub async fn save_flows(&self, invoice_id: Uuid, flows: &InvoiceFlows) -> Result<(), AppError> {
        let key = flows_key(invoice_id);
        if *flows == InvoiceFlows::default() {
            self.session
                .remove::<InvoiceFlows>(&key)
                .await
                .map_err(session_error)?;
        } else {
            self.session.insert(&key, flows).await.map_err(session_error)?;
        }
        Ok(())
    }

    /// Load the invoice view and resume whatever flows this browser left open.
    ///
    /// A load failure sends the browser back to the invoice list along with
    /// the error.
    pub async fn detail(&self, invoice_id: Uuid) -> Result<InvoiceDetailView, AppError> {
        let flows = self.flows(invoice_id).await?;
        match InvoiceDetailView::load(self.backend.clone(), invoice_id).await {
            Ok(view) => Ok(view.with_flows(flows)),
            Err(ClientError::SessionExpired) => Err(AppError::SessionExpired),
            Err(e) => {
                tracing::warn!(%invoice_id, error = %e, "Failed to load invoice detail");
                Err(AppError::from(e).redirect_to(View::Invoices.path()))
            }
        }
    }

    /// Claim this browser's action slot for the invoice. Held until the
    /// returned guard drops; a second claim meanwhile is a conflict.
    pub fn begin_action(&self, invoice_id: Uuid) -> Result<InFlightGuard, AppError> {
        let session = self
            .session
            .id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.in_flight.claim(&session, invoice_id)
    }

    /// Persist the view's flows and render it.
    pub async fn respond(
        &self,
        view: &InvoiceDetailView,
        outcome: Option<ActionOutcome>,
    ) -> Result<InvoiceDetailResponse, AppError> {
        self.save_flows(view.invoice().id, view.flows()).await?;
        Ok(InvoiceDetailResponse::new(view, outcome))
    }

    /// Finish an action that talked to the backend. An expired session
    /// drops this invoice's flows along with the credentials.
    pub async fn settle(
        &self,
        view: &InvoiceDetailView,
        result: Result<ActionOutcome, DetailError>,
    ) -> Result<InvoiceDetailResponse, AppError> {
        match result {
            Ok(outcome) => self.respond(view, Some(outcome)).await,
            Err(DetailError::Client(ClientError::SessionExpired)) => {
                tracing::info!(invoice_id = %view.invoice().id, "Session expired during invoice action");
                self.save_flows(view.invoice().id, &InvoiceFlows::default())
                    .await?;
                Err(AppError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn chat(&self) -> Result<ChatSession, AppError> {
        Ok(self
            .session
            .get::<ChatSession>(CHAT_SESSION_KEY)
            .await
            .map_err(session_error)?
            .unwrap_or_default())
    }

    pub async fn save_chat(&self, chat: &ChatSession) -> Result<(), AppError> {
        self.session
            .insert(CHAT_SESSION_KEY, chat)
            .await
            .map_err(session_error)
    }
}
