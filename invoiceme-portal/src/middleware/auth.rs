use crate::services::session_store::SessionCredentialStore;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use invoiceme_client::{RouteDecision, SessionContext};
use invoiceme_core::error::{AppError, LOGIN_PATH};
use std::sync::Arc;
use tower_sessions::Session;

/// Guard for signed-in views. The session is hydrated before deciding, so a
/// returning browser with stored credentials is never bounced to login.
pub async fn auth_middleware(session: Session, mut request: Request, next: Next) -> Response {
    let context = SessionContext::new(Arc::new(SessionCredentialStore::new(session)));
    if let Err(e) = context.hydrate().await {
        return AppError::from(e).into_response();
    }

    match context.route_decision().await {
        RouteDecision::Render(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        RouteDecision::RedirectToLogin | RouteDecision::ShowLoading => {
            tracing::debug!(path = %request.uri().path(), "No session; redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}
