use crate::models::context::session_error;
use crate::models::PortalContext;
use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
    Form, Json,
};
use invoiceme_client::validation::{check, LoginForm};
use invoiceme_client::UserInfo;
use invoiceme_core::error::{AppError, LOGIN_PATH, REDIRECT_HEADER};
use serde::Serialize;

/// Where a fresh sign-in lands.
pub const HOME_PATH: &str = "/dashboard";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

fn with_redirect(mut response: Response, path: &'static str) -> Response {
    response
        .headers_mut()
        .insert(REDIRECT_HEADER, HeaderValue::from_static(path));
    response
}

/// Store the credentials for this browser. They are not checked here; the
/// first backend call that needs them does that.
pub async fn login_handler(
    portal: PortalContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    check(&form)?;

    // New session id on privilege change.
    portal.session.cycle_id().await.map_err(session_error)?;
    let user = portal
        .session_context()
        .login(&form.username, &form.password)
        .await?;

    tracing::info!(username = %user.username, "User signed in");
    Ok(with_redirect(Json(user).into_response(), HOME_PATH))
}

pub async fn logout_handler(portal: PortalContext) -> Result<Response, AppError> {
    portal.session_context().logout().await?;
    // Drops open flows and the assistant conversation too.
    portal.session.flush().await.map_err(session_error)?;

    tracing::info!("User signed out");
    Ok(with_redirect(
        Json(SessionStatus {
            authenticated: false,
            user: None,
        })
        .into_response(),
        LOGIN_PATH,
    ))
}

pub async fn session_handler(portal: PortalContext) -> Result<Json<SessionStatus>, AppError> {
    let user = portal.user().await?;
    Ok(Json(SessionStatus {
        authenticated: portal.session_context().is_authenticated().await? && user.is_some(),
        user,
    }))
}
