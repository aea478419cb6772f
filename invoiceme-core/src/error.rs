use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Header the browser shell follows to navigate after a fragment request.
pub const REDIRECT_HEADER: &str = "HX-Redirect";

/// Where a client is sent once its backend session is gone.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Session expired")]
    SessionExpired,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    /// Any other error, answered with a navigation to `to`.
    #[error("{source}")]
    Redirect { to: String, source: Box<AppError> },
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Map an upstream (backend) HTTP status onto the error we surface.
    pub fn from_upstream(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("backend responded with status {}", status)
        } else {
            body
        };

        match status {
            400 | 422 => AppError::BadRequest(anyhow::anyhow!(message)),
            401 => AppError::Unauthorized(anyhow::anyhow!(message)),
            404 => AppError::NotFound(anyhow::anyhow!(message)),
            409 => AppError::Conflict(anyhow::anyhow!(message)),
            _ => AppError::BadGateway(message),
        }
    }

    /// Keep this error's status and body but send the browser to `to`.
    pub fn redirect_to(self, to: impl Into<String>) -> Self {
        AppError::Redirect {
            to: to.into(),
            source: Box::new(self),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details, redirect) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
                None,
            ),
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None, None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None, None),
            AppError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err.to_string(), None, None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None, None),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "Session expired".to_string(),
                None,
                Some(LOGIN_PATH),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(format!("{:#}", err)),
                None,
            ),
            AppError::BadGateway(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Bad Gateway: {}", msg),
                None,
                None,
            ),
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
                None,
                None,
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
                None,
            ),
            AppError::Redirect { to, source } => {
                let mut res = source.into_response();
                match HeaderValue::from_str(&to) {
                    Ok(value) => {
                        res.headers_mut().insert(REDIRECT_HEADER, value);
                    }
                    Err(_) => tracing::warn!(path = %to, "Dropping unrepresentable redirect"),
                }
                return res;
            }
        };

        let mut res = (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response();

        if let Some(path) = redirect {
            res.headers_mut()
                .insert(REDIRECT_HEADER, HeaderValue::from_static(path));
        }

        res
    }
}
