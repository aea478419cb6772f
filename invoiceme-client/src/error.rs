use invoiceme_core::error::AppError;
use thiserror::Error;

/// Failures surfaced by the gateway, the session holder and the resource clients.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Session expired")]
    SessionExpired,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => {
                tracing::error!(error = %e, "Backend unreachable");
                AppError::ServiceUnavailable
            }
            ClientError::Http { status, body } => AppError::from_upstream(status, body),
            ClientError::Validation(errors) => AppError::ValidationError(errors),
            ClientError::SessionExpired => AppError::SessionExpired,
            ClientError::Decode(msg) => AppError::BadGateway(msg),
            ClientError::Storage(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
            ClientError::Config(e) => AppError::ConfigError(anyhow::Error::new(e)),
        }
    }
}
