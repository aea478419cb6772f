//! InvoiceMe portal: serves the signed-in user's views over a cookie session.
//!
//! Each request gets its own [`invoiceme_client::SessionContext`], backed by
//! the cookie session, and its own navigator positioned at the request path.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use invoiceme_client::ClientSettings;
use services::in_flight::InFlightActions;

/// Shared application state: one HTTP client pool, the backend location and
/// the invoice actions currently running.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub client_settings: ClientSettings,
    pub in_flight: InFlightActions,
}

impl AppState {
    pub fn new(client_settings: ClientSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_settings,
            in_flight: InFlightActions::new(),
        }
    }
}
