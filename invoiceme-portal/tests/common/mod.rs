//! Shared helpers for invoiceme-portal router tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use invoiceme_client::ClientSettings;
use invoiceme_portal::startup::build_router;
use invoiceme_portal::AppState;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use tower_sessions::cookie::Key;
use uuid::Uuid;

/// base64("admin:secret")
pub const ADMIN_CREDENTIALS: &str = "YWRtaW46c2VjcmV0";

pub fn app(backend_url: &str) -> Router {
    build_router(
        AppState::new(ClientSettings::new(backend_url)),
        Key::from(&[7u8; 64][..]),
        false,
    )
}

/// A browser: one router plus whatever session cookie it was last handed.
pub struct Browser {
    pub app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    pub async fn post_empty(&mut self, uri: &str) -> Response {
        self.send(Request::builder().method("POST").uri(uri), Body::empty())
            .await
    }

    pub async fn post_json(&mut self, uri: &str, body: Value) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(format!("username={}&password={}", username, password)),
        )
        .await
    }

    /// A second tab in the same browser: same router, same session cookie.
    pub fn new_tab(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: self.cookie.clone(),
        }
    }

    pub async fn signed_in(app: Router) -> Self {
        let mut browser = Self::new(app);
        let response = browser.login("admin", "secret").await;
        assert_eq!(response.status(), StatusCode::OK);
        browser
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> Response {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = Some(pair);
        }
        response
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn invoice_json(id: Uuid, status: &str, total: f64, paid: f64) -> Value {
    json!({
        "id": id,
        "invoiceNumber": "INV-2001",
        "customerId": Uuid::nil(),
        "customerName": "Globex",
        "customerEmail": "billing@globex.test",
        "issueDate": "2025-01-01",
        "dueDate": "2025-01-31",
        "status": status,
        "subtotal": 100.0,
        "taxAmount": 10.0,
        "totalAmount": total,
        "amountPaid": paid,
        "balanceRemaining": total - paid,
        "allowsPartialPayment": true,
        "paymentLink": "pay-abc",
        "lineItems": []
    })
}
