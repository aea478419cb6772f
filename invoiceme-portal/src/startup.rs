use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use invoiceme_core::middleware::request_id_middleware;
use invoiceme_core::observability::REQUEST_ID_HEADER;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::health_check,
    auth::{login_handler, logout_handler, session_handler},
    chat::{chat_history, reset_chat, send_message},
    customers::{
        create_customer, customer_invoices, delete_customer, get_customer, list_customers,
        search_customers, update_customer,
    },
    dashboard::dashboard_handler,
    invoices::{create_invoice, invoice_detail, list_invoices, update_invoice},
    metrics::metrics,
    payments::{get_payment, list_payments},
    public,
    reminders::overdue_handler,
    workflow,
};
use crate::middleware::{auth::auth_middleware, metrics::metrics_middleware};
use crate::AppState;

/// Views that need a signed-in session.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/search", get(search_customers))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/customers/:id/invoices", get(customer_invoices))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/:id", get(invoice_detail).put(update_invoice))
        .route("/invoices/:id/send/open", post(workflow::open_send))
        .route("/invoices/:id/send/confirm", post(workflow::confirm_send))
        .route("/invoices/:id/send/edit", post(workflow::edit_from_send))
        .route("/invoices/:id/send/close", post(workflow::close_send))
        .route("/invoices/:id/cancel/open", post(workflow::open_cancel))
        .route("/invoices/:id/cancel/reason", post(workflow::submit_cancel_reason))
        .route("/invoices/:id/cancel/back", post(workflow::back_to_cancel_reason))
        .route("/invoices/:id/cancel/confirm", post(workflow::confirm_cancel))
        .route("/invoices/:id/cancel/close", post(workflow::close_cancel))
        .route("/invoices/:id/reminder/open", post(workflow::open_reminder))
        .route("/invoices/:id/reminder/type", post(workflow::select_reminder_type))
        .route("/invoices/:id/reminder/confirm", post(workflow::confirm_reminder))
        .route("/invoices/:id/reminder/close", post(workflow::close_reminder))
        .route("/invoices/:id/mark-paid/open", post(workflow::open_mark_paid))
        .route("/invoices/:id/mark-paid/confirm", post(workflow::confirm_mark_paid))
        .route("/invoices/:id/mark-paid/close", post(workflow::close_mark_paid))
        .route("/invoices/:id/payment/open", post(workflow::open_payment))
        .route("/invoices/:id/payment/submit", post(workflow::submit_payment))
        .route("/invoices/:id/payment/close", post(workflow::close_payment))
        .route("/reminders/overdue", get(overdue_handler))
        .route("/payments", get(list_payments))
        .route("/payments/:id", get(get_payment))
        .route("/chat", get(chat_history).post(send_message))
        .route("/chat/reset", post(reset_chat))
        .route_layer(from_fn(auth_middleware))
}

pub fn build_router(state: AppState, session_key: Key, secure_cookies: bool) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)))
        .with_signed(session_key);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/session", get(session_handler))
        .route(
            "/public/payment/:link",
            get(public::payment_page).post(public::submit_payment),
        )
        .merge(protected_routes())
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
