//! Shared helpers for invoiceme-client integration tests.

#![allow(dead_code)]

use invoiceme_client::session::MemoryCredentialStore;
use invoiceme_client::{Backend, ClientSettings, RequestNavigator, RestGateway, SessionContext, View};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use wiremock::MockServer;

/// base64("admin:secret")
pub const ADMIN_CREDENTIALS: &str = "YWRtaW46c2VjcmV0";

pub struct TestClient {
    pub backend: Backend,
    pub session: Arc<SessionContext>,
    pub store: Arc<MemoryCredentialStore>,
    pub navigator: Arc<RequestNavigator>,
}

/// A client signed in as admin, currently showing `view`.
pub async fn signed_in_client(server: &MockServer, view: View) -> TestClient {
    let client = anonymous_client(server, view).await;
    client
        .session
        .login("admin", "secret")
        .await
        .expect("login stores credentials");
    client
}

pub async fn anonymous_client(server: &MockServer, view: View) -> TestClient {
    client_at(&server.uri(), view).await
}

pub async fn client_at(base_url: &str, view: View) -> TestClient {
    let store = Arc::new(MemoryCredentialStore::new());
    let session = Arc::new(SessionContext::new(store.clone()));
    session.hydrate().await.expect("hydrate");
    let navigator = Arc::new(RequestNavigator::new(view));

    let gateway = RestGateway::new(
        reqwest::Client::new(),
        &ClientSettings::new(base_url),
        session.clone(),
        navigator.clone(),
    );

    TestClient {
        backend: Backend::new(Arc::new(gateway)),
        session,
        store,
        navigator,
    }
}

pub fn invoice_json(id: Uuid, status: &str, total: f64, paid: f64) -> Value {
    json!({
        "id": id,
        "invoiceNumber": "INV-1001",
        "customerId": Uuid::nil(),
        "customerName": "Acme Corp",
        "customerEmail": "ap@acme.test",
        "issueDate": "2025-01-01",
        "dueDate": "2025-01-31",
        "status": status,
        "subtotal": total / 1.1,
        "taxAmount": total - total / 1.1,
        "totalAmount": total,
        "amountPaid": paid,
        "balanceRemaining": total - paid,
        "allowsPartialPayment": true,
        "lineItems": [{
            "id": Uuid::nil(),
            "description": "Consulting",
            "quantity": 1,
            "unitPrice": total / 1.1,
            "lineTotal": total / 1.1
        }]
    })
}

pub fn payment_json(invoice_id: Uuid, amount: f64, date: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "invoiceId": invoice_id,
        "invoiceNumber": "INV-1001",
        "paymentAmount": amount,
        "paymentDate": date,
        "paymentMethod": "BANK_TRANSFER"
    })
}

pub fn reminder_json(invoice_id: Uuid, reminder_type: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "invoiceId": invoice_id,
        "reminderType": reminder_type,
        "sentAt": "2025-02-10T09:30:00",
        "recipientEmail": "ap@acme.test",
        "subject": "Payment reminder",
        "emailBody": "Please pay"
    })
}

pub fn preview_json() -> Value {
    json!({
        "subject": "Invoice INV-1001 is due",
        "emailBody": "Dear Acme Corp, ...",
        "recipientEmail": "ap@acme.test",
        "invoiceNumber": "INV-1001"
    })
}
