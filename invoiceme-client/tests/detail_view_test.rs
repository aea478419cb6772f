//! Invoice detail view-model against a mocked backend.

mod common;

use chrono::NaiveDate;
use common::{invoice_json, payment_json, preview_json, reminder_json, signed_in_client};
use invoiceme_client::models::{InvoiceStatus, ReminderType};
use invoiceme_client::workflow::{
    ActionOutcome, CancelFlow, CancellationReason, DetailError, InvoiceAction, InvoiceDetailView,
    NoticeKind, RecordPaymentFlow, SendFlow, WorkflowError,
};
use invoiceme_client::{ClientError, View};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 20).unwrap()
}

/// Serve `snapshots` for GET /invoices/{id}, one per request, repeating the last.
async fn mount_invoice_snapshots(server: &MockServer, id: Uuid, snapshots: Vec<Value>) {
    let last = snapshots.len() - 1;
    for (i, snapshot) in snapshots.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/invoices/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot));
        let mock = if i < last { mock.up_to_n_times(1) } else { mock };
        mock.mount(server).await;
    }
}

async fn mount_empty_related(server: &MockServer, id: Uuid) {
    Mock::given(method("GET"))
        .and(path(format!("/payments/invoice/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn load(server: &MockServer, id: Uuid) -> InvoiceDetailView {
    let client = signed_in_client(server, View::InvoiceDetail(id.to_string())).await;
    InvoiceDetailView::load(client.backend, id).await.unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn load_fetches_invoice_payments_and_reminders() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "SENT", 110.0, 50.0)]).await;
    Mock::given(method("GET"))
        .and(path(format!("/payments/invoice/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([payment_json(id, 50.0, "2025-02-01")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([reminder_json(id, "ON_DUE_DATE")])),
        )
        .mount(&server)
        .await;

    let view = load(&server, id).await;

    assert_eq!(view.invoice().balance_remaining, dec!(60));
    assert_eq!(view.payments().len(), 1);
    assert_eq!(view.reminders().len(), 1);
    assert!(view.permitted().can_record_payment);
}

#[tokio::test]
async fn any_failed_fetch_fails_the_load() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "SENT", 110.0, 0.0)]).await;
    Mock::given(method("GET"))
        .and(path(format!("/payments/invoice/{}", id)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = signed_in_client(&server, View::InvoiceDetail(id.to_string())).await;
    let result = InvoiceDetailView::load(client.backend, id).await;

    assert!(matches!(result, Err(ClientError::Http { status: 500, .. })));
}

// ============================================================================
// Send
// ============================================================================

#[tokio::test]
async fn sending_a_draft_locks_editing() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(
        &server,
        id,
        vec![
            invoice_json(id, "DRAFT", 110.0, 0.0),
            invoice_json(id, "SENT", 110.0, 0.0),
        ],
    )
    .await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path(format!("/invoices/{}/send", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice_json(id, "SENT", 110.0, 0.0)))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    assert!(view.permitted().can_send);

    view.open_send().unwrap();
    let outcome = view.confirm_send().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(view.invoice().status, InvoiceStatus::Sent);
    let permitted = view.permitted();
    assert!(!permitted.can_edit);
    assert!(!permitted.can_send);
    assert!(permitted.can_cancel);
    assert_eq!(view.flows().send, SendFlow::Idle);
    assert_eq!(view.notice().unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn failed_send_keeps_preview_and_snapshot() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "DRAFT", 110.0, 0.0)]).await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path(format!("/invoices/{}/send", id)))
        .respond_with(ResponseTemplate::new(500).set_body_string("mail server down"))
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    view.open_send().unwrap();
    let outcome = view.confirm_send().await.unwrap();

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    assert!(matches!(view.flows().send, SendFlow::PreviewOpen { error: Some(_) }));
    assert_eq!(view.invoice().status, InvoiceStatus::Draft);
    assert_eq!(view.notice().unwrap().kind, NoticeKind::Error);
}

// ============================================================================
// Record payment
// ============================================================================

async fn pay(view: &mut InvoiceDetailView, amount: rust_decimal::Decimal) -> ActionOutcome {
    view.open_record_payment(today()).unwrap();
    let mut form = view.flows().record_payment.form().unwrap().clone();
    form.amount = amount;
    view.update_payment_form(form).unwrap();
    view.submit_payment().await.unwrap()
}

#[tokio::test]
async fn partial_then_full_payment() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(
        &server,
        id,
        vec![
            invoice_json(id, "SENT", 110.0, 0.0),
            invoice_json(id, "SENT", 110.0, 50.0),
            invoice_json(id, "PAID", 110.0, 110.0),
        ],
    )
    .await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_json(id, 50.0, "2025-02-20")))
        .expect(2)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;

    assert_eq!(pay(&mut view, dec!(50.00)).await, ActionOutcome::Completed);
    assert_eq!(view.invoice().balance_remaining, dec!(60.00));
    assert!(view.permitted().can_record_payment);

    // The form pre-fills the refetched balance.
    view.open_record_payment(today()).unwrap();
    assert_eq!(
        view.flows().record_payment.form().unwrap().amount,
        dec!(60.00)
    );
    view.close(InvoiceAction::RecordPayment);

    assert_eq!(pay(&mut view, dec!(60.00)).await, ActionOutcome::Completed);
    assert_eq!(view.invoice().balance_remaining, dec!(0));
    assert!(!view.permitted().can_record_payment);
    assert!(!view.permitted().can_mark_paid);
}

#[tokio::test]
async fn overpayment_never_reaches_the_backend() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "SENT", 110.0, 50.0)]).await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    view.open_record_payment(today()).unwrap();
    let mut form = view.flows().record_payment.form().unwrap().clone();
    form.amount = dec!(60.01);
    view.update_payment_form(form).unwrap();

    let err = view.submit_payment().await.unwrap_err();
    assert!(matches!(
        err,
        DetailError::Workflow(WorkflowError::AmountExceedsBalance { .. })
    ));
    assert!(matches!(
        view.flows().record_payment,
        RecordPaymentFlow::FormOpen { error: Some(_), .. }
    ));
}

// ============================================================================
// Cancel
// ============================================================================

#[tokio::test]
async fn cancelling_a_draft_skips_the_email_preview() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(
        &server,
        id,
        vec![
            invoice_json(id, "DRAFT", 110.0, 0.0),
            invoice_json(id, "CANCELLED", 110.0, 0.0),
        ],
    )
    .await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path(format!("/invoices/{}/cancel", id)))
        .and(body_json(json!({ "cancellationReason": "Duplicate Invoice" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(invoice_json(id, "CANCELLED", 110.0, 0.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    view.open_cancel().unwrap();
    view.choose_cancel_reason(CancellationReason::DuplicateInvoice, "")
        .unwrap();

    let outcome = view.submit_cancel_reason().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);
    assert!(view.cancellation_notice().is_none());
    assert_eq!(view.invoice().status, InvoiceStatus::Cancelled);
    assert!(!view.permitted().can_cancel);
}

#[tokio::test]
async fn cancelling_a_sent_invoice_previews_the_notification() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(
        &server,
        id,
        vec![
            invoice_json(id, "SENT", 110.0, 0.0),
            invoice_json(id, "CANCELLED", 110.0, 0.0),
        ],
    )
    .await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path(format!("/invoices/{}/cancel", id)))
        .and(body_json(json!({ "cancellationReason": "client closed the project" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(invoice_json(id, "CANCELLED", 110.0, 0.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    view.open_cancel().unwrap();
    view.choose_cancel_reason(CancellationReason::Other, " client closed the project ")
        .unwrap();

    assert_eq!(view.submit_cancel_reason().await.unwrap(), ActionOutcome::Pending);
    let notice = view.cancellation_notice().unwrap();
    assert_eq!(notice.to, "ap@acme.test");
    assert_eq!(notice.reason, "client closed the project");

    assert_eq!(view.confirm_cancel().await.unwrap(), ActionOutcome::Completed);
    assert_eq!(view.flows().cancel, CancelFlow::Idle);
    assert_eq!(view.invoice().status, InvoiceStatus::Cancelled);
}

// ============================================================================
// Reminders
// ============================================================================

#[tokio::test]
async fn reminder_from_detail_view_uses_on_due_date() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "SENT", 110.0, 0.0)]).await;
    Mock::given(method("GET"))
        .and(path(format!("/payments/invoice/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([reminder_json(id, "ON_DUE_DATE")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/preview/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(preview_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/reminders/send"))
        .and(body_json(json!({ "invoiceId": id, "reminderType": "ON_DUE_DATE" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reminder_json(id, "ON_DUE_DATE")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    let outcome = view
        .open_reminder(Some(ReminderType::OnDueDate), today())
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Pending);

    assert_eq!(view.confirm_reminder().await.unwrap(), ActionOutcome::Completed);
    assert_eq!(view.reminders().len(), 1);
}

// ============================================================================
// Session expiry
// ============================================================================

#[tokio::test]
async fn expired_session_during_action_propagates() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    mount_invoice_snapshots(&server, id, vec![invoice_json(id, "SENT", 110.0, 0.0)]).await;
    mount_empty_related(&server, id).await;
    Mock::given(method("POST"))
        .and(path(format!("/invoices/{}/mark-paid", id)))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut view = load(&server, id).await;
    view.open_mark_paid().unwrap();
    let err = view.confirm_mark_paid().await.unwrap_err();

    assert!(matches!(err, DetailError::Client(ClientError::SessionExpired)));
    assert!(!view.flows().is_processing());
}
