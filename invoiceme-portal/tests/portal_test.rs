//! Router tests for the portal against a mocked InvoiceMe backend.
//!
//! Each test drives the router the way a browser would: one cookie session
//! carried across requests.

mod common;

use axum::http::{header, StatusCode};
use common::{invoice_json, json_body, Browser, ADMIN_CREDENTIALS};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_invoice(server: &MockServer, id: Uuid, snapshot: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/invoices/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot))
        .mount(server)
        .await;
}

/// Serve `before` for the first `reads` fetches, then `after`.
async fn mount_invoice_change(
    server: &MockServer,
    id: Uuid,
    before: serde_json::Value,
    reads: u64,
    after: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/invoices/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(before))
        .up_to_n_times(reads)
        .mount(server)
        .await;
    mount_invoice(server, id, after).await;
}

async fn mount_empty_related(server: &MockServer, id: Uuid) {
    Mock::given(method("GET"))
        .and(path(format!("/payments/invoice/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reminders/history/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

// ============================================================================
// Session
// ============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn protected_view_without_session_redirects_to_login() {
        let server = MockServer::start().await;
        let mut browser = Browser::new(common::app(&server.uri()));

        let response = browser.get("/invoices").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_stores_credentials_for_later_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices"))
            .and(header_is("authorization", format!("Basic {}", ADMIN_CREDENTIALS).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut browser = Browser::new(common::app(&server.uri()));
        let response = browser.login("admin", "secret").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/dashboard");

        let status = json_body(browser.get("/session").await).await;
        assert_eq!(status["authenticated"], true);
        assert_eq!(status["user"]["username"], "admin");

        let response = browser.get("/invoices").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_login_is_rejected_before_storing_anything() {
        let server = MockServer::start().await;
        let mut browser = Browser::new(common::app(&server.uri()));

        let response = browser.login("", "secret").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let status = json_body(browser.get("/session").await).await;
        assert_eq!(status["authenticated"], false);
    }

    #[tokio::test]
    async fn rejected_credentials_end_the_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser.get("/invoices").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/login");

        let status = json_body(browser.get("/session").await).await;
        assert_eq!(status["authenticated"], false);
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let server = MockServer::start().await;
        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser.post_empty("/logout").await;
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/login");

        let response = browser.get("/dashboard").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

// ============================================================================
// Invoice workflow
// ============================================================================

mod workflow_tests {
    use super::*;

    #[tokio::test]
    async fn sending_a_draft_locks_editing() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        // open: 1 fetch; confirm: 1 fetch before, 1 refetch after.
        mount_invoice_change(
            &server,
            id,
            invoice_json(id, "DRAFT", 110.0, 0.0),
            2,
            invoice_json(id, "SENT", 110.0, 0.0),
        )
        .await;
        mount_empty_related(&server, id).await;
        Mock::given(method("POST"))
            .and(path(format!("/invoices/{}/send", id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(invoice_json(id, "SENT", 110.0, 0.0)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let opened = json_body(browser.post_empty(&format!("/invoices/{}/send/open", id)).await).await;
        assert_eq!(opened["flows"]["send"]["state"], "preview_open");

        let sent = json_body(browser.post_empty(&format!("/invoices/{}/send/confirm", id)).await).await;
        assert_eq!(sent["outcome"]["result"], "completed");
        assert_eq!(sent["invoice"]["status"], "SENT");
        assert_eq!(sent["permitted"]["canEdit"], false);
        assert_eq!(sent["permitted"]["canSend"], false);
        assert_eq!(sent["permitted"]["canCancel"], true);
        assert_eq!(sent["flows"]["send"]["state"], "idle");
        assert_eq!(sent["notice"]["kind"], "success");
    }

    #[tokio::test]
    async fn confirm_without_open_preview_is_rejected() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "DRAFT", 110.0, 0.0)).await;
        mount_empty_related(&server, id).await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser
            .post_empty(&format!("/invoices/{}/send/confirm", id))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn open_flows_survive_between_requests() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 0.0)).await;
        mount_empty_related(&server, id).await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;
        browser
            .post_empty(&format!("/invoices/{}/mark-paid/open", id))
            .await;

        let detail = json_body(browser.get(&format!("/invoices/{}", id)).await).await;
        assert_eq!(detail["flows"]["markPaid"]["state"], "confirm_open");

        let closed = json_body(
            browser
                .post_empty(&format!("/invoices/{}/mark-paid/close", id))
                .await,
        )
        .await;
        assert_eq!(closed["flows"]["markPaid"]["state"], "idle");
    }

    #[tokio::test]
    async fn cancelling_a_sent_invoice_previews_the_customer_email() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 0.0)).await;
        mount_empty_related(&server, id).await;
        Mock::given(method("POST"))
            .and(path(format!("/invoices/{}/cancel", id)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;
        browser
            .post_empty(&format!("/invoices/{}/cancel/open", id))
            .await;

        let preview = json_body(
            browser
                .post_json(
                    &format!("/invoices/{}/cancel/reason", id),
                    json!({ "reason": "customer_request" }),
                )
                .await,
        )
        .await;

        assert_eq!(preview["outcome"]["result"], "pending");
        assert_eq!(preview["flows"]["cancel"]["state"], "email_preview");
        assert_eq!(preview["cancellationNotice"]["to"], "billing@globex.test");
        assert_eq!(preview["cancellationNotice"]["reason"], "Customer Request");
    }

    #[tokio::test]
    async fn overpayment_keeps_form_open_and_skips_backend() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 50.0)).await;
        mount_empty_related(&server, id).await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;
        browser
            .post_empty(&format!("/invoices/{}/payment/open", id))
            .await;

        let response = browser
            .post_json(
                &format!("/invoices/{}/payment/submit", id),
                json!({ "amount": 75.0, "paymentDate": "2025-02-01", "paymentMethod": "CASH" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let detail = json_body(browser.get(&format!("/invoices/{}", id)).await).await;
        assert_eq!(detail["flows"]["recordPayment"]["state"], "form_open");
        assert!(detail["flows"]["recordPayment"]["error"].is_string());
    }

    #[tokio::test]
    async fn payment_submit_requires_an_open_form() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 50.0)).await;
        mount_empty_related(&server, id).await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser
            .post_json(
                &format!("/invoices/{}/payment/submit", id),
                json!({ "amount": 20.0, "paymentDate": "2025-02-01", "paymentMethod": "CASH" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let detail = json_body(browser.get(&format!("/invoices/{}", id)).await).await;
        assert_eq!(detail["flows"]["recordPayment"]["state"], "idle");
    }

    #[tokio::test]
    async fn double_submitted_payment_reaches_backend_once() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 50.0)).await;
        mount_empty_related(&server, id).await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({
                        "id": Uuid::new_v4(),
                        "invoiceId": id,
                        "paymentAmount": 20.0,
                        "paymentDate": "2025-02-01",
                        "paymentMethod": "CASH"
                    }))
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;
        browser
            .post_empty(&format!("/invoices/{}/payment/open", id))
            .await;
        let mut second_tab = browser.new_tab();

        let uri = format!("/invoices/{}/payment/submit", id);
        let form = json!({ "amount": 20.0, "paymentDate": "2025-02-01", "paymentMethod": "CASH" });
        let (first, second) = tokio::join!(
            browser.post_json(&uri, form.clone()),
            second_tab.post_json(&uri, form.clone()),
        );

        let mut statuses = vec![first.status(), second.status()];
        statuses.sort();
        assert_eq!(statuses[0], StatusCode::OK);
        assert_ne!(statuses[1], StatusCode::OK);
    }

    #[tokio::test]
    async fn failed_detail_load_returns_to_invoice_list() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "SENT", 110.0, 0.0)).await;
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

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser.get(&format!("/invoices/{}", id)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/invoices");
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn failed_reminder_history_still_shows_the_invoice() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_invoice(&server, id, invoice_json(id, "OVERDUE", 110.0, 0.0)).await;
        Mock::given(method("GET"))
            .and(path(format!("/payments/invoice/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/reminders/history/{}", id)))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser.get(&format!("/invoices/{}", id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let detail = json_body(response).await;
        assert_eq!(detail["invoice"]["status"], "OVERDUE");
    }
}

// ============================================================================
// Public payment page and assistant
// ============================================================================

mod public_tests {
    use super::*;

    #[tokio::test]
    async fn payment_link_works_without_sign_in() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/invoices/payment-link/pay-abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(invoice_json(id, "SENT", 110.0, 50.0)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(body_json(json!({
                "invoiceId": id,
                "paymentAmount": 60.0,
                "paymentDate": "2025-02-01",
                "paymentMethod": "BANK_TRANSFER"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": Uuid::new_v4(),
                "invoiceId": id,
                "paymentAmount": 60.0,
                "paymentDate": "2025-02-01",
                "paymentMethod": "BANK_TRANSFER"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut browser = Browser::new(common::app(&server.uri()));

        let page = json_body(browser.get("/public/payment/pay-abc").await).await;
        assert_eq!(page["canPay"], true);
        assert_eq!(page["form"]["amount"], 60.0);

        let response = browser
            .post_json(
                "/public/payment/pay-abc",
                json!({ "amount": 60.0, "paymentDate": "2025-02-01" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let requests = server.received_requests().await.unwrap();
        assert!(requests
            .iter()
            .all(|r| !r.headers.iter().any(|(name, _)| name.as_str() == "authorization")));
    }

    #[tokio::test]
    async fn chat_failure_becomes_an_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/message"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut browser = Browser::signed_in(common::app(&server.uri())).await;

        let response = browser
            .post_json("/chat", json!({ "message": "How much is overdue?" }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let chat = json_body(response).await;
        let messages = chat["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages[2]["content"]
            .as_str()
            .unwrap()
            .starts_with("Sorry"));
    }
}
