//! In-process stand-in for the InvoiceMe backend.
//!
//! Unlike a canned mock, the fake keeps a ledger: sending, cancelling,
//! marking paid and recording payments change the invoices that later reads
//! return, so a client can be driven through a whole lifecycle.

use chrono::{NaiveDate, Utc};
use invoiceme_client::models::{
    CancelInvoiceRequest, Invoice, InvoiceStatus, LineItem, OverdueInvoiceSummary, Payment,
    RecordPaymentRequest, ReminderHistory, ReminderPreview, ReminderType, SendReminderRequest,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use wiremock::matchers::{any, header};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// A cancellation as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub invoice_id: Uuid,
    pub reason: String,
    /// The customer was emailed; only invoices that had been sent.
    pub customer_notified: bool,
}

#[derive(Debug)]
struct Ledger {
    today: NaiveDate,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    reminders: Vec<ReminderHistory>,
    cancellations: Vec<Cancellation>,
    revoked: bool,
}

fn json<T: Serialize>(status: u16, body: &T) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

fn rejected(status: u16, message: &str) -> ResponseTemplate {
    json(status, &serde_json::json!({ "message": message }))
}

impl Ledger {
    fn position(&self, id: &str) -> Option<usize> {
        let id = Uuid::parse_str(id).ok()?;
        self.invoices.iter().position(|inv| inv.id == id)
    }

    fn route(&mut self, method: &str, segments: &[&str], request: &Request) -> ResponseTemplate {
        match (method, segments) {
            ("GET", ["invoices"]) => json(200, &self.invoices),
            ("GET", ["invoices", "payment-link", link]) => self
                .invoices
                .iter()
                .find(|inv| inv.payment_link.as_deref() == Some(*link))
                .map_or_else(|| rejected(404, "Unknown payment link"), |inv| json(200, inv)),
            ("GET", ["invoices", id]) => match self.position(id) {
                Some(i) => json(200, &self.invoices[i]),
                None => rejected(404, "Invoice not found"),
            },
            ("POST", ["invoices", id, "send"]) => self.send(id),
            ("POST", ["invoices", id, "mark-paid"]) => self.mark_paid(id),
            ("POST", ["invoices", id, "cancel"]) => self.cancel(id, &request.body),
            ("GET", ["payments"]) => json(200, &self.payments),
            ("POST", ["payments"]) => self.record_payment(&request.body),
            ("GET", ["payments", "invoice", id]) => {
                let id = Uuid::parse_str(id).unwrap_or_default();
                let payments: Vec<&Payment> =
                    self.payments.iter().filter(|p| p.invoice_id == id).collect();
                json(200, &payments)
            }
            ("GET", ["reminders", "history", id]) => {
                let id = Uuid::parse_str(id).unwrap_or_default();
                let sent: Vec<&ReminderHistory> =
                    self.reminders.iter().filter(|r| r.invoice_id == id).collect();
                json(200, &sent)
            }
            ("GET", ["reminders", "preview", id]) => {
                let reminder_type = request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "type")
                    .and_then(|(_, value)| {
                        serde_json::from_value::<ReminderType>(serde_json::Value::String(
                            value.into_owned(),
                        ))
                        .ok()
                    });
                match (self.position(id), reminder_type) {
                    (Some(i), Some(reminder_type)) => {
                        json(200, &preview(&self.invoices[i], reminder_type))
                    }
                    (None, _) => rejected(404, "Invoice not found"),
                    (_, None) => rejected(400, "Unknown reminder type"),
                }
            }
            ("POST", ["reminders", "send"]) => self.send_reminder(&request.body),
            ("GET", ["reminders", "overdue"]) => json(200, &self.overdue()),
            _ => rejected(404, "No such endpoint"),
        }
    }

    fn send(&mut self, id: &str) -> ResponseTemplate {
        let Some(i) = self.position(id) else {
            return rejected(404, "Invoice not found");
        };
        let invoice = &mut self.invoices[i];
        if invoice.status != InvoiceStatus::Draft {
            return rejected(409, "Only draft invoices can be sent");
        }
        invoice.status = InvoiceStatus::Sent;
        json(200, &*invoice)
    }

    fn mark_paid(&mut self, id: &str) -> ResponseTemplate {
        let Some(i) = self.position(id) else {
            return rejected(404, "Invoice not found");
        };
        let invoice = &mut self.invoices[i];
        if invoice.status != InvoiceStatus::Sent {
            return rejected(409, "Only sent invoices can be marked as paid");
        }
        invoice.amount_paid = invoice.total_amount;
        invoice.balance_remaining = Decimal::ZERO;
        invoice.status = InvoiceStatus::Paid;
        json(200, &*invoice)
    }

    fn cancel(&mut self, id: &str, body: &[u8]) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<CancelInvoiceRequest>(body) else {
            return rejected(400, "cancellationReason is required");
        };
        let Some(i) = self.position(id) else {
            return rejected(404, "Invoice not found");
        };
        let invoice = &mut self.invoices[i];
        let customer_notified = match invoice.status {
            InvoiceStatus::Draft => false,
            InvoiceStatus::Sent => true,
            _ => return rejected(409, "Invoice can no longer be cancelled"),
        };
        invoice.status = InvoiceStatus::Cancelled;
        self.cancellations.push(Cancellation {
            invoice_id: invoice.id,
            reason: body.cancellation_reason,
            customer_notified,
        });
        json(200, &*invoice)
    }

    fn record_payment(&mut self, body: &[u8]) -> ResponseTemplate {
        let Ok(request) = serde_json::from_slice::<RecordPaymentRequest>(body) else {
            return rejected(400, "Malformed payment");
        };
        let Some(i) = self.position(&request.invoice_id.to_string()) else {
            return rejected(404, "Invoice not found");
        };
        let invoice = &mut self.invoices[i];
        if invoice.status != InvoiceStatus::Sent {
            return rejected(409, "Payments are only accepted for sent invoices");
        }
        if request.payment_amount <= Decimal::ZERO
            || request.payment_amount > invoice.balance_remaining
        {
            return rejected(400, "Payment amount exceeds the remaining balance");
        }

        invoice.amount_paid += request.payment_amount;
        invoice.balance_remaining = invoice.total_amount - invoice.amount_paid;
        if invoice.balance_remaining.is_zero() {
            invoice.status = InvoiceStatus::Paid;
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            invoice_id: invoice.id,
            invoice_number: Some(invoice.invoice_number.clone()),
            payment_amount: request.payment_amount,
            payment_date: request.payment_date,
            payment_method: request.payment_method,
            transaction_reference: request.transaction_reference,
            notes: request.notes,
            created_at: Some(Utc::now().naive_utc()),
        };
        self.payments.push(payment.clone());
        json(201, &payment)
    }

    fn send_reminder(&mut self, body: &[u8]) -> ResponseTemplate {
        let Ok(request) = serde_json::from_slice::<SendReminderRequest>(body) else {
            return rejected(400, "Malformed reminder");
        };
        let Some(i) = self.position(&request.invoice_id.to_string()) else {
            return rejected(404, "Invoice not found");
        };
        let preview = preview(&self.invoices[i], request.reminder_type);
        let sent = ReminderHistory {
            id: Uuid::new_v4(),
            invoice_id: request.invoice_id,
            invoice_number: preview.invoice_number,
            reminder_type: request.reminder_type,
            sent_date: Some(Utc::now().naive_utc()),
            recipient_email: preview.recipient_email,
            subject: preview.subject,
            message: preview.message,
        };
        self.reminders.push(sent.clone());
        json(200, &sent)
    }

    fn overdue(&self) -> Vec<OverdueInvoiceSummary> {
        self.invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Sent && inv.due_date < self.today)
            .map(|inv| OverdueInvoiceSummary {
                invoice_id: inv.id,
                invoice_number: inv.invoice_number.clone(),
                customer_name: inv.customer_name.clone(),
                due_date: inv.due_date,
                total_amount: inv.total_amount,
                balance_remaining: inv.balance_remaining,
                days_overdue: inv.days_overdue(self.today),
            })
            .collect()
    }
}

fn preview(invoice: &Invoice, reminder_type: ReminderType) -> ReminderPreview {
    ReminderPreview {
        subject: format!(
            "Reminder: Invoice {} ({})",
            invoice.invoice_number,
            reminder_type.as_str()
        ),
        message: format!(
            "Dear {}, invoice {} has a balance of {}.",
            invoice.customer_name, invoice.invoice_number, invoice.balance_remaining
        ),
        recipient_email: invoice.customer_email.clone(),
        invoice_number: Some(invoice.invoice_number.clone()),
    }
}

/// Answers every request for one credential state.
struct Responder {
    ledger: Arc<Mutex<Ledger>>,
    authenticated: bool,
}

impl Respond for Responder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.to_string();
        let path = request.url.path().to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let Ok(mut ledger) = self.ledger.lock() else {
            return rejected(500, "Ledger poisoned");
        };

        let public = matches!(
            (method.as_str(), segments.as_slice()),
            ("GET", ["invoices", "payment-link", _]) | ("POST", ["payments"])
        );
        if !public && (!self.authenticated || ledger.revoked) {
            return ResponseTemplate::new(401);
        }

        ledger.route(&method, &segments, request)
    }
}

pub struct FakeBackend {
    server: MockServer,
    ledger: Arc<Mutex<Ledger>>,
}

impl FakeBackend {
    /// Start a backend that accepts exactly `username`/`password`.
    pub async fn start(username: &str, password: &str, today: NaiveDate) -> Self {
        let server = MockServer::start().await;
        let ledger = Arc::new(Mutex::new(Ledger {
            today,
            invoices: Vec::new(),
            payments: Vec::new(),
            reminders: Vec::new(),
            cancellations: Vec::new(),
            revoked: false,
        }));

        // Mount order decides: matching credentials first, everything else after.
        Mock::given(header(
            "authorization",
            format!("Basic {}", basic_credentials(username, password)).as_str(),
        ))
        .respond_with(Responder {
            ledger: ledger.clone(),
            authenticated: true,
        })
        .mount(&server)
        .await;
        Mock::given(any())
            .respond_with(Responder {
                ledger: ledger.clone(),
                authenticated: false,
            })
            .mount(&server)
            .await;

        Self { server, ledger }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        match self.ledger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add an invoice of `subtotal` plus `tax`, due on `due_date`.
    pub fn seed_invoice(
        &self,
        status: InvoiceStatus,
        subtotal: Decimal,
        tax: Decimal,
        due_date: NaiveDate,
    ) -> Invoice {
        let mut ledger = self.ledger();
        let id = Uuid::new_v4();
        let number = format!("INV-{:04}", 1001 + ledger.invoices.len());
        let total = subtotal + tax;

        let invoice = Invoice {
            id,
            invoice_number: number,
            customer_id: Uuid::new_v4(),
            customer_name: "Initech".to_string(),
            customer_email: "accounts@initech.test".to_string(),
            issue_date: due_date - chrono::Duration::days(30),
            due_date,
            status,
            subtotal,
            tax_amount: tax,
            total_amount: total,
            amount_paid: Decimal::ZERO,
            balance_remaining: total,
            allows_partial_payment: true,
            payment_link: Some(format!("pay-{}", id.simple())),
            line_items: vec![LineItem {
                id: Uuid::new_v4(),
                description: "Consulting".to_string(),
                quantity: Decimal::ONE,
                unit_price: subtotal,
                line_total: subtotal,
            }],
            notes: None,
            terms: Some("Net 30".to_string()),
        };
        ledger.invoices.push(invoice.clone());
        invoice
    }

    pub fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.ledger().invoices.iter().find(|inv| inv.id == id).cloned()
    }

    pub fn payments_for(&self, id: Uuid) -> Vec<Payment> {
        self.ledger()
            .payments
            .iter()
            .filter(|p| p.invoice_id == id)
            .cloned()
            .collect()
    }

    pub fn reminders_for(&self, id: Uuid) -> Vec<ReminderHistory> {
        self.ledger()
            .reminders
            .iter()
            .filter(|r| r.invoice_id == id)
            .cloned()
            .collect()
    }

    pub fn cancellations(&self) -> Vec<Cancellation> {
        self.ledger().cancellations.clone()
    }

    /// Reject every authenticated call from now on, as if the password changed.
    pub fn revoke_credentials(&self) {
        self.ledger().revoked = true;
    }

    /// Requests whose path starts with `prefix`.
    pub async fn requests_to(&self, method: &str, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.to_string() == method && r.url.path().starts_with(prefix))
            .count()
    }
}

fn basic_credentials(username: &str, password: &str) -> String {
    use base64::{engine::general_purpose, Engine as _};
    general_purpose::STANDARD.encode(format!("{}:{}", username, password))
}
