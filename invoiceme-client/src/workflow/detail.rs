//! View-model for a single invoice: the snapshot, its payments and
//! reminders, and the five action flows.
//!
//! The snapshot is only ever replaced by what the backend returns. After any
//! successful action the invoice, payments and reminders are refetched
//! together.

use super::{
    CancelFlow, CancelStep, CancellationNotice, CancellationReason, Flow, InvoiceAction,
    MarkPaidFlow, PaymentForm, PermittedActions, RecordPaymentFlow, ReminderFlow, SendFlow,
    WorkflowError,
};
use crate::error::ClientError;
use crate::gateway::View;
use crate::models::{Invoice, Payment, ReminderHistory, ReminderType};
use crate::resources::Backend;
use chrono::NaiveDate;
use invoiceme_core::error::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// State of every action flow for one invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFlows {
    #[serde(default)]
    pub send: SendFlow,
    #[serde(default)]
    pub cancel: CancelFlow,
    #[serde(default)]
    pub reminder: ReminderFlow,
    #[serde(default)]
    pub mark_paid: MarkPaidFlow,
    #[serde(default)]
    pub record_payment: RecordPaymentFlow,
}

impl InvoiceFlows {
    pub fn is_processing(&self) -> bool {
        self.send.is_processing()
            || self.cancel.is_processing()
            || self.reminder.is_processing()
            || self.mark_paid.is_processing()
            || self.record_payment.is_processing()
    }

    pub fn close(&mut self, action: InvoiceAction) {
        match action {
            InvoiceAction::Send => self.send.close(),
            InvoiceAction::Cancel => self.cancel.close(),
            InvoiceAction::SendReminder => self.reminder.close(),
            InvoiceAction::MarkPaid => self.mark_paid.close(),
            InvoiceAction::RecordPayment => self.record_payment.close(),
            InvoiceAction::Edit => {}
        }
    }

    pub fn close_all(&mut self) {
        *self = InvoiceFlows::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-visible message left by the last action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The flow moved to a step that waits for the user.
    Pending,
    Completed,
    /// The backend rejected the action; the flow is back in its previous step.
    Failed(String),
    /// The result arrived after the flow was closed.
    Ignored,
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<DetailError> for AppError {
    fn from(err: DetailError) -> Self {
        match err {
            DetailError::Workflow(e) => e.into(),
            DetailError::Client(e) => e.into(),
        }
    }
}

pub struct InvoiceDetailView {
    backend: Backend,
    invoice: Invoice,
    payments: Vec<Payment>,
    reminders: Vec<ReminderHistory>,
    flows: InvoiceFlows,
    notice: Option<Notice>,
}

impl InvoiceDetailView {
    /// Fetch invoice, payments and reminder history concurrently. Any failure
    /// fails the whole load; missing reminder history is not a failure.
    #[tracing::instrument(skip(backend))]
    pub async fn load(backend: Backend, invoice_id: Uuid) -> Result<Self, ClientError> {
        let (invoice, payments, reminders) = fetch(&backend, invoice_id).await?;

        Ok(Self {
            backend,
            invoice,
            payments,
            reminders,
            flows: InvoiceFlows::default(),
            notice: None,
        })
    }

    /// Resume flows saved from an earlier request.
    pub fn with_flows(mut self, flows: InvoiceFlows) -> Self {
        self.flows = flows;
        self
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn reminders(&self) -> &[ReminderHistory] {
        &self.reminders
    }

    pub fn flows(&self) -> &InvoiceFlows {
        &self.flows
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn permitted(&self) -> PermittedActions {
        PermittedActions::for_invoice(&self.invoice)
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let (invoice, payments, reminders) = fetch(&self.backend, self.invoice.id).await?;
        self.invoice = invoice;
        self.payments = payments;
        self.reminders = reminders;
        Ok(())
    }

    pub fn close(&mut self, action: InvoiceAction) {
        self.flows.close(action);
    }

    // Send

    pub fn open_send(&mut self) -> Result<(), WorkflowError> {
        self.notice = None;
        self.flows.send.open(&self.invoice)
    }

    pub fn edit_from_send_preview(&mut self) -> Result<View, WorkflowError> {
        self.flows.send.edit_from_preview(&self.invoice)
    }

    pub async fn confirm_send(&mut self) -> Result<ActionOutcome, DetailError> {
        self.flows.send.confirm()?;
        let result = self.backend.invoices.send(self.invoice.id).await.map(drop);
        self.settle(result, "Invoice sent successfully", |flows, error| match error {
            None => flows.send.succeed(),
            Some(message) => flows.send.fail(message),
        })
        .await
    }

    // Cancel

    pub fn open_cancel(&mut self) -> Result<(), WorkflowError> {
        self.notice = None;
        self.flows.cancel.open(&self.invoice)
    }

    pub fn choose_cancel_reason(
        &mut self,
        reason: CancellationReason,
        detail: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.flows.cancel.choose_reason(reason, detail)
    }

    /// Submit the reason. Sent invoices stop at the email preview; drafts
    /// are cancelled right away.
    pub async fn submit_cancel_reason(&mut self) -> Result<ActionOutcome, DetailError> {
        match self.flows.cancel.submit_reason(&self.invoice)? {
            CancelStep::PreviewEmail => Ok(ActionOutcome::Pending),
            CancelStep::Submit { reason } => self.perform_cancel(reason).await,
        }
    }

    /// The customer notification, while the email preview is showing.
    pub fn cancellation_notice(&self) -> Option<CancellationNotice> {
        match &self.flows.cancel {
            CancelFlow::EmailPreview { .. } => self
                .flows
                .cancel
                .reason_text()
                .map(|reason| CancellationNotice::for_invoice(&self.invoice, &reason)),
            _ => None,
        }
    }

    pub fn back_to_cancel_reason(&mut self) -> Result<(), WorkflowError> {
        self.flows.cancel.back_to_reason()
    }

    pub async fn confirm_cancel(&mut self) -> Result<ActionOutcome, DetailError> {
        let reason = self.flows.cancel.confirm()?;
        self.perform_cancel(reason).await
    }

    async fn perform_cancel(&mut self, reason: String) -> Result<ActionOutcome, DetailError> {
        let result = self
            .backend
            .invoices
            .cancel(self.invoice.id, &reason)
            .await
            .map(drop);
        self.settle(result, "Invoice cancelled successfully", |flows, error| match error {
            None => flows.cancel.succeed(),
            Some(message) => flows.cancel.fail(message),
        })
        .await
    }

    // Reminder

    /// Open the reminder flow and fetch the preview for the chosen type.
    pub async fn open_reminder(
        &mut self,
        reminder_type: Option<ReminderType>,
        today: NaiveDate,
    ) -> Result<ActionOutcome, DetailError> {
        self.notice = None;
        let chosen = self.flows.reminder.open(&self.invoice, reminder_type, today)?;
        self.load_reminder_preview(chosen).await
    }

    pub async fn select_reminder_type(
        &mut self,
        reminder_type: ReminderType,
    ) -> Result<ActionOutcome, DetailError> {
        self.flows.reminder.select_type(reminder_type)?;
        self.load_reminder_preview(reminder_type).await
    }

    async fn load_reminder_preview(
        &mut self,
        reminder_type: ReminderType,
    ) -> Result<ActionOutcome, DetailError> {
        match self
            .backend
            .reminders
            .preview(self.invoice.id, reminder_type)
            .await
        {
            Ok(preview) => {
                self.flows.reminder.preview_loaded(reminder_type, preview);
                Ok(ActionOutcome::Pending)
            }
            Err(ClientError::SessionExpired) => Err(ClientError::SessionExpired.into()),
            Err(e) => {
                tracing::warn!(
                    invoice_id = %self.invoice.id,
                    error = %e,
                    "Failed to load reminder preview"
                );
                let message = e.to_string();
                self.flows.reminder.preview_failed(reminder_type, message.clone());
                Ok(ActionOutcome::Failed(message))
            }
        }
    }

    pub async fn confirm_reminder(&mut self) -> Result<ActionOutcome, DetailError> {
        let reminder_type = self.flows.reminder.confirm()?;
        let result = self
            .backend
            .reminders
            .send(self.invoice.id, reminder_type)
            .await
            .map(drop);
        self.settle(result, "Reminder sent successfully", |flows, error| match error {
            None => flows.reminder.succeed(),
            Some(message) => flows.reminder.fail(message),
        })
        .await
    }

    // Mark as paid

    pub fn open_mark_paid(&mut self) -> Result<(), WorkflowError> {
        self.notice = None;
        self.flows.mark_paid.open(&self.invoice)
    }

    pub async fn confirm_mark_paid(&mut self) -> Result<ActionOutcome, DetailError> {
        self.flows.mark_paid.confirm()?;
        let result = self
            .backend
            .invoices
            .mark_paid(self.invoice.id)
            .await
            .map(drop);
        self.settle(result, "Invoice marked as paid", |flows, error| match error {
            None => flows.mark_paid.succeed(),
            Some(message) => flows.mark_paid.fail(message),
        })
        .await
    }

    // Record payment

    pub fn open_record_payment(&mut self, today: NaiveDate) -> Result<(), WorkflowError> {
        self.notice = None;
        self.flows.record_payment.open(&self.invoice, today)
    }

    pub fn update_payment_form(&mut self, form: PaymentForm) -> Result<(), WorkflowError> {
        self.flows.record_payment.update(form)
    }

    pub async fn submit_payment(&mut self) -> Result<ActionOutcome, DetailError> {
        let request = self.flows.record_payment.submit(&self.invoice)?;
        let result = self.backend.payments.record(&request).await.map(drop);
        self.settle(result, "Payment recorded successfully", |flows, error| match error {
            None => flows.record_payment.succeed(),
            Some(message) => flows.record_payment.fail(message),
        })
        .await
    }

    /// Apply an action's result to its flow, then refetch on success.
    /// Session expiry propagates so the caller can route to login.
    async fn settle<F>(
        &mut self,
        result: Result<(), ClientError>,
        success_message: &str,
        settle_flow: F,
    ) -> Result<ActionOutcome, DetailError>
    where
        F: FnOnce(&mut InvoiceFlows, Option<String>) -> bool,
    {
        match result {
            Ok(()) => {
                let applied = settle_flow(&mut self.flows, None);
                if applied {
                    self.notice = Some(Notice::success(success_message));
                }
                self.refresh_after_action().await?;
                Ok(if applied {
                    ActionOutcome::Completed
                } else {
                    ActionOutcome::Ignored
                })
            }
            Err(ClientError::SessionExpired) => {
                self.flows.close_all();
                Err(ClientError::SessionExpired.into())
            }
            Err(e) => {
                tracing::warn!(invoice_id = %self.invoice.id, error = %e, "Invoice action failed");
                let message = e.to_string();
                if !settle_flow(&mut self.flows, Some(message.clone())) {
                    return Ok(ActionOutcome::Ignored);
                }
                self.notice = Some(Notice::error(message.clone()));
                Ok(ActionOutcome::Failed(message))
            }
        }
    }

    async fn refresh_after_action(&mut self) -> Result<(), ClientError> {
        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(ClientError::SessionExpired) => Err(ClientError::SessionExpired),
            Err(e) => {
                tracing::warn!(invoice_id = %self.invoice.id, error = %e, "Refetch after action failed");
                self.notice = Some(Notice::error(format!(
                    "The action succeeded but the invoice could not be reloaded: {}",
                    e
                )));
                Ok(())
            }
        }
    }
}

async fn fetch(
    backend: &Backend,
    invoice_id: Uuid,
) -> Result<(Invoice, Vec<Payment>, Vec<ReminderHistory>), ClientError> {
    tokio::try_join!(
        backend.invoices.get(invoice_id),
        backend.payments.list_by_invoice(invoice_id),
        backend.reminders.history(invoice_id),
    )
}
