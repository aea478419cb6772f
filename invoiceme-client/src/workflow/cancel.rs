//! Cancel invoice: capture a reason, preview the customer notification for
//! sent invoices, then cancel.
//!
//! Drafts were never seen by the customer, so they skip the email preview.

use super::{Flow, InvoiceAction, PermittedActions, WorkflowError};
use crate::models::{Invoice, InvoiceStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender shown on the cancellation notice.
pub const BILLING_EMAIL: &str = "billing@invoiceme.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    CustomerRequest,
    BillingError,
    DuplicateInvoice,
    ServiceNotProvided,
    PricingError,
    Other,
}

impl CancellationReason {
    pub const ALL: [CancellationReason; 6] = [
        CancellationReason::CustomerRequest,
        CancellationReason::BillingError,
        CancellationReason::DuplicateInvoice,
        CancellationReason::ServiceNotProvided,
        CancellationReason::PricingError,
        CancellationReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CancellationReason::CustomerRequest => "customer_request",
            CancellationReason::BillingError => "billing_error",
            CancellationReason::DuplicateInvoice => "duplicate_invoice",
            CancellationReason::ServiceNotProvided => "service_not_provided",
            CancellationReason::PricingError => "pricing_error",
            CancellationReason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CancellationReason::CustomerRequest => "Customer Request",
            CancellationReason::BillingError => "Billing Error",
            CancellationReason::DuplicateInvoice => "Duplicate Invoice",
            CancellationReason::ServiceNotProvided => "Service Not Provided",
            CancellationReason::PricingError => "Pricing Error",
            CancellationReason::Other => "Other",
        }
    }

    /// Text sent to the backend: the label, or the trimmed free text for
    /// [`CancellationReason::Other`].
    pub fn reason_text(&self, detail: &str) -> Result<String, WorkflowError> {
        match self {
            CancellationReason::Other => {
                let detail = detail.trim();
                if detail.is_empty() {
                    Err(WorkflowError::MissingReasonDetail)
                } else {
                    Ok(detail.to_string())
                }
            }
            other => Ok(other.label().to_string()),
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the caller should do after the reason is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelStep {
    /// Sent invoice: show [`CancellationNotice`] and wait for confirmation.
    PreviewEmail,
    /// Draft invoice: cancel now with this reason text.
    Submit { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CancelFlow {
    #[default]
    Idle,
    ReasonCapture {
        reason: Option<CancellationReason>,
        detail: String,
        error: Option<String>,
    },
    EmailPreview {
        reason: CancellationReason,
        detail: String,
        error: Option<String>,
    },
    Cancelling {
        reason: CancellationReason,
        detail: String,
        from_preview: bool,
    },
}

impl CancelFlow {
    pub fn open(&mut self, invoice: &Invoice) -> Result<(), WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::AlreadyProcessing);
        }
        PermittedActions::require(invoice, InvoiceAction::Cancel)?;
        *self = CancelFlow::ReasonCapture {
            reason: None,
            detail: String::new(),
            error: None,
        };
        Ok(())
    }

    /// Record the chosen reason. Free text is dropped unless the reason is
    /// [`CancellationReason::Other`].
    pub fn choose_reason(
        &mut self,
        reason: CancellationReason,
        detail: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        match self {
            CancelFlow::ReasonCapture {
                reason: current,
                detail: current_detail,
                error,
            } => {
                *current = Some(reason);
                *current_detail = if reason == CancellationReason::Other {
                    detail.into()
                } else {
                    String::new()
                };
                *error = None;
                Ok(())
            }
            _ => Err(self.invalid()),
        }
    }

    /// Validate the reason and advance. Validation failures stay in reason
    /// capture with the message attached.
    pub fn submit_reason(&mut self, invoice: &Invoice) -> Result<CancelStep, WorkflowError> {
        let CancelFlow::ReasonCapture { reason, detail, error } = self else {
            return Err(self.invalid());
        };

        let validated = reason
            .ok_or(WorkflowError::MissingReason)
            .and_then(|r| r.reason_text(detail).map(|text| (r, text)));
        let (chosen, text) = match validated {
            Ok(ok) => ok,
            Err(e) => {
                *error = Some(e.to_string());
                return Err(e);
            }
        };
        if let Err(e) = PermittedActions::require(invoice, InvoiceAction::Cancel) {
            *error = Some(e.to_string());
            return Err(e);
        }

        let detail = std::mem::take(detail);
        if invoice.status == InvoiceStatus::Sent {
            *self = CancelFlow::EmailPreview {
                reason: chosen,
                detail,
                error: None,
            };
            Ok(CancelStep::PreviewEmail)
        } else {
            *self = CancelFlow::Cancelling {
                reason: chosen,
                detail,
                from_preview: false,
            };
            Ok(CancelStep::Submit { reason: text })
        }
    }

    /// From the email preview back to reason capture, keeping the choice.
    pub fn back_to_reason(&mut self) -> Result<(), WorkflowError> {
        match self {
            CancelFlow::EmailPreview { reason, detail, .. } => {
                *self = CancelFlow::ReasonCapture {
                    reason: Some(*reason),
                    detail: std::mem::take(detail),
                    error: None,
                };
                Ok(())
            }
            _ => Err(self.invalid()),
        }
    }

    /// Confirm from the email preview; returns the reason text to send.
    pub fn confirm(&mut self) -> Result<String, WorkflowError> {
        match self {
            CancelFlow::EmailPreview { reason, detail, .. } => {
                let text = reason.reason_text(detail)?;
                *self = CancelFlow::Cancelling {
                    reason: *reason,
                    detail: std::mem::take(detail),
                    from_preview: true,
                };
                Ok(text)
            }
            CancelFlow::Cancelling { .. } => Err(WorkflowError::AlreadyProcessing),
            _ => Err(self.invalid()),
        }
    }

    pub fn succeed(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = CancelFlow::Idle;
        true
    }

    /// Back to the step that started the request.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        let CancelFlow::Cancelling {
            reason,
            detail,
            from_preview,
        } = self
        else {
            return false;
        };

        let reason = *reason;
        let detail = std::mem::take(detail);
        let error = Some(message.into());
        *self = if *from_preview {
            CancelFlow::EmailPreview {
                reason,
                detail,
                error,
            }
        } else {
            CancelFlow::ReasonCapture {
                reason: Some(reason),
                detail,
                error,
            }
        };
        true
    }

    /// Reason text of the current selection, when it is valid.
    pub fn reason_text(&self) -> Option<String> {
        match self {
            CancelFlow::ReasonCapture {
                reason: Some(reason),
                detail,
                ..
            }
            | CancelFlow::EmailPreview { reason, detail, .. }
            | CancelFlow::Cancelling { reason, detail, .. } => reason.reason_text(detail).ok(),
            _ => None,
        }
    }

    fn invalid(&self) -> WorkflowError {
        WorkflowError::InvalidTransition {
            flow: "cancel",
            state: match self {
                CancelFlow::Idle => "idle",
                CancelFlow::ReasonCapture { .. } => "choosing a reason",
                CancelFlow::EmailPreview { .. } => "previewing the email",
                CancelFlow::Cancelling { .. } => "cancelling",
            },
        }
    }
}

impl Flow for CancelFlow {
    fn is_processing(&self) -> bool {
        matches!(self, CancelFlow::Cancelling { .. })
    }

    fn is_open(&self) -> bool {
        !matches!(self, CancelFlow::Idle)
    }

    fn close(&mut self) {
        *self = CancelFlow::Idle;
    }
}

/// The notification a customer receives when a sent invoice is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationNotice {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub reason: String,
    pub body: Vec<String>,
}

impl CancellationNotice {
    pub fn for_invoice(invoice: &Invoice, reason: &str) -> Self {
        Self {
            from: BILLING_EMAIL.to_string(),
            to: invoice.customer_email.clone(),
            subject: format!("Invoice #{} has been cancelled", invoice.invoice_number),
            invoice_number: invoice.invoice_number.clone(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            total_amount: invoice.total_amount,
            reason: reason.to_string(),
            body: vec![
                format!("Dear {},", invoice.customer_name),
                format!(
                    "We are writing to inform you that Invoice #{} has been cancelled.",
                    invoice.invoice_number
                ),
                "You are no longer required to pay this invoice.".to_string(),
                "Any payment links associated with this invoice have been deactivated."
                    .to_string(),
                "This cancellation is final and cannot be reversed.".to_string(),
                format!(
                    "If you have any questions about this cancellation, please contact us at {}.",
                    BILLING_EMAIL
                ),
            ],
        }
    }
}
