//! Record payment: a pre-filled form checked against the current balance
//! before submission.

use super::{Flow, InvoiceAction, PermittedActions, WorkflowError};
use crate::models::{Invoice, PaymentMethod, RecordPaymentRequest};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentForm {
    /// Form pre-filled to settle the whole remaining balance today.
    pub fn for_invoice(invoice: &Invoice, today: NaiveDate) -> Self {
        Self {
            amount: invoice.balance_remaining,
            payment_date: today,
            payment_method: PaymentMethod::default(),
            transaction_reference: None,
            notes: None,
        }
    }

    fn to_request(&self, invoice_id: uuid::Uuid) -> RecordPaymentRequest {
        RecordPaymentRequest {
            invoice_id,
            payment_amount: self.amount,
            payment_date: self.payment_date,
            payment_method: self.payment_method,
            transaction_reference: non_blank(&self.transaction_reference),
            notes: non_blank(&self.notes),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Record payment: fill the form, then submit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordPaymentFlow {
    #[default]
    Idle,
    FormOpen {
        form: PaymentForm,
        error: Option<String>,
    },
    Submitting {
        form: PaymentForm,
    },
}

impl RecordPaymentFlow {
    pub fn open(&mut self, invoice: &Invoice, today: NaiveDate) -> Result<(), WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::AlreadyProcessing);
        }
        PermittedActions::require(invoice, InvoiceAction::RecordPayment)?;
        *self = RecordPaymentFlow::FormOpen {
            form: PaymentForm::for_invoice(invoice, today),
            error: None,
        };
        Ok(())
    }

    pub fn update(&mut self, updated: PaymentForm) -> Result<(), WorkflowError> {
        match self {
            RecordPaymentFlow::FormOpen { form, error } => {
                *form = updated;
                *error = None;
                Ok(())
            }
            RecordPaymentFlow::Submitting { .. } => Err(WorkflowError::AlreadyProcessing),
            RecordPaymentFlow::Idle => Err(invalid("idle")),
        }
    }

    /// Validate the form against `invoice`, the snapshot current at
    /// submission time, and build the request. A rejected form stays open
    /// with the reason attached.
    pub fn submit(&mut self, invoice: &Invoice) -> Result<RecordPaymentRequest, WorkflowError> {
        let RecordPaymentFlow::FormOpen { form, error } = self else {
            return Err(match self {
                RecordPaymentFlow::Submitting { .. } => WorkflowError::AlreadyProcessing,
                _ => invalid("idle"),
            });
        };

        if let Err(e) = validate_amount(form.amount, invoice) {
            *error = Some(e.to_string());
            return Err(e);
        }

        let request = form.to_request(invoice.id);
        *self = RecordPaymentFlow::Submitting { form: form.clone() };
        Ok(request)
    }

    pub fn succeed(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = RecordPaymentFlow::Idle;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        let RecordPaymentFlow::Submitting { form } = self else {
            return false;
        };
        *self = RecordPaymentFlow::FormOpen {
            form: form.clone(),
            error: Some(message.into()),
        };
        true
    }

    pub fn form(&self) -> Option<&PaymentForm> {
        match self {
            RecordPaymentFlow::FormOpen { form, .. } | RecordPaymentFlow::Submitting { form } => {
                Some(form)
            }
            RecordPaymentFlow::Idle => None,
        }
    }
}

fn validate_amount(amount: Decimal, invoice: &Invoice) -> Result<(), WorkflowError> {
    PermittedActions::require(invoice, InvoiceAction::RecordPayment)?;
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::InvalidAmount);
    }
    if amount > invoice.balance_remaining {
        return Err(WorkflowError::AmountExceedsBalance {
            amount,
            balance: invoice.balance_remaining,
        });
    }
    Ok(())
}

fn invalid(state: &'static str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        flow: "record payment",
        state,
    }
}

impl Flow for RecordPaymentFlow {
    fn is_processing(&self) -> bool {
        matches!(self, RecordPaymentFlow::Submitting { .. })
    }

    fn is_open(&self) -> bool {
        !matches!(self, RecordPaymentFlow::Idle)
    }

    fn close(&mut self) {
        *self = RecordPaymentFlow::Idle;
    }
}
