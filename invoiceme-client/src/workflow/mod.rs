//! Invoice lifecycle gating and the multi-step action flows.
//!
//! Each flow is a small state machine with pure transitions. Network calls
//! happen outside the machine: callers move a flow into its in-flight state,
//! perform the call, then report the result with `succeed`/`fail`. A result
//! reported when the flow is no longer in flight (the user closed it) is
//! ignored.

pub mod actions;
pub mod cancel;
pub mod detail;
pub mod mark_paid;
pub mod record_payment;
pub mod reminder;
pub mod send;

pub use actions::{InvoiceAction, PermittedActions};
pub use cancel::{CancelFlow, CancelStep, CancellationNotice, CancellationReason};
pub use detail::{ActionOutcome, DetailError, InvoiceDetailView, InvoiceFlows, Notice, NoticeKind};
pub use mark_paid::{MarkPaidFlow, MARK_PAID_WARNING};
pub use record_payment::{PaymentForm, RecordPaymentFlow};
pub use reminder::ReminderFlow;
pub use send::SendFlow;

use crate::models::InvoiceStatus;
use invoiceme_core::error::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} an invoice in status {status}")]
    ActionNotPermitted {
        action: InvoiceAction,
        status: InvoiceStatus,
    },

    #[error("The {flow} flow cannot do that while {state}")]
    InvalidTransition {
        flow: &'static str,
        state: &'static str,
    },

    #[error("An action is already in progress")]
    AlreadyProcessing,

    #[error("Please select a cancellation reason")]
    MissingReason,

    #[error("Please specify the cancellation reason")]
    MissingReasonDetail,

    #[error("Payment amount must be greater than zero")]
    InvalidAmount,

    #[error("Payment amount {amount} exceeds the remaining balance {balance}")]
    AmountExceedsBalance { amount: Decimal, balance: Decimal },
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::AlreadyProcessing | WorkflowError::ActionNotPermitted { .. } => {
                AppError::Conflict(anyhow::anyhow!(err.to_string()))
            }
            _ => AppError::BadRequest(anyhow::anyhow!(err.to_string())),
        }
    }
}

/// Behaviour shared by every action flow.
pub trait Flow {
    /// True while the flow's request is in flight; a second confirm is
    /// rejected with [`WorkflowError::AlreadyProcessing`].
    fn is_processing(&self) -> bool;

    fn is_open(&self) -> bool;

    /// Abandon the flow. Any result still in flight will be ignored.
    fn close(&mut self);
}
