//! Which lifecycle actions an invoice admits.
//!
//! Gating is always computed from the snapshot at hand and never cached, so
//! a refetched invoice immediately changes what the user is offered.

use super::WorkflowError;
use crate::models::{Invoice, InvoiceStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceAction {
    Edit,
    Send,
    RecordPayment,
    SendReminder,
    MarkPaid,
    Cancel,
}

impl InvoiceAction {
    pub const ALL: [InvoiceAction; 6] = [
        InvoiceAction::Edit,
        InvoiceAction::Send,
        InvoiceAction::RecordPayment,
        InvoiceAction::SendReminder,
        InvoiceAction::MarkPaid,
        InvoiceAction::Cancel,
    ];

    /// Actions that only make sense while money is still owed.
    fn needs_outstanding_balance(&self) -> bool {
        matches!(self, InvoiceAction::RecordPayment | InvoiceAction::MarkPaid)
    }
}

impl fmt::Display for InvoiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceAction::Edit => "edit",
            InvoiceAction::Send => "send",
            InvoiceAction::RecordPayment => "record payment",
            InvoiceAction::SendReminder => "send reminder",
            InvoiceAction::MarkPaid => "mark as paid",
            InvoiceAction::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

impl InvoiceStatus {
    /// Status the invoice ends up in after `action`, or `None` when the
    /// action is not legal from this status.
    ///
    /// Record payment stays in SENT here; settling the full balance moves
    /// the invoice to PAID server-side.
    pub fn transition(&self, action: InvoiceAction) -> Option<InvoiceStatus> {
        use InvoiceAction as A;
        use InvoiceStatus as S;

        match (self, action) {
            (S::Draft, A::Edit) => Some(S::Draft),
            (S::Draft, A::Send) => Some(S::Sent),
            (S::Sent, A::RecordPayment) => Some(S::Sent),
            (S::Sent, A::SendReminder) => Some(S::Sent),
            (S::Sent, A::MarkPaid) => Some(S::Paid),
            (S::Draft | S::Sent, A::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }
}

/// Flags for every lifecycle action, derived from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermittedActions {
    pub can_edit: bool,
    pub can_send: bool,
    pub can_record_payment: bool,
    pub can_send_reminder: bool,
    pub can_mark_paid: bool,
    pub can_cancel: bool,
}

impl PermittedActions {
    pub fn for_invoice(invoice: &Invoice) -> Self {
        let allowed = |action| is_allowed(invoice.status, invoice.balance_remaining, action);

        Self {
            can_edit: allowed(InvoiceAction::Edit),
            can_send: allowed(InvoiceAction::Send),
            can_record_payment: allowed(InvoiceAction::RecordPayment),
            can_send_reminder: allowed(InvoiceAction::SendReminder),
            can_mark_paid: allowed(InvoiceAction::MarkPaid),
            can_cancel: allowed(InvoiceAction::Cancel),
        }
    }

    pub fn allows(&self, action: InvoiceAction) -> bool {
        match action {
            InvoiceAction::Edit => self.can_edit,
            InvoiceAction::Send => self.can_send,
            InvoiceAction::RecordPayment => self.can_record_payment,
            InvoiceAction::SendReminder => self.can_send_reminder,
            InvoiceAction::MarkPaid => self.can_mark_paid,
            InvoiceAction::Cancel => self.can_cancel,
        }
    }

    /// Fail with [`WorkflowError::ActionNotPermitted`] unless `invoice`
    /// currently admits `action`.
    pub fn require(invoice: &Invoice, action: InvoiceAction) -> Result<(), WorkflowError> {
        if Self::for_invoice(invoice).allows(action) {
            Ok(())
        } else {
            Err(WorkflowError::ActionNotPermitted {
                action,
                status: invoice.status,
            })
        }
    }
}

fn is_allowed(status: InvoiceStatus, balance: Decimal, action: InvoiceAction) -> bool {
    status.transition(action).is_some()
        && (!action.needs_outstanding_balance() || balance > Decimal::ZERO)
}
