use super::{Flow, InvoiceAction, PermittedActions, WorkflowError};
use crate::models::Invoice;
use serde::{Deserialize, Serialize};

/// Shown on the confirmation step.
pub const MARK_PAID_WARNING: &str = "This will set the amount paid to the invoice total and the \
     balance to zero without recording a payment method or reference. Use Record Payment to keep \
     a detailed payment history.";

/// Mark as paid: confirm a manual settlement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MarkPaidFlow {
    #[default]
    Idle,
    ConfirmOpen {
        error: Option<String>,
    },
    Confirming,
}

impl MarkPaidFlow {
    pub fn open(&mut self, invoice: &Invoice) -> Result<(), WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::AlreadyProcessing);
        }
        PermittedActions::require(invoice, InvoiceAction::MarkPaid)?;
        *self = MarkPaidFlow::ConfirmOpen { error: None };
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), WorkflowError> {
        match self {
            MarkPaidFlow::ConfirmOpen { .. } => {
                *self = MarkPaidFlow::Confirming;
                Ok(())
            }
            MarkPaidFlow::Confirming => Err(WorkflowError::AlreadyProcessing),
            MarkPaidFlow::Idle => Err(WorkflowError::InvalidTransition {
                flow: "mark paid",
                state: "idle",
            }),
        }
    }

    pub fn succeed(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = MarkPaidFlow::Idle;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = MarkPaidFlow::ConfirmOpen {
            error: Some(message.into()),
        };
        true
    }
}

impl Flow for MarkPaidFlow {
    fn is_processing(&self) -> bool {
        matches!(self, MarkPaidFlow::Confirming)
    }

    fn is_open(&self) -> bool {
        !matches!(self, MarkPaidFlow::Idle)
    }

    fn close(&mut self) {
        *self = MarkPaidFlow::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatus;
    use crate::test_support::invoice;
    use rust_decimal_macros::dec;

    #[test]
    fn settled_invoice_cannot_be_marked_paid() {
        let settled = invoice(InvoiceStatus::Sent, dec!(0));
        let mut flow = MarkPaidFlow::default();
        assert!(flow.open(&settled).is_err());
    }

    #[test]
    fn confirm_round_trip() {
        let sent = invoice(InvoiceStatus::Sent, dec!(25));
        let mut flow = MarkPaidFlow::default();

        flow.open(&sent).unwrap();
        flow.confirm().unwrap();
        assert_eq!(flow.confirm(), Err(WorkflowError::AlreadyProcessing));
        assert!(flow.fail("HTTP 500"));
        assert!(matches!(flow, MarkPaidFlow::ConfirmOpen { error: Some(_) }));

        flow.confirm().unwrap();
        assert!(flow.succeed());
        assert!(!flow.is_open());
    }
}
