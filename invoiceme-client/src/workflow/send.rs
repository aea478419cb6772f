use super::{Flow, InvoiceAction, PermittedActions, WorkflowError};
use crate::gateway::View;
use crate::models::Invoice;
use serde::{Deserialize, Serialize};

/// Send invoice: preview the email, then confirm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SendFlow {
    #[default]
    Idle,
    PreviewOpen {
        error: Option<String>,
    },
    Sending,
}

impl SendFlow {
    pub fn open(&mut self, invoice: &Invoice) -> Result<(), WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::AlreadyProcessing);
        }
        PermittedActions::require(invoice, InvoiceAction::Send)?;
        *self = SendFlow::PreviewOpen { error: None };
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), WorkflowError> {
        match self {
            SendFlow::PreviewOpen { .. } => {
                *self = SendFlow::Sending;
                Ok(())
            }
            SendFlow::Sending => Err(WorkflowError::AlreadyProcessing),
            SendFlow::Idle => Err(self.invalid()),
        }
    }

    /// Leave the preview for the edit view instead of sending.
    pub fn edit_from_preview(&mut self, invoice: &Invoice) -> Result<View, WorkflowError> {
        match self {
            SendFlow::PreviewOpen { .. } => {
                *self = SendFlow::Idle;
                Ok(View::InvoiceEdit(invoice.id.to_string()))
            }
            SendFlow::Sending => Err(WorkflowError::AlreadyProcessing),
            SendFlow::Idle => Err(self.invalid()),
        }
    }

    /// Returns false when the result arrived after the flow was closed.
    pub fn succeed(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = SendFlow::Idle;
        true
    }

    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = SendFlow::PreviewOpen {
            error: Some(error.into()),
        };
        true
    }

    fn invalid(&self) -> WorkflowError {
        WorkflowError::InvalidTransition {
            flow: "send",
            state: match self {
                SendFlow::Idle => "idle",
                SendFlow::PreviewOpen { .. } => "previewing",
                SendFlow::Sending => "sending",
            },
        }
    }
}

impl Flow for SendFlow {
    fn is_processing(&self) -> bool {
        matches!(self, SendFlow::Sending)
    }

    fn is_open(&self) -> bool {
        !matches!(self, SendFlow::Idle)
    }

    fn close(&mut self) {
        *self = SendFlow::Idle;
    }
}
