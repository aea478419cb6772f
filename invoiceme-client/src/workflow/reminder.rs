//! Send reminder: choose a type, preview the rendered email, then send.

use super::{Flow, InvoiceAction, PermittedActions, WorkflowError};
use crate::models::{Invoice, ReminderPreview, ReminderType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Send reminder: pick a type, fetch the rendered email, then send.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReminderFlow {
    #[default]
    Idle,
    PreviewOpen {
        reminder_type: ReminderType,
        preview: Option<ReminderPreview>,
        error: Option<String>,
    },
    Sending {
        reminder_type: ReminderType,
    },
}

impl ReminderFlow {
    /// Open for `invoice`. Without an explicit type, the type follows how
    /// late the invoice is on `today`.
    pub fn open(
        &mut self,
        invoice: &Invoice,
        reminder_type: Option<ReminderType>,
        today: NaiveDate,
    ) -> Result<ReminderType, WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::AlreadyProcessing);
        }
        PermittedActions::require(invoice, InvoiceAction::SendReminder)?;

        let reminder_type = reminder_type
            .unwrap_or_else(|| ReminderType::for_days_overdue(invoice.days_overdue(today)));
        *self = ReminderFlow::PreviewOpen {
            reminder_type,
            preview: None,
            error: None,
        };
        Ok(reminder_type)
    }

    /// Switch type; the previous preview no longer applies.
    pub fn select_type(&mut self, reminder_type: ReminderType) -> Result<(), WorkflowError> {
        match self {
            ReminderFlow::PreviewOpen { .. } => {
                *self = ReminderFlow::PreviewOpen {
                    reminder_type,
                    preview: None,
                    error: None,
                };
                Ok(())
            }
            ReminderFlow::Sending { .. } => Err(WorkflowError::AlreadyProcessing),
            ReminderFlow::Idle => Err(invalid("idle")),
        }
    }

    /// Attach a fetched preview. Ignored if the flow moved on or the type
    /// changed while the preview was loading.
    pub fn preview_loaded(&mut self, for_type: ReminderType, loaded: ReminderPreview) -> bool {
        match self {
            ReminderFlow::PreviewOpen {
                reminder_type,
                preview,
                error,
            } if *reminder_type == for_type => {
                *preview = Some(loaded);
                *error = None;
                true
            }
            _ => false,
        }
    }

    pub fn preview_failed(&mut self, for_type: ReminderType, message: impl Into<String>) -> bool {
        match self {
            ReminderFlow::PreviewOpen {
                reminder_type,
                error,
                ..
            } if *reminder_type == for_type => {
                *error = Some(message.into());
                true
            }
            _ => false,
        }
    }

    pub fn confirm(&mut self) -> Result<ReminderType, WorkflowError> {
        match self {
            ReminderFlow::PreviewOpen { reminder_type, .. } => {
                let reminder_type = *reminder_type;
                *self = ReminderFlow::Sending { reminder_type };
                Ok(reminder_type)
            }
            ReminderFlow::Sending { .. } => Err(WorkflowError::AlreadyProcessing),
            ReminderFlow::Idle => Err(invalid("idle")),
        }
    }

    pub fn succeed(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        *self = ReminderFlow::Idle;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        let ReminderFlow::Sending { reminder_type } = *self else {
            return false;
        };
        *self = ReminderFlow::PreviewOpen {
            reminder_type,
            preview: None,
            error: Some(message.into()),
        };
        true
    }

    pub fn reminder_type(&self) -> Option<ReminderType> {
        match self {
            ReminderFlow::PreviewOpen { reminder_type, .. }
            | ReminderFlow::Sending { reminder_type } => Some(*reminder_type),
            ReminderFlow::Idle => None,
        }
    }
}

fn invalid(state: &'static str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        flow: "reminder",
        state,
    }
}

impl Flow for ReminderFlow {
    fn is_processing(&self) -> bool {
        matches!(self, ReminderFlow::Sending { .. })
    }

    fn is_open(&self) -> bool {
        !matches!(self, ReminderFlow::Idle)
    }

    fn close(&mut self) {
        *self = ReminderFlow::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatus;
    use crate::test_support::invoice;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn preview() -> ReminderPreview {
        ReminderPreview {
            subject: "Payment reminder".into(),
            message: "Please pay".into(),
            recipient_email: "ap@acme.test".into(),
            invoice_number: Some("INV-0001".into()),
        }
    }

    #[test]
    fn type_follows_days_overdue() {
        let sent = invoice(InvoiceStatus::Sent, dec!(50));
        let today = sent.due_date + Duration::days(15);

        let mut flow = ReminderFlow::default();
        assert_eq!(
            flow.open(&sent, None, today).unwrap(),
            ReminderType::Overdue14Days
        );
    }

    #[test]
    fn explicit_type_wins() {
        let sent = invoice(InvoiceStatus::Sent, dec!(50));
        let today = sent.due_date + Duration::days(45);

        let mut flow = ReminderFlow::default();
        let chosen = flow
            .open(&sent, Some(ReminderType::OnDueDate), today)
            .unwrap();
        assert_eq!(chosen, ReminderType::OnDueDate);
    }

    #[test]
    fn only_sent_invoices_get_reminders() {
        let draft = invoice(InvoiceStatus::Draft, dec!(50));
        let mut flow = ReminderFlow::default();
        assert!(flow.open(&draft, None, draft.due_date).is_err());
    }

    #[test]
    fn stale_preview_is_dropped_after_type_change() {
        let sent = invoice(InvoiceStatus::Sent, dec!(50));
        let mut flow = ReminderFlow::default();
        flow.open(&sent, Some(ReminderType::OnDueDate), sent.due_date)
            .unwrap();
        flow.select_type(ReminderType::Overdue30Days).unwrap();

        assert!(!flow.preview_loaded(ReminderType::OnDueDate, preview()));
        assert!(flow.preview_loaded(ReminderType::Overdue30Days, preview()));
    }

    #[test]
    fn send_failure_keeps_type_and_reports_error() {
        let mut flow = ReminderFlow::PreviewOpen {
            reminder_type: ReminderType::Overdue7Days,
            preview: Some(preview()),
            error: None,
        };
        assert_eq!(flow.confirm().unwrap(), ReminderType::Overdue7Days);
        assert_eq!(flow.confirm(), Err(WorkflowError::AlreadyProcessing));

        assert!(flow.fail("HTTP 502"));
        assert_eq!(flow.reminder_type(), Some(ReminderType::Overdue7Days));
        assert!(!flow.is_processing());
    }
}
