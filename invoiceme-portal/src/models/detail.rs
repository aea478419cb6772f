use invoiceme_client::models::{Invoice, Payment, ReminderHistory};
use invoiceme_client::workflow::{
    ActionOutcome, CancellationNotice, InvoiceDetailView, InvoiceFlows, Notice, PermittedActions,
};
use serde::Serialize;

/// Result of the step just taken, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Completed,
    Failed { message: String },
    Ignored,
}

impl From<ActionOutcome> for Outcome {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Pending => Outcome::Pending,
            ActionOutcome::Completed => Outcome::Completed,
            ActionOutcome::Failed(message) => Outcome::Failed { message },
            ActionOutcome::Ignored => Outcome::Ignored,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailResponse {
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
    pub reminders: Vec<ReminderHistory>,
    pub permitted: PermittedActions,
    pub flows: InvoiceFlows,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_notice: Option<CancellationNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl InvoiceDetailResponse {
    pub fn new(view: &InvoiceDetailView, outcome: Option<ActionOutcome>) -> Self {
        Self {
            invoice: view.invoice().clone(),
            payments: view.payments().to_vec(),
            reminders: view.reminders().to_vec(),
            permitted: view.permitted(),
            flows: view.flows().clone(),
            notice: view.notice().cloned(),
            cancellation_notice: view.cancellation_notice(),
            outcome: outcome.map(Outcome::from),
        }
    }
}
