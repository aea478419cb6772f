use crate::models::PortalContext;
use axum::Json;
use invoiceme_client::metrics::{OverdueStats, Severity};
use invoiceme_client::models::{OverdueInvoiceSummary, ReminderType};
use invoiceme_core::error::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueEntry {
    #[serde(flatten)]
    pub invoice: OverdueInvoiceSummary,
    pub severity: Severity,
    pub suggested_reminder: ReminderType,
}

impl From<OverdueInvoiceSummary> for OverdueEntry {
    fn from(invoice: OverdueInvoiceSummary) -> Self {
        Self {
            severity: Severity::from_days_overdue(invoice.days_overdue),
            suggested_reminder: invoice.suggested_reminder(),
            invoice,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueResponse {
    pub stats: OverdueStats,
    pub invoices: Vec<OverdueEntry>,
}

pub async fn overdue_handler(portal: PortalContext) -> Result<Json<OverdueResponse>, AppError> {
    let overdue = portal.backend.reminders.overdue().await?;
    Ok(Json(OverdueResponse {
        stats: OverdueStats::from_overdue(&overdue),
        invoices: overdue.into_iter().map(OverdueEntry::from).collect(),
    }))
}
