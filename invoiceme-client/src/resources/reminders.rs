use crate::error::ClientError;
use crate::gateway::RestGateway;
use crate::models::{
    OverdueInvoiceSummary, ReminderHistory, ReminderPreview, ReminderType, SendReminderRequest,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReminderApi {
    gateway: Arc<RestGateway>,
}

impl ReminderApi {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn send(
        &self,
        invoice_id: Uuid,
        reminder_type: ReminderType,
    ) -> Result<ReminderHistory, ClientError> {
        let body = SendReminderRequest {
            invoice_id,
            reminder_type,
        };
        let sent: ReminderHistory = self.gateway.post("/reminders/send", &body).await?;
        tracing::info!(
            invoice_id = %invoice_id,
            reminder_type = reminder_type.as_str(),
            "Reminder sent"
        );
        Ok(sent)
    }

    /// Reminders sent for an invoice. History is secondary to the invoice
    /// itself: any failure other than an expired session reads as an empty
    /// list.
    pub async fn history(&self, invoice_id: Uuid) -> Result<Vec<ReminderHistory>, ClientError> {
        let result: Result<Option<Vec<ReminderHistory>>, ClientError> = self
            .gateway
            .get(&format!("/reminders/history/{}", invoice_id))
            .await;

        match result {
            Ok(history) => Ok(history.unwrap_or_default()),
            Err(ClientError::SessionExpired) => Err(ClientError::SessionExpired),
            Err(e) if e.is_not_found() => {
                tracing::debug!(invoice_id = %invoice_id, "No reminder history");
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(invoice_id = %invoice_id, error = %e, "Reminder history unavailable");
                Ok(Vec::new())
            }
        }
    }

    pub async fn overdue(&self) -> Result<Vec<OverdueInvoiceSummary>, ClientError> {
        self.gateway.get("/reminders/overdue").await
    }

    pub async fn preview(
        &self,
        invoice_id: Uuid,
        reminder_type: ReminderType,
    ) -> Result<ReminderPreview, ClientError> {
        self.gateway
            .get_with_query(
                &format!("/reminders/preview/{}", invoice_id),
                &[("type", reminder_type.as_str())],
            )
            .await
    }
}
