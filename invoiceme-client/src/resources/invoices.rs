use crate::error::ClientError;
use crate::gateway::RestGateway;
use crate::models::{
    CancelInvoiceRequest, CreateInvoiceRequest, Invoice, InvoiceFilters, UpdateInvoiceRequest,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct InvoiceApi {
    gateway: Arc<RestGateway>,
}

impl InvoiceApi {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Invoice>, ClientError> {
        self.gateway.get("/invoices").await
    }

    /// List with the backend's query filters; empty filters behave like `list`.
    pub async fn list_filtered(&self, filters: &InvoiceFilters) -> Result<Vec<Invoice>, ClientError> {
        if filters.is_empty() {
            return self.list().await;
        }
        self.gateway
            .get_with_query("/invoices", &filters.to_query())
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Invoice, ClientError> {
        self.gateway.get(&format!("/invoices/{}", id)).await
    }

    pub async fn create(&self, request: &CreateInvoiceRequest) -> Result<Invoice, ClientError> {
        let invoice: Invoice = self.gateway.post("/invoices", request).await?;
        tracing::info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateInvoiceRequest,
    ) -> Result<Invoice, ClientError> {
        self.gateway.put(&format!("/invoices/{}", id), request).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.gateway.delete(&format!("/invoices/{}", id)).await
    }

    pub async fn send(&self, id: Uuid) -> Result<Invoice, ClientError> {
        let invoice: Invoice = self.gateway.post_empty(&format!("/invoices/{}/send", id)).await?;
        tracing::info!(invoice_id = %id, status = %invoice.status, "Invoice sent");
        Ok(invoice)
    }

    pub async fn mark_paid(&self, id: Uuid) -> Result<Invoice, ClientError> {
        let invoice: Invoice = self
            .gateway
            .post_empty(&format!("/invoices/{}/mark-paid", id))
            .await?;
        tracing::info!(invoice_id = %id, "Invoice marked as paid");
        Ok(invoice)
    }

    /// Cancel; for sent invoices the backend also notifies the customer.
    pub async fn cancel(&self, id: Uuid, reason: &str) -> Result<Invoice, ClientError> {
        let body = CancelInvoiceRequest {
            cancellation_reason: reason.to_string(),
        };
        let invoice: Invoice = self
            .gateway
            .post(&format!("/invoices/{}/cancel", id), &body)
            .await?;
        tracing::info!(invoice_id = %id, reason = %reason, "Invoice cancelled");
        Ok(invoice)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Invoice>, ClientError> {
        self.gateway
            .get(&format!("/invoices/customer/{}", customer_id))
            .await
    }

    /// Public lookup used by the payment portal; sends no credentials.
    pub async fn get_by_payment_link(&self, link: &str) -> Result<Invoice, ClientError> {
        self.gateway
            .get_public(&format!("/invoices/payment-link/{}", link))
            .await
    }
}
