use crate::error::ClientError;
use crate::gateway::RestGateway;
use crate::models::{Payment, RecordPaymentRequest};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentApi {
    gateway: Arc<RestGateway>,
}

impl PaymentApi {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Payment>, ClientError> {
        self.gateway.get("/payments").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment, ClientError> {
        self.gateway.get(&format!("/payments/{}", id)).await
    }

    pub async fn record(&self, request: &RecordPaymentRequest) -> Result<Payment, ClientError> {
        let payment: Payment = self.gateway.post("/payments", request).await?;
        tracing::info!(
            payment_id = %payment.id,
            invoice_id = %payment.invoice_id,
            amount = %payment.payment_amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    pub async fn list_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<Payment>, ClientError> {
        self.gateway
            .get(&format!("/payments/invoice/{}", invoice_id))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.gateway.delete(&format!("/payments/{}", id)).await
    }

    /// Payment submitted from the public payment-link page.
    pub async fn submit_public(&self, request: &RecordPaymentRequest) -> Result<Payment, ClientError> {
        let payment: Payment = self.gateway.post_public("/payments", request).await?;
        tracing::info!(
            payment_id = %payment.id,
            invoice_id = %payment.invoice_id,
            "Public payment submitted"
        );
        Ok(payment)
    }
}
