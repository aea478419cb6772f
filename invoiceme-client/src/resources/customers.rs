use crate::error::ClientError;
use crate::gateway::RestGateway;
use crate::models::{CreateCustomerRequest, Customer, UpdateCustomerRequest};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CustomerApi {
    gateway: Arc<RestGateway>,
}

impl CustomerApi {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, ClientError> {
        self.gateway.get("/customers").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, ClientError> {
        self.gateway.get(&format!("/customers/{}", id)).await
    }

    pub async fn create(&self, request: &CreateCustomerRequest) -> Result<Customer, ClientError> {
        let customer: Customer = self.gateway.post("/customers", request).await?;
        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateCustomerRequest,
    ) -> Result<Customer, ClientError> {
        self.gateway.put(&format!("/customers/{}", id), request).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.gateway.delete(&format!("/customers/{}", id)).await?;
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Server-side search over name and email.
    pub async fn search(&self, query: &str) -> Result<Vec<Customer>, ClientError> {
        self.gateway
            .get_with_query("/customers/search", &[("q", query)])
            .await
    }
}
