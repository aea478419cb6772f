use crate::error::ClientError;
use crate::gateway::RestGateway;
use crate::models::{ChatMessageRequest, ChatMessageResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct ChatApi {
    gateway: Arc<RestGateway>,
}

impl ChatApi {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatMessageResponse, ClientError> {
        let body = ChatMessageRequest {
            message: message.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        };
        self.gateway.post("/chat/message", &body).await
    }
}
