use crate::models::PortalContext;
use axum::Json;
use invoiceme_client::chat::{ChatSession, SendOutcome};
use invoiceme_core::error::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: String,
}

/// The conversation so far, opening it on first view.
pub async fn chat_history(portal: PortalContext) -> Result<Json<ChatSession>, AppError> {
    let mut chat = portal.chat().await?;
    if !chat.is_open {
        chat.open();
        portal.save_chat(&chat).await?;
    }
    Ok(Json(chat))
}

/// Send one message. Assistant failures become an apology in the
/// conversation; only an ended session fails the request.
pub async fn send_message(
    portal: PortalContext,
    Json(input): Json<ChatInput>,
) -> Result<Json<ChatSession>, AppError> {
    let mut chat = portal.chat().await?;
    chat.open();

    let outcome = chat.send(&portal.backend.chat, &input.message).await;
    if outcome == SendOutcome::Failed && portal.session_expired() {
        return Err(AppError::SessionExpired);
    }

    portal.save_chat(&chat).await?;
    Ok(Json(chat))
}

pub async fn reset_chat(portal: PortalContext) -> Result<Json<ChatSession>, AppError> {
    let mut chat = portal.chat().await?;
    chat.reset();
    chat.open();
    portal.save_chat(&chat).await?;
    Ok(Json(chat))
}
