//! Conversation state for the embedded assistant.

use crate::models::{ChatMessage, ChatSender};
use crate::resources::ChatApi;
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Hello! I'm your AI assistant for InvoiceMe. I can help you \
     with invoices, customers, revenue, and more. Try asking:\n\n- How many overdue invoices do I \
     have?\n- What's my total revenue?\n- Show me draft invoices\n\nWhat would you like to know?";

pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error processing your request. \
     Please try again or make sure you are logged in.";

pub const STARTER_SUGGESTIONS: [&str; 3] = [
    "Show me overdue invoices",
    "What's my total revenue?",
    "How many draft invoices do I have?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or a reply is still pending.
    Ignored,
    Replied,
    /// The assistant could not be reached; an apology was appended.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub is_open: bool,
    pub is_loading: bool,
    pub conversation_id: Option<String>,
    pub suggestions: Vec<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window, greeting the user on an empty conversation.
    pub fn open(&mut self) {
        self.is_open = true;
        if self.messages.is_empty() {
            self.messages.push(ChatMessage::ai(WELCOME_MESSAGE));
            self.suggestions = STARTER_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        }
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Start a new conversation.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.suggestions.clear();
        self.is_loading = false;
    }

    pub async fn send(&mut self, api: &ChatApi, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() || self.is_loading {
            return SendOutcome::Ignored;
        }

        self.messages.push(ChatMessage::user(text));
        self.is_loading = true;

        let result = api
            .send_message(text, self.conversation_id.as_deref())
            .await;
        self.is_loading = false;

        match result {
            Ok(reply) => {
                self.messages.push(ChatMessage::ai(reply.response));
                self.suggestions = reply.suggestions;
                self.conversation_id = Some(reply.conversation_id);
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant request failed");
                self.messages.push(ChatMessage::ai(APOLOGY_MESSAGE));
                SendOutcome::Failed
            }
        }
    }

    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == ChatSender::Ai)
    }
}
