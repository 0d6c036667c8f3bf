//! Conversation and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: Uuid,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub sender: String,
    pub message_body: String,
    pub sent_at: DateTime<Utc>,
}

/// Body of `POST /api/conversations`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub conversation: Option<Uuid>,
    #[serde(default)]
    pub message_body: String,
}

/// Body of `POST /api/conversations/{id}/messages` and `PUT /api/messages/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message_body: String,
}
