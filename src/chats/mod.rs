//! Messaging API: conversations and messages kept in memory.
//!
//! # Routes
//! ```text
//! GET    /api/conversations                 list (?participant=)
//! POST   /api/conversations                 create (≥ 2 participants)
//! GET    /api/conversations/{id}            fetch
//! DELETE /api/conversations/{id}            delete with its messages
//! GET    /api/conversations/{id}/messages   paginated listing
//! POST   /api/conversations/{id}/messages   send into conversation
//! GET    /api/messages                      paginated listing (?conversation=)
//! POST   /api/messages                      send ({conversation, message_body})
//! GET    /api/messages/{id}                 fetch
//! PUT    /api/messages/{id}                 edit body
//! DELETE /api/messages/{id}                 delete
//! ```
//!
//! With `chats.participants_only` set, every route except conversation
//! creation requires an identity, and users only reach conversations that
//! list their user id. Admins and moderators reach all of them.

pub mod access;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod store;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::config::ChatsConfig;
use self::handlers::*;

pub use store::ChatStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("At least two participants required")]
    NotEnoughParticipants,
    #[error("Conversation ID required")]
    MissingConversation,
    #[error("message_body may not be blank")]
    BlankMessage,
    #[error("Conversation not found")]
    ConversationNotFound,
    #[error("Message not found")]
    MessageNotFound,
    #[error("Invalid page.")]
    InvalidPage,
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,
    #[error("You do not have permission to perform this action.")]
    NotParticipant,
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::NotEnoughParticipants
            | ChatError::MissingConversation
            | ChatError::BlankMessage => StatusCode::BAD_REQUEST,
            ChatError::ConversationNotFound
            | ChatError::MessageNotFound
            | ChatError::InvalidPage => StatusCode::NOT_FOUND,
            ChatError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ChatError::NotParticipant => StatusCode::FORBIDDEN,
            ChatError::Malformed { status, .. } => *status,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        // Permission failures use the same `detail` key as the role gate.
        let key = match self {
            ChatError::NotAuthenticated | ChatError::NotParticipant => "detail",
            _ => "error",
        };
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), self.to_string().into());
        (self.status(), Json(body)).into_response()
    }
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
        .into_response()
}

/// State shared by the messaging handlers.
#[derive(Clone)]
pub struct ChatState {
    pub store: Arc<ChatStore>,
    pub config: Arc<ChatsConfig>,
}

pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}",
            get(get_conversation).delete(delete_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(list_conversation_messages).post(post_conversation_message),
        )
        .route("/api/messages", get(list_messages).post(create_message))
        .route(
            "/api/messages/{message_id}",
            get(get_message).put(update_message).delete(delete_message),
        )
        .fallback(not_found)
        .with_state(state)
}
