use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::chats::extract::{Caller, ChatJson, ChatPath, ChatQuery};
use crate::chats::models::{Conversation, Message, MessageBody, NewConversation, NewMessage};
use crate::chats::pagination::{paginate, MessagePage, PageParams};
use crate::chats::{ChatError, ChatState};

#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    pub participant: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub conversation: Option<Uuid>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

pub async fn list_conversations(
    State(state): State<ChatState>,
    caller: Caller,
    ChatQuery(query): ChatQuery<ConversationQuery>,
) -> Json<Vec<Conversation>> {
    Json(
        state
            .store
            .conversations(&caller.access, query.participant.as_deref()),
    )
}

pub async fn create_conversation(
    State(state): State<ChatState>,
    ChatJson(body): ChatJson<NewConversation>,
) -> Result<(StatusCode, Json<Conversation>), ChatError> {
    let conversation = state.store.create_conversation(body.participants)?;
    tracing::debug!(conversation_id = %conversation.conversation_id, "Conversation created");
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn get_conversation(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(conversation_id): ChatPath<Uuid>,
) -> Result<Json<Conversation>, ChatError> {
    state
        .store
        .conversation(conversation_id, &caller.access)
        .map(Json)
}

pub async fn delete_conversation(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(conversation_id): ChatPath<Uuid>,
) -> Result<StatusCode, ChatError> {
    state
        .store
        .delete_conversation(conversation_id, &caller.access)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_conversation_messages(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(conversation_id): ChatPath<Uuid>,
    ChatQuery(params): ChatQuery<PageParams>,
) -> Result<Json<MessagePage>, ChatError> {
    state.store.conversation(conversation_id, &caller.access)?;
    let messages = state.store.messages(&caller.access, Some(conversation_id));
    paginate(messages, params, &state.config).map(Json)
}

pub async fn post_conversation_message(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(conversation_id): ChatPath<Uuid>,
    ChatJson(body): ChatJson<MessageBody>,
) -> Result<(StatusCode, Json<Message>), ChatError> {
    let message = state.store.post_message(
        conversation_id,
        &caller.access,
        caller.sender(),
        &body.message_body,
    )?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<ChatState>,
    caller: Caller,
    ChatQuery(query): ChatQuery<MessageQuery>,
) -> Result<Json<MessagePage>, ChatError> {
    let messages = state.store.messages(&caller.access, query.conversation);
    let params = PageParams {
        page: query.page,
        page_size: query.page_size,
    };
    paginate(messages, params, &state.config).map(Json)
}

pub async fn create_message(
    State(state): State<ChatState>,
    caller: Caller,
    ChatJson(body): ChatJson<NewMessage>,
) -> Result<(StatusCode, Json<Message>), ChatError> {
    let conversation_id = body.conversation.ok_or(ChatError::MissingConversation)?;
    let message = state.store.post_message(
        conversation_id,
        &caller.access,
        caller.sender(),
        &body.message_body,
    )?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_message(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(message_id): ChatPath<Uuid>,
) -> Result<Json<Message>, ChatError> {
    state.store.message(message_id, &caller.access).map(Json)
}

pub async fn update_message(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(message_id): ChatPath<Uuid>,
    ChatJson(body): ChatJson<MessageBody>,
) -> Result<Json<Message>, ChatError> {
    state
        .store
        .update_message(message_id, &caller.access, &body.message_body)
        .map(Json)
}

pub async fn delete_message(
    State(state): State<ChatState>,
    caller: Caller,
    ChatPath(message_id): ChatPath<Uuid>,
) -> Result<StatusCode, ChatError> {
    state.store.delete_message(message_id, &caller.access)?;
    Ok(StatusCode::NO_CONTENT)
}
