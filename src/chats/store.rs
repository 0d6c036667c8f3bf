//! In-memory conversation and message storage.

use std::collections::{BTreeSet, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::chats::access::Access;
use crate::chats::models::{Conversation, Message};
use crate::chats::ChatError;

#[derive(Debug, Default)]
pub struct ChatStore {
    conversations: DashMap<Uuid, Conversation>,
    /// Insertion order is listing order.
    messages: RwLock<Vec<Message>>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants are de-duplicated; at least two distinct ones are required.
    pub fn create_conversation(&self, participants: Vec<String>) -> Result<Conversation, ChatError> {
        let unique: BTreeSet<String> = participants
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if unique.len() < 2 {
            return Err(ChatError::NotEnoughParticipants);
        }

        let conversation = Conversation {
            conversation_id: Uuid::new_v4(),
            participants: unique.into_iter().collect(),
            created_at: Utc::now(),
        };
        self.conversations
            .insert(conversation.conversation_id, conversation.clone());
        Ok(conversation)
    }

    /// Conversations visible to `access`, oldest first, optionally only those including `participant`.
    pub fn conversations(&self, access: &Access, participant: Option<&str>) -> Vec<Conversation> {
        let mut list: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| access.permits(c.value()))
            .filter(|c| participant.map_or(true, |p| c.participants.iter().any(|x| x == p)))
            .map(|c| c.value().clone())
            .collect();
        list.sort_by_key(|c| c.created_at);
        list
    }

    pub fn conversation(&self, id: Uuid, access: &Access) -> Result<Conversation, ChatError> {
        let conversation = self
            .conversations
            .get(&id)
            .ok_or(ChatError::ConversationNotFound)?;
        access.check(conversation.value())?;
        Ok(conversation.value().clone())
    }

    /// Removes the conversation and every message in it.
    pub fn delete_conversation(&self, id: Uuid, access: &Access) -> Result<(), ChatError> {
        self.conversation(id, access)?;
        self.conversations
            .remove(&id)
            .ok_or(ChatError::ConversationNotFound)?;
        self.messages_mut().retain(|m| m.conversation_id != id);
        Ok(())
    }

    pub fn post_message(
        &self,
        conversation_id: Uuid,
        access: &Access,
        sender: &str,
        body: &str,
    ) -> Result<Message, ChatError> {
        // Guard held until the push lands; delete_conversation blocks on it.
        let conversation = self
            .conversations
            .get(&conversation_id)
            .ok_or(ChatError::ConversationNotFound)?;
        access.check(conversation.value())?;
        let body = non_blank(body)?;

        let message = Message {
            message_id: Uuid::new_v4(),
            conversation_id,
            sender: sender.to_string(),
            message_body: body.to_string(),
            sent_at: Utc::now(),
        };
        self.messages_mut().push(message.clone());
        drop(conversation);
        Ok(message)
    }

    /// Messages visible to `access`, optionally from one conversation.
    pub fn messages(&self, access: &Access, conversation_id: Option<Uuid>) -> Vec<Message> {
        let visible: Option<HashSet<Uuid>> = match access {
            Access::Everything => None,
            Access::Participant(_) => Some(
                self.conversations
                    .iter()
                    .filter(|c| access.permits(c.value()))
                    .map(|c| *c.key())
                    .collect(),
            ),
        };

        self.messages_ref()
            .iter()
            .filter(|m| conversation_id.map_or(true, |id| m.conversation_id == id))
            .filter(|m| visible.as_ref().map_or(true, |ids| ids.contains(&m.conversation_id)))
            .cloned()
            .collect()
    }

    pub fn message(&self, id: Uuid, access: &Access) -> Result<Message, ChatError> {
        let message = self
            .messages_ref()
            .iter()
            .find(|m| m.message_id == id)
            .cloned()
            .ok_or(ChatError::MessageNotFound)?;
        let conversation = self
            .conversations
            .get(&message.conversation_id)
            .ok_or(ChatError::MessageNotFound)?;
        access.check(conversation.value())?;
        Ok(message)
    }

    pub fn update_message(&self, id: Uuid, access: &Access, body: &str) -> Result<Message, ChatError> {
        self.message(id, access)?;
        let body = non_blank(body)?;
        let mut messages = self.messages_mut();
        let message = messages
            .iter_mut()
            .find(|m| m.message_id == id)
            .ok_or(ChatError::MessageNotFound)?;
        message.message_body = body.to_string();
        Ok(message.clone())
    }

    pub fn delete_message(&self, id: Uuid, access: &Access) -> Result<(), ChatError> {
        self.message(id, access)?;
        let mut messages = self.messages_mut();
        let before = messages.len();
        messages.retain(|m| m.message_id != id);
        if messages.len() == before {
            return Err(ChatError::MessageNotFound);
        }
        Ok(())
    }

    fn messages_ref(&self) -> std::sync::RwLockReadGuard<'_, Vec<Message>> {
        self.messages.read().unwrap_or_else(|p| p.into_inner())
    }

    fn messages_mut(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Message>> {
        self.messages.write().unwrap_or_else(|p| p.into_inner())
    }
}

fn non_blank(body: &str) -> Result<&str, ChatError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Err(ChatError::BlankMessage)
    } else {
        Ok(trimmed)
    }
}
