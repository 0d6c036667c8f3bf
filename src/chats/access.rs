//! Who may see and write which conversations.

use crate::chats::models::Conversation;
use crate::chats::ChatError;
use crate::security::identity::{Identity, Role};

/// The slice of the store a caller may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Every conversation. Staff, or any caller when scoping is off.
    Everything,
    /// Only conversations listing this user id as a participant.
    Participant(String),
}

impl Access {
    /// Resolve access for `identity`. Anonymous callers are refused while
    /// conversations are scoped to participants.
    pub fn for_identity(identity: &Identity, participants_only: bool) -> Result<Self, ChatError> {
        if !participants_only {
            return Ok(Access::Everything);
        }
        match identity {
            Identity::Anonymous => Err(ChatError::NotAuthenticated),
            Identity::User { role: Some(Role::Admin | Role::Moderator), .. } => {
                Ok(Access::Everything)
            }
            Identity::User { user_id, .. } => Ok(Access::Participant(user_id.clone())),
        }
    }

    pub fn permits(&self, conversation: &Conversation) -> bool {
        match self {
            Access::Everything => true,
            Access::Participant(user_id) => conversation.participants.iter().any(|p| p == user_id),
        }
    }

    pub fn check(&self, conversation: &Conversation) -> Result<(), ChatError> {
        if self.permits(conversation) {
            Ok(())
        } else {
            Err(ChatError::NotParticipant)
        }
    }
}
