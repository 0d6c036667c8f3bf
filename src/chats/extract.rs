//! Extractors for the messaging handlers.
//!
//! axum's own `Json`, `Path` and `Query` answer malformed input with plain
//! text. These wrappers turn those rejections into `ChatError`, so every
//! handler failure carries the `{"error": ...}` body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;

use crate::chats::access::Access;
use crate::chats::{ChatError, ChatState};
use crate::security::identity::Identity;

const ANONYMOUS_SENDER: &str = "anonymous";

/// JSON request body.
#[derive(Debug, Clone)]
pub struct ChatJson<T>(pub T);

impl<S, T> FromRequest<S> for ChatJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ChatJson(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone)]
pub struct ChatPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ChatPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ChatPath(value))
    }
}

/// Query string.
#[derive(Debug, Clone)]
pub struct ChatQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ChatQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ChatQuery(value))
    }
}

impl From<JsonRejection> for ChatError {
    fn from(rejection: JsonRejection) -> Self {
        ChatError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ChatError {
    fn from(rejection: PathRejection) -> Self {
        ChatError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ChatError {
    fn from(rejection: QueryRejection) -> Self {
        ChatError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// The identity the pipeline attached, with the access it grants.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Identity,
    pub access: Access,
}

impl Caller {
    /// Recorded as the sender of new messages.
    pub fn sender(&self) -> &str {
        self.identity.user_id().unwrap_or(ANONYMOUS_SENDER)
    }
}

impl FromRequestParts<ChatState> for Caller {
    type Rejection = ChatError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ChatState,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_default();
        let access = Access::for_identity(&identity, state.config.participants_only)?;
        Ok(Caller { identity, access })
    }
}
