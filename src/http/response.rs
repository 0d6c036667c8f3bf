//! Response mapping for pipeline rejections.
//!
//! - Time window → 403, plain text
//! - Rate limit → 429, `{"error": ...}` plus `Retry-After`
//! - Role gate → 401/403, `{"detail": ...}`

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::pipeline::Rejection;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Rejection::OutsideWindow { message } => (status, message).into_response(),
            Rejection::RateLimited {
                message,
                retry_after,
            } => {
                let mut response = (status, Json(json!({ "error": message }))).into_response();
                let secs = retry_after.as_secs().max(1);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            other @ (Rejection::Unauthenticated | Rejection::Forbidden) => {
                (status, Json(json!({ "detail": other.to_string() }))).into_response()
            }
        }
    }
}
