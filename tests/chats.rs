//! Messaging API behaviour behind a permissive pipeline.

use axum::http::StatusCode;
use serde_json::json;

use common::{
    create_conversation, create_conversation_with, request, test_config, Harness, ADMIN_TOKEN,
    ROLELESS_TOKEN, USER_TOKEN,
};

mod common;

fn harness() -> Harness {
    Harness::at_hour(test_config(), 19)
}

#[tokio::test]
async fn test_conversation_validation() {
    let harness = harness();
    let (status, body) = harness
        .send(request(
            "POST",
            "/api/conversations",
            Some(ADMIN_TOKEN),
            None,
            Some(json!({ "participants": ["alice"] })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "At least two participants required" }));
}

#[tokio::test]
async fn test_message_creation_errors() {
    let harness = harness();

    let (status, body) = harness
        .send(request(
            "POST",
            "/api/messages",
            Some(ADMIN_TOKEN),
            Some("10.1.0.1"),
            Some(json!({ "message_body": "hi" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Conversation ID required" }));

    let (status, body) = harness
        .send(request(
            "POST",
            "/api/messages",
            Some(ADMIN_TOKEN),
            Some("10.1.0.1"),
            Some(json!({ "conversation": uuid::Uuid::new_v4(), "message_body": "hi" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Conversation not found" }));
}

#[tokio::test]
async fn test_message_lifecycle() {
    let harness = harness();
    let conversation = create_conversation(&harness).await;

    let (status, message) = harness
        .send(request(
            "POST",
            &format!("/api/conversations/{conversation}/messages"),
            Some(ADMIN_TOKEN),
            None,
            Some(json!({ "message_body": "hello" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender"], "u-admin");
    let message_id = message["message_id"].as_str().unwrap().to_string();

    let (status, updated) = harness
        .send(request(
            "PUT",
            &format!("/api/messages/{message_id}"),
            Some(ADMIN_TOKEN),
            Some("10.1.0.2"),
            Some(json!({ "message_body": "edited" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message_body"], "edited");

    let (status, page) = harness
        .send(request(
            "GET",
            &format!("/api/conversations/{conversation}/messages"),
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_messages"], 1);
    assert_eq!(page["current_page"], 1);

    let (status, _) = harness
        .send(request(
            "DELETE",
            &format!("/api/conversations/{conversation}"),
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = harness
        .send(request(
            "GET",
            &format!("/api/messages/{message_id}"),
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_page() {
    let harness = harness();
    let (status, body) = harness
        .send(request("GET", "/api/messages?page=2", Some(ADMIN_TOKEN), None, None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Invalid page." }));
}

#[tokio::test]
async fn test_participant_filter() {
    let harness = harness();
    create_conversation(&harness).await;

    let (_, list) = harness
        .send(request(
            "GET",
            "/api/conversations?participant=alice",
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = harness
        .send(request(
            "GET",
            "/api/conversations?participant=zoe",
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_participants_only_reach_their_conversations() {
    let harness = harness();
    let own = create_conversation_with(&harness, &["u-user", "u-none"]).await;
    let other = create_conversation(&harness).await;

    let (status, list) = harness
        .send(request("GET", "/api/conversations", Some(USER_TOKEN), None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["conversation_id"], own.as_str());

    for uri in [
        format!("/api/conversations/{other}"),
        format!("/api/conversations/{other}/messages"),
    ] {
        let (status, body) = harness
            .send(request("GET", &uri, Some(USER_TOKEN), None, None))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(
            body,
            json!({ "detail": "You do not have permission to perform this action." })
        );
    }

    let (status, _) = harness
        .send(request(
            "GET",
            &format!("/api/conversations/{own}/messages"),
            Some(USER_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = harness
        .send(request("GET", "/api/conversations", None, None, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Authentication credentials were not provided." }));

    let (_, list) = harness
        .send(request("GET", "/api/conversations", Some(ADMIN_TOKEN), None, None))
        .await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_participant_cannot_post() {
    let mut config = test_config();
    config.role_gate.enabled = false;
    let harness = Harness::at_hour(config, 19);
    let own = create_conversation_with(&harness, &["u-user", "u-none"]).await;
    let other = create_conversation(&harness).await;

    let (status, message) = harness
        .send(request(
            "POST",
            &format!("/api/conversations/{own}/messages"),
            Some(ROLELESS_TOKEN),
            Some("10.2.0.1"),
            Some(json!({ "message_body": "hello" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender"], "u-none");

    let (status, body) = harness
        .send(request(
            "POST",
            &format!("/api/conversations/{other}/messages"),
            Some(ROLELESS_TOKEN),
            Some("10.2.0.1"),
            Some(json!({ "message_body": "let me in" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "detail": "You do not have permission to perform this action." })
    );

    let (status, _) = harness
        .send(request(
            "POST",
            "/api/messages",
            Some(ROLELESS_TOKEN),
            Some("10.2.0.1"),
            Some(json!({ "conversation": other, "message_body": "let me in" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_scoping_can_be_turned_off() {
    let mut config = test_config();
    config.chats.participants_only = false;
    config.role_gate.enabled = false;
    let harness = Harness::at_hour(config, 19);
    let conversation = create_conversation(&harness).await;

    let (status, message) = harness
        .send(request(
            "POST",
            &format!("/api/conversations/{conversation}/messages"),
            None,
            Some("10.3.0.1"),
            Some(json!({ "message_body": "hi" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender"], "anonymous");

    let (status, list) = harness
        .send(request("GET", "/api/conversations", None, None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_input_gets_json_errors() {
    let harness = harness();
    let conversation = create_conversation(&harness).await;

    let (status, body) = harness
        .send(request("GET", "/api/conversations/not-a-uuid", Some(ADMIN_TOKEN), None, None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = harness
        .send(request(
            "POST",
            "/api/messages",
            Some(ADMIN_TOKEN),
            Some("10.4.0.1"),
            Some(json!({ "conversation": "not-a-uuid", "message_body": "hi" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = harness
        .send(request(
            "GET",
            &format!("/api/conversations/{conversation}/messages?page=first"),
            Some(ADMIN_TOKEN),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}
