//! Publish client tests against a mocked endpoint.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drumbeat_publish::{PublishClient, PublishError, PublishRequest};

#[tokio::test]
async fn publish_success_returns_receipt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/updates/create.json"))
        .and(body_string_contains("profile_ids"))
        .and(body_string_contains("hello+world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "id": "update-123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PublishClient::new(server.uri(), "token");
    let receipt = client
        .publish("twitter", "profile-1", "hello world")
        .await
        .unwrap();

    assert_eq!(receipt.id.as_deref(), Some("update-123"));
}

#[tokio::test]
async fn publish_api_error_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/updates/create.json"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad profile"))
        .mount(&server)
        .await;

    let client = PublishClient::new(server.uri(), "token");
    let err = client
        .publish("twitter", "nope", "hello")
        .await
        .unwrap_err();

    match err {
        PublishError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad profile");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn publish_rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/updates/create.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .mount(&server)
        .await;

    let client = PublishClient::new(server.uri(), "token");
    let err = client
        .publish("twitter", "profile-1", "hello")
        .await
        .unwrap_err();

    match err {
        PublishError::RateLimited { retry_after_secs } => {
            assert_eq!(retry_after_secs, Some(120));
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn publish_success_false_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/updates/create.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})),
        )
        .mount(&server)
        .await;

    let client = PublishClient::new(server.uri(), "token");
    let err = client
        .publish("twitter", "profile-1", "hello")
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::InvalidResponse(_)));
}

#[tokio::test]
async fn profiles_lists_connected_destinations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profiles.json"))
        .and(query_param("access_token", "token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "p1", "service": "linkedin", "service_display_name": "LinkedIn"},
            {"id": "p2", "service": "twitter"},
        ])))
        .mount(&server)
        .await;

    let client = PublishClient::new(server.uri(), "token");
    let profiles = client.profiles().await.unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].service, "linkedin");
    assert_eq!(profiles[1].service_display_name, None);
}

#[tokio::test]
async fn publisher_seam_maps_errors_to_strings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/updates/create.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let publisher = Arc::new(PublishClient::new(server.uri(), "token")).into_publisher();

    let result = publisher(PublishRequest {
        post_id: "post-1".to_string(),
        platform: "twitter".to_string(),
        target_ref: "profile-1".to_string(),
        content: "hello".to_string(),
    })
    .await;

    let err = result.unwrap_err();
    assert!(err.contains("500"), "error should carry the status: {}", err);
}
