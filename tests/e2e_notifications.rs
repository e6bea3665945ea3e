//! E2E tests for notifications

mod common;

use common::TestServer;
use serde_json::json;

#[tokio::test]
async fn notifications_require_authentication() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/notifications"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn follows_likes_and_comments_notify_the_target() {
    let server = TestServer::new().await;
    let (alice_id, alice_token) = server.register_user("alice").await;
    let (_, bob_token) = server.register_user("bob").await;
    let post_id = server.create_post(&alice_token, "Hello", "body").await;

    server
        .client
        .post(server.url(&format!("/api/accounts/follow/{}", alice_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    server
        .client
        .post(server.url(&format!("/api/posts/{}/like", post_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    server
        .client
        .post(server.url(&format!("/api/posts/{}/comments", post_id)))
        .bearer_auth(&bob_token)
        .json(&json!({ "content": "nice post" }))
        .send()
        .await
        .unwrap();

    let body = server.get_json(&alice_token, "/api/notifications").await;
    assert_eq!(body["count"], 3);

    // Newest first: comment, like, follow
    let verbs: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["verb"].as_str().unwrap())
        .collect();
    assert_eq!(verbs, vec!["commented", "liked", "followed"]);

    for notification in body["results"].as_array().unwrap() {
        assert_eq!(notification["actor_username"], "bob");
    }

    // Bob acted but was never notified
    let bob_list = server.get_json(&bob_token, "/api/notifications").await;
    assert_eq!(bob_list["count"], 0);
}

#[tokio::test]
async fn own_actions_do_not_notify() {
    let server = TestServer::new().await;
    let (_, alice_token) = server.register_user("alice").await;
    let post_id = server.create_post(&alice_token, "Hello", "body").await;

    server
        .client
        .post(server.url(&format!("/api/posts/{}/like", post_id)))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    server
        .client
        .post(server.url(&format!("/api/posts/{}/comments", post_id)))
        .bearer_auth(&alice_token)
        .json(&json!({ "content": "self reply" }))
        .send()
        .await
        .unwrap();

    let body = server.get_json(&alice_token, "/api/notifications").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn listing_marks_notifications_read() {
    let server = TestServer::new().await;
    let (alice_id, alice_token) = server.register_user("alice").await;
    let (_, bob_token) = server.register_user("bob").await;

    server
        .client
        .post(server.url(&format!("/api/accounts/follow/{}", alice_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();

    // First listing shows the unread state at request time
    let first = server.get_json(&alice_token, "/api/notifications").await;
    assert_eq!(first["results"][0]["read"], false);

    // Listing marked it read
    let second = server.get_json(&alice_token, "/api/notifications").await;
    assert_eq!(second["results"][0]["read"], true);
}
