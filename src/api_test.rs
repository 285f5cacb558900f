use axum::http::Method as StubMethod;
use serde_json::Value;

use super::*;
use crate::storage::MemoryTokenStorage;
use crate::test_support::{StubRoute, StubServer};

const IDEAS_BEFORE: &str = r#"[{"id":1,"title":"X","description":"Y","likes":0}]"#;
const IDEAS_AFTER: &str = r#"[{"id":1,"title":"X","description":"Y","likes":1}]"#;

#[test]
fn idea_like_endpoint_formats_expected_path() {
    assert_eq!(idea_like_endpoint(42), "/ideas/42/like");
}

#[tokio::test]
async fn list_ideas_decodes_server_list() {
    let stub = StubServer::start(vec![StubRoute::new(StubMethod::GET, IDEAS_PATH, 200, IDEAS_BEFORE)]).await;
    let (http, _session) = stub.client(MemoryTokenStorage::new());

    let ideas = list_ideas(&http).await.unwrap();
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].title, "X");
    assert_eq!(ideas[0].likes, 0);
}

#[tokio::test]
async fn create_idea_posts_title_and_description() {
    let stub = StubServer::start(vec![StubRoute::new(StubMethod::POST, IDEAS_PATH, 201, r#"{"id":5,"title":"X"}"#)]).await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));

    create_idea(&http, &NewIdea::new("X", Some("Y".to_owned()))).await.unwrap();

    let seen = stub.last();
    let sent: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(sent, serde_json::json!({"title": "X", "description": "Y"}));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer t"));
}

#[tokio::test]
async fn create_idea_server_error_is_http_error() {
    let stub = StubServer::start(vec![StubRoute::new(StubMethod::POST, IDEAS_PATH, 500, "")]).await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));

    let err = create_idea(&http, &NewIdea::new("X", Some("Y".to_owned()))).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn create_idea_blank_title_sends_nothing() {
    let stub = StubServer::start(vec![]).await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));

    let err = create_idea(&http, &NewIdea::new("  ", None)).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert!(stub.seen().is_empty());
}

#[tokio::test]
async fn like_idea_refetches_list() {
    let stub = StubServer::start(vec![
        StubRoute::new(StubMethod::POST, "/ideas/1/like", 200, r#"{"id":1,"title":"X","likes":99}"#),
        StubRoute::new(StubMethod::GET, IDEAS_PATH, 200, IDEAS_AFTER),
    ])
    .await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));

    let ideas = like_idea(&http, 1).await.unwrap();
    assert_eq!(ideas[0].likes, 1);

    let paths: Vec<_> = stub.seen().into_iter().map(|r| (r.method, r.path)).collect();
    assert_eq!(
        paths,
        vec![("POST".to_owned(), "/ideas/1/like".to_owned()), ("GET".to_owned(), "/ideas".to_owned())]
    );
}

#[tokio::test]
async fn like_idea_missing_idea_does_not_refetch() {
    let stub = StubServer::start(vec![StubRoute::new(
        StubMethod::POST,
        "/ideas/9/like",
        404,
        r#"{"detail":"Idea not found"}"#,
    )])
    .await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));

    let err = like_idea(&http, 9).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(stub.seen().len(), 1);
}

#[tokio::test]
async fn protected_calls_without_token_issue_no_request() {
    let stub = StubServer::start(vec![]).await;
    let (http, _session) = stub.client(MemoryTokenStorage::new());

    assert!(matches!(list_users(&http).await, Err(ClientError::UnauthenticatedAccess { .. })));
    assert!(matches!(current_user(&http).await, Err(ClientError::UnauthenticatedAccess { .. })));
    assert!(matches!(like_idea(&http, 1).await, Err(ClientError::UnauthenticatedAccess { .. })));
    assert!(matches!(
        create_idea(&http, &NewIdea::new("X", None)).await,
        Err(ClientError::UnauthenticatedAccess { .. })
    ));
    assert!(stub.seen().is_empty());
}

#[tokio::test]
async fn list_users_with_token_decodes_users() {
    let stub = StubServer::start(vec![StubRoute::new(
        StubMethod::GET,
        USERS_PATH,
        200,
        r#"[{"id":1,"username":"demo"},{"id":2,"username":"ana"}]"#,
    )])
    .await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("abc123"));

    let users = list_users(&http).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["demo", "ana"]);
    assert_eq!(stub.last().authorization.as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn current_user_decodes_profile() {
    let stub =
        StubServer::start(vec![StubRoute::new(StubMethod::GET, CURRENT_USER_PATH, 200, r#"{"id":1,"username":"demo"}"#)])
            .await;
    let (http, _session) = stub.client(MemoryTokenStorage::with_token("t"));
    assert_eq!(current_user(&http).await.unwrap().username, "demo");
}

#[tokio::test]
async fn health_reports_status() {
    let stub = StubServer::start(vec![StubRoute::new(
        StubMethod::GET,
        HEALTH_PATH,
        200,
        r#"{"status":"ok","timestamp":"2025-01-01T00:00:00+00:00"}"#,
    )])
    .await;
    let (http, _session) = stub.client(MemoryTokenStorage::new());
    assert!(health(&http).await.unwrap().is_ok());
}
