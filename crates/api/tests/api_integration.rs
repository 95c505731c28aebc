//! API integration tests.
//!
//! These drive the full `/api` router (auth and rate limiting included)
//! against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, TimeZone, Utc};
use founders_api::{AppState, RateLimiterState, app};
use founders_common::TokenSigner;
use founders_core::{FeedService, PollService, StatusService, UpdateService, UserService};
use founders_db::entities::{
    poll, poll_option, poll_vote,
    status::{self, PresenceStatus},
    update, user,
};
use founders_db::repositories::{
    PollOptionRepository, PollRepository, PollVoteRepository, StatusRepository, UpdateRepository,
    UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";
const USER_ID: &str = "01HQ3V5K8Y9Z0A1B2C3D4E5F6G";
const POLL_ID: &str = "01HQ3V5K8Y9Z0A1B2C3D4E5F6H";
const OPTION_ID: &str = "01HQ3V5K8Y9Z0A1B2C3D4E5F6J";

fn signer() -> TokenSigner {
    TokenSigner::new(SECRET, Duration::days(7))
}

fn test_user() -> user::Model {
    user::Model {
        id: USER_ID.to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        startup_name: "Engines".to_string(),
        startup_url: Some("https://engines.example.com".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into(),
        updated_at: None,
    }
}

fn test_poll() -> poll::Model {
    poll::Model {
        id: POLL_ID.to_string(),
        user_id: USER_ID.to_string(),
        question: "Pizza or tacos?".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap().into(),
    }
}

fn test_option(votes: i32) -> poll_option::Model {
    poll_option::Model {
        id: OPTION_ID.to_string(),
        poll_id: POLL_ID.to_string(),
        text: "Pizza".to_string(),
        position: 0,
        votes,
    }
}

fn test_update() -> update::Model {
    update::Model {
        id: "01HQ3V5K8Y9Z0A1B2C3D4E5F6M".to_string(),
        user_id: USER_ID.to_string(),
        content: "Shipped the beta".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 2, 8, 30, 0).unwrap().into(),
    }
}

fn token_for(user: &user::Model) -> String {
    signer().issue(&user.id, &user.email, &user.name).unwrap()
}

/// Create test app state over a single mock connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let status_repo = StatusRepository::new(Arc::clone(&db));
    let update_repo = UpdateRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let option_repo = PollOptionRepository::new(Arc::clone(&db));
    let vote_repo = PollVoteRepository::new(Arc::clone(&db));

    let update_service = UpdateService::new(update_repo.clone(), user_repo.clone());
    let poll_service = PollService::new(poll_repo, option_repo, vote_repo, user_repo.clone());

    AppState {
        user_service: UserService::new(user_repo.clone(), status_repo.clone(), update_repo, signer()),
        status_service: StatusService::new(user_repo, status_repo),
        feed_service: FeedService::new(update_service.clone(), poll_service.clone()),
        update_service,
        poll_service,
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn create_app(db: DatabaseConnection) -> Router {
    app(create_test_state(db), RateLimiterState::new())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let routes = [
        (Method::GET, "/api/user/profile"),
        (Method::GET, "/api/users/01HQ3V5K8Y9Z0A1B2C3D4E5F6G"),
        (Method::GET, "/api/status"),
        (Method::PUT, "/api/status/update"),
        (Method::GET, "/api/updates"),
        (Method::POST, "/api/updates"),
        (Method::GET, "/api/polls"),
        (Method::POST, "/api/polls"),
        (Method::POST, "/api/polls/01HQ3V5K8Y9Z0A1B2C3D4E5F6H/vote"),
        (Method::GET, "/api/feed"),
    ];

    for (method, uri) in routes {
        let body = (method != Method::GET).then_some("{}");
        let response = create_app(empty_db())
            .oneshot(request(method.clone(), uri, None, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(
            json_body(response).await,
            json!({"error": "Authentication required"}),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_invalid_token() {
    let other = TokenSigner::new("some-other-secret", Duration::days(7))
        .issue(USER_ID, "ada@example.com", "Ada")
        .unwrap();

    let response = create_app(empty_db())
        .oneshot(request(Method::GET, "/api/status", Some(&other), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({"error": "Invalid token"}));
}

#[tokio::test]
async fn test_token_for_deleted_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(Method::GET, "/api/feed", Some(&token_for(&test_user())), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "User not found"}));
}

#[tokio::test]
async fn test_current_user_profile() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(Method::GET, "/api/user/profile", Some(&token_for(&user)), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "user": {
                "id": USER_ID,
                "name": "Ada",
                "email": "ada@example.com",
                "startupName": "Engines",
                "startupUrl": "https://engines.example.com",
            }
        })
    );
}

#[tokio::test]
async fn test_status_board() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![status::Model {
            user_id: USER_ID.to_string(),
            status: PresenceStatus::InOffice,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap().into(),
        }]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(Method::GET, "/api/status", Some(&token_for(&user)), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "users": [{
                "id": USER_ID,
                "name": "Ada",
                "startupName": "Engines",
                "status": {"status": "In Office", "updatedAt": "2024-03-01T09:00:00+00:00"},
            }]
        })
    );
}

#[tokio::test]
async fn test_invalid_status_rejected() {
    let user = test_user();

    for body in [r#"{"status":"Remote"}"#, "{}"] {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let response = create_app(db)
            .oneshot(request(
                Method::PUT,
                "/api/status/update",
                Some(&token_for(&user)),
                Some(body),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json_body(response).await, json!({"error": "Invalid status"}));
    }
}

#[tokio::test]
async fn test_second_vote_rejected() {
    let user = test_user();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![test_poll()]])
        .append_query_results([vec![test_option(1)]])
        .append_query_results([vec![poll_vote::Model {
            id: "01HQ3V5K8Y9Z0A1B2C3D4E5F6K".to_string(),
            poll_id: POLL_ID.to_string(),
            option_id: OPTION_ID.to_string(),
            user_id: USER_ID.to_string(),
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(
            Method::POST,
            &format!("/api/polls/{POLL_ID}/vote"),
            Some(&token_for(&user)),
            Some(&json!({"optionId": OPTION_ID}).to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "You have already voted on this poll"})
    );
}

#[tokio::test]
async fn test_vote_counts_once() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![test_poll()]])
        .append_query_results([vec![test_option(0)]])
        .append_query_results([Vec::<poll_vote::Model>::new()])
        .append_query_results([vec![poll_vote::Model {
            id: "01HQ3V5K8Y9Z0A1B2C3D4E5F6K".to_string(),
            poll_id: POLL_ID.to_string(),
            option_id: OPTION_ID.to_string(),
            user_id: USER_ID.to_string(),
            created_at: Utc::now().into(),
        }]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![test_option(1)]])
        .append_query_results([vec![user.clone()]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(
            Method::POST,
            &format!("/api/polls/{POLL_ID}/vote"),
            Some(&token_for(&user)),
            Some(&json!({"optionId": OPTION_ID}).to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["poll"]["id"], POLL_ID);
    assert_eq!(
        body["poll"]["options"],
        json!([{"id": OPTION_ID, "text": "Pizza", "votes": 1, "pollId": POLL_ID}])
    );
}

#[tokio::test]
async fn test_feed_mixes_updates_and_polls() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![test_update()]])
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![test_poll()]])
        .append_query_results([[maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(11))
        }]])
        .append_query_results([vec![test_option(2)]])
        .append_query_results([vec![user.clone()]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(Method::GET, "/api/feed?page=1", Some(&token_for(&user)), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["kind"], "update");
    assert_eq!(body["items"][0]["content"], "Shipped the beta");
    assert_eq!(body["items"][0]["user"]["startupName"], "Engines");
    assert_eq!(body["items"][1]["kind"], "poll");
    assert_eq!(body["items"][1]["options"][0]["votes"], 2);
}

#[tokio::test]
async fn test_post_update_is_created() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![test_update()]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(
            Method::POST,
            "/api/updates",
            Some(&token_for(&user)),
            Some(r#"{"content":"  Shipped the beta  "}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["update"]["content"], "Shipped the beta");
    assert_eq!(body["update"]["userId"], USER_ID);
    assert_eq!(
        body["update"]["user"],
        json!({"id": USER_ID, "name": "Ada", "startupName": "Engines"})
    );
}

#[tokio::test]
async fn test_register_creates_user() {
    let user = test_user();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([vec![user.clone()]])
        .append_query_results([vec![status::Model {
            user_id: USER_ID.to_string(),
            status: PresenceStatus::OutOfOffice,
            updated_at: Utc::now().into(),
        }]])
        .into_connection();

    let response = create_app(db)
        .oneshot(request(
            Method::POST,
            "/api/register",
            None,
            Some(
                &json!({
                    "name": "Ada",
                    "email": "Ada@Example.com",
                    "password": "correct horse",
                    "startupName": "Engines",
                    "startupUrl": "https://engines.example.com",
                })
                .to_string(),
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["startupName"], "Engines");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_register_missing_fields() {
    let response = create_app(empty_db())
        .oneshot(request(
            Method::POST,
            "/api/register",
            None,
            Some(r#"{"name":"Ada","email":"ada@example.com"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Missing required fields"}));
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let response = create_app(empty_db())
        .oneshot(request(Method::POST, "/api/login", None, Some(r#"{"email":""}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Email and password are required"})
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = create_app(empty_db())
        .oneshot(request(Method::POST, "/api/login", None, Some("{not json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let response = create_app(empty_db())
        .oneshot(request(Method::GET, "/api/nonexistent", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = create_app(empty_db());

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/api/login", None, Some("{}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-ratelimit-remaining"));
    }

    let response = app
        .oneshot(request(Method::POST, "/api/login", None, Some("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(json_body(response).await, json!({"error": "Too many requests"}));
}
