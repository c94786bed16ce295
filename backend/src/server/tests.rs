//! Tests for the application wiring: routes, middleware order, sessions,
//! and readiness signalling, driven through the in-memory adapters.

use std::sync::Arc;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web};
use backend::domain::TRACE_ID_HEADER;
use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::SessionSettings;
use backend::inbound::http::state::HttpState;
use backend::test_support::{FixtureClock, InMemoryForum, PlaintextHasher, RecordingNotifier};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::state_builders::ForumAdapters;
use super::{AppDependencies, ServerConfig, build_app, build_http_state, create_server};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

fn forum_state(forum: &InMemoryForum) -> HttpState {
    let adapters = ForumAdapters {
        users: Arc::new(forum.clone()),
        posts: Arc::new(forum.clone()),
        ledger: Arc::new(forum.clone()),
        tokens: Arc::new(forum.clone()),
        hasher: Arc::new(PlaintextHasher),
        notifier: Arc::new(RecordingNotifier::default()),
    };
    let now = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    build_http_state(adapters, Arc::new(FixtureClock::at(now)), "http://localhost:3000")
}

fn deps(health_state: web::Data<HealthState>, forum: &InMemoryForum) -> AppDependencies {
    AppDependencies {
        health_state,
        http_state: web::Data::new(forum_state(forum)),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
        session_ttl: Duration::hours(1),
    }
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

#[rstest]
#[actix_web::test]
async fn readiness_follows_health_state(health_state: web::Data<HealthState>) {
    let app = actix_test::init_service(build_app(deps(
        health_state.clone(),
        &InMemoryForum::new(),
    )))
    .await;

    let before = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);

    health_state.mark_ready();
    let after = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn api_responses_carry_a_trace_id(health_state: web::Data<HealthState>) {
    let app = actix_test::init_service(build_app(deps(health_state, &InMemoryForum::new()))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn registered_user_can_post_and_vote(health_state: web::Data<HealthState>) {
    let forum = InMemoryForum::new();
    let app = actix_test::init_service(build_app(deps(health_state, &forum))).await;

    let registered = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "email": "bob@example.com",
                "username": "bob",
                "password": "hunter22"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::OK);
    let cookie = session_cookie(&registered);

    let created = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .cookie(cookie.clone())
            .set_json(json!({ "title": "Hello", "text": "First post" }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::OK);
    let post: Value = actix_test::read_body_json(created).await;
    let post_id = post["id"].as_str().expect("post id").to_owned();

    let voted = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/vote"))
            .cookie(cookie.clone())
            .set_json(json!({ "value": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(voted.status(), StatusCode::OK);

    let listed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?limit=5")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let page: Value = actix_test::read_body_json(listed).await;
    assert_eq!(page["hasMore"], json!(false));
    assert_eq!(page["posts"][0]["points"], json!(1));
    assert_eq!(page["posts"][0]["voteStatus"], json!(1));
    assert_eq!(page["posts"][0]["creator"]["email"], json!("bob@example.com"));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_reported_as_invalid_request(health_state: web::Data<HealthState>) {
    let app = actix_test::init_service(build_app(deps(health_state, &InMemoryForum::new()))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], json!("invalid_request"));
}

#[rstest]
#[actix_rt::test]
async fn create_server_binds_and_marks_ready(health_state: web::Data<HealthState>) {
    let forum = InMemoryForum::new();
    let config = ServerConfig::new(
        SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            ttl: Duration::hours(1),
        },
        "127.0.0.1:0".parse().expect("socket address"),
        forum_state(&forum),
    );
    assert_eq!(config.bind_addr().port(), 0);

    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), config).expect("server should bind");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}
