//! Tests for post API handlers.

use super::*;
use crate::domain::{User, VoteTransition};
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::test_utils::{
    MockPorts, sample_user, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use chrono::TimeZone;
use pagination::Page;
use rstest::rstest;
use serde_json::Value;

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .route(
            "/test/sign-in/{id}",
            web::get().to(|session: SessionContext, path: web::Path<Uuid>| async move {
                session.persist_user(&UserId::from_uuid(path.into_inner()))?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        )
        .service(
            web::scope("/api/v1")
                .service(list_posts)
                .service(get_post)
                .service(create_post)
                .service(update_post)
                .service(delete_post)
                .service(vote),
        )
}

fn sign_in_request(id: UserId) -> actix_test::TestRequest {
    actix_test::TestRequest::get().uri(&format!("/test/sign-in/{id}"))
}

fn post_by(author: &User, text: &str) -> Post {
    let at = Utc
        .with_ymd_and_hms(2021, 8, 9, 9, 15, 54)
        .single()
        .expect("valid timestamp");
    Post {
        id: PostId::random(),
        title: "Hello".into(),
        text: text.into(),
        points: 3,
        creator_id: author.id(),
        created_at: at,
        updated_at: at,
    }
}

#[rstest]
#[actix_web::test]
async fn anonymous_listing_hides_emails_and_votes() {
    let author = sample_user("alice");
    let post = post_by(&author, &"x".repeat(80));
    let expected_cursor = format!("{}:{}", post.created_at.timestamp_millis(), post.id);
    let details = PostDetails {
        post,
        creator: author.clone(),
        vote_status: None,
    };
    let mut ports = MockPorts::default();
    ports
        .posts_query
        .expect_list()
        .withf(|viewer, request| viewer.is_none() && request.limit() == 2)
        .return_once(move |_, _| {
            Ok(Page {
                items: vec![details],
                has_more: true,
            })
        });
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?limit=2")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["nextCursor"], expected_cursor.as_str());
    let first = &body["posts"][0];
    assert_eq!(first["textSnippet"].as_str().map(str::len), Some(50));
    assert_eq!(first["points"], 3);
    assert_eq!(first["creator"]["username"], "alice");
    assert_eq!(first["creator"]["email"], "");
    assert!(first["voteStatus"].is_null());
}

#[rstest]
#[actix_web::test]
async fn listing_without_limit_uses_default_page_size() {
    let mut ports = MockPorts::default();
    ports
        .posts_query
        .expect_list()
        .withf(|_, request| {
            request.limit() == 10
                && request.cursor().map(|c| c.as_millis()) == Some(1_628_500_554_962)
        })
        .return_once(|_, _| {
            Ok(Page {
                items: Vec::new(),
                has_more: false,
            })
        });
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?cursor=1628500554962")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["posts"], Value::Array(Vec::new()));
    assert_eq!(body["hasMore"], false);
    assert!(body["nextCursor"].is_null());
}

#[rstest]
#[actix_web::test]
async fn keyed_cursor_reaches_the_query_intact() {
    let last_id = Uuid::from_u128(42);
    let mut ports = MockPorts::default();
    ports
        .posts_query
        .expect_list()
        .withf(move |_, request| {
            request.cursor().is_some_and(|cursor| {
                cursor.as_millis() == 1_628_500_554_962 && cursor.tiebreak() == Some(last_id)
            })
        })
        .return_once(|_, _| {
            Ok(Page {
                items: Vec::new(),
                has_more: false,
            })
        });
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts?cursor=1628500554962:{last_id}"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn malformed_cursor_is_rejected_before_the_query() {
    let mut ports = MockPorts::default();
    ports.posts_query.expect_list().never();
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts?cursor=yesterday")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "cursor");
}

#[rstest]
#[actix_web::test]
async fn author_sees_own_email_and_vote_status() {
    let author = sample_user("alice");
    let id = author.id();
    let post = post_by(&author, "short");
    let post_id = post.id;
    let details = PostDetails {
        post,
        creator: author.clone(),
        vote_status: Some(VoteValue::Up),
    };
    let mut ports = MockPorts::default();
    ports
        .posts_query
        .expect_get()
        .withf(move |viewer, requested| *viewer == Some(id) && *requested == post_id)
        .return_once(move |_, _| Ok(Some(details)));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{post_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["creator"]["email"], "alice@example.com");
    assert_eq!(body["voteStatus"], 1);
    assert_eq!(body["textSnippet"], "short");
}

#[rstest]
#[actix_web::test]
async fn missing_post_reads_as_null() {
    let mut ports = MockPorts::default();
    ports.posts_query.expect_get().return_once(|_, _| Ok(None));
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert!(body.is_null());
}

#[rstest]
#[actix_web::test]
async fn non_uuid_path_is_invalid_request() {
    let mut ports = MockPorts::default();
    ports.posts_query.expect_get().never();
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/posts/42")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::create(actix_test::TestRequest::post().uri("/api/v1/posts").set_json(PostBody { title: "t".into(), text: "x".into() }))]
#[case::vote(actix_test::TestRequest::post().uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6/vote").set_json(VoteBody { value: 1 }))]
#[case::delete(actix_test::TestRequest::delete().uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6"))]
#[case::update(actix_test::TestRequest::put().uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6").set_json(PostBody { title: "t".into(), text: "x".into() }))]
#[actix_web::test]
async fn mutations_require_a_session(#[case] request: actix_test::TestRequest) {
    let mut ports = MockPorts::default();
    ports.posts.expect_create().never();
    ports.posts.expect_update().never();
    ports.posts.expect_delete().never();
    ports.posts.expect_vote().never();
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(&app, request.to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], "not authenticated");
}

#[rstest]
#[actix_web::test]
async fn create_uses_the_session_user_as_creator() {
    let author = sample_user("alice");
    let id = author.id();
    let created = post_by(&author, "World");
    let mut ports = MockPorts::default();
    ports
        .posts
        .expect_create()
        .withf(move |req| req.creator == id && req.title == "Hello" && req.text == "World")
        .return_once(move |_| Ok(created));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .cookie(cookie)
            .set_json(PostBody {
                title: "Hello".into(),
                text: "World".into(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["creatorId"], id.to_string());
    assert_eq!(body["title"], "Hello");
}

#[rstest]
#[actix_web::test]
async fn update_by_non_owner_reads_as_null() {
    let id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .posts
        .expect_update()
        .withf(move |req| req.actor == id)
        .return_once(|_| Ok(None));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{}", Uuid::new_v4()))
            .cookie(cookie)
            .set_json(PostBody {
                title: "t".into(),
                text: "x".into(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert!(body.is_null());
}

#[rstest]
#[actix_web::test]
async fn delete_reports_true() {
    let id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .posts
        .expect_delete()
        .withf(move |actor, _| *actor == id)
        .return_once(|_, _| Ok(true));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/posts/{}", Uuid::new_v4()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, Value::Bool(true));
}

#[rstest]
#[actix_web::test]
async fn vote_forwards_the_raw_value() {
    let id = UserId::random();
    let post_id = PostId::random();
    let mut ports = MockPorts::default();
    ports
        .posts
        .expect_vote()
        .withf(move |req| req.voter == id && req.post_id == post_id && req.value == -5)
        .times(1)
        .return_once(|_| Ok(VoteTransition::Insert(VoteValue::Down)));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/vote"))
            .cookie(cookie)
            .set_json(VoteBody { value: -5 })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, Value::Bool(true));
}

#[rstest]
#[actix_web::test]
async fn vote_on_missing_post_is_not_found() {
    let id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .posts
        .expect_vote()
        .return_once(|_| Err(Error::not_found("post not found")));
    let app = actix_test::init_service(test_app(ports)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(id).to_request()).await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/vote", Uuid::new_v4()))
            .cookie(cookie)
            .set_json(VoteBody { value: 1 })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
