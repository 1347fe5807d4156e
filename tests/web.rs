//! End-to-end tests against a live PostgreSQL instance.
//!
//! These are ignored by default; run them with a database at
//! hand:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/quill_test cargo test -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::{self, AUTHORIZATION};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use std::num::{NonZeroU32, NonZeroU64};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use quill::config;
use quill::http::Jwt;
use quill::types::id::UserId;
use quill::util::Sensitive;
use quill::App;

const JWT_SECRET: &str = "integration-test-signing-secret";

fn test_config() -> config::Server {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a test database to run these");

    config::Server {
        ip: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        port: 0,
        workers: 1,
        db: config::Database {
            primary: config::DbPoolConfig {
                min_idle: None,
                pool_size: NonZeroU32::new(5).unwrap(),
                url: Sensitive::new(url),
            },
            replica: None,
            enforce_tls: false,
            timeout_secs: NonZeroU64::new(5).unwrap(),
        },
        jwt_secret: Sensitive::new(JWT_SECRET.to_string()),
        posts_per_page: NonZeroU32::new(10).unwrap(),
        home_cache_ttl_secs: NonZeroU64::new(60).unwrap(),
    }
}

async fn setup() -> App {
    let app = App::new(test_config()).await.unwrap();
    app.primary_db.migrate().await.unwrap();
    app
}

async fn service(
    app: &App,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .configure(quill::http::controllers::configure),
    )
    .await
}

/// Usernames must be unique across test runs sharing a database.
fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{nanos}_{n}")
}

async fn seed_user(app: &App, name: &str) -> (UserId, String) {
    let mut conn = app.db_write().await.unwrap();
    let id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO "users" (name, password_hash) VALUES ($1, '!') RETURNING id"#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .unwrap();

    let id = UserId::new(u64::try_from(id).unwrap());
    let token = Jwt::encode(id, JWT_SECRET).unwrap();
    (id, token)
}

async fn seed_post(app: &App, author: UserId, text: &str) -> i64 {
    let mut conn = app.db_write().await.unwrap();
    sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO "posts" (text, author_id) VALUES ($1, $2) RETURNING id"#,
    )
    .bind(text)
    .bind(i64::try_from(author.get()).unwrap())
    .fetch_one(&mut *conn)
    .await
    .unwrap()
}

async fn count_posts_by(app: &App, author: UserId) -> i64 {
    let mut conn = app.db_read().await.unwrap();
    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "posts" WHERE author_id = $1"#)
        .bind(i64::try_from(author.get()).unwrap())
        .fetch_one(&mut *conn)
        .await
        .unwrap()
}

async fn count_follows(app: &App, user: UserId) -> i64 {
    let mut conn = app.db_read().await.unwrap();
    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "follows" WHERE user_id = $1"#)
        .bind(i64::try_from(user.get()).unwrap())
        .fetch_one(&mut *conn)
        .await
        .unwrap()
}

async fn comment_authors(app: &App, post_id: i64) -> Vec<i64> {
    let mut conn = app.db_read().await.unwrap();
    sqlx::query_scalar::<_, i64>(
        r#"SELECT author_id FROM "comments" WHERE post_id = $1 ORDER BY id"#,
    )
    .bind(post_id)
    .fetch_all(&mut *conn)
    .await
    .unwrap()
}

fn location(response: &ServiceResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn creating_a_post_adds_exactly_one_owned_by_the_caller() {
    let app = setup().await;
    let srv = service(&app).await;

    let name = unique_name("alice");
    let (alice, token) = seed_user(&app, &name).await;
    assert_eq!(count_posts_by(&app, alice).await, 0);

    let request = test::TestRequest::post()
        .uri("/create/")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(serde_json::json!({ "text": "first!" }))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/profile/{name}/"));
    assert_eq!(count_posts_by(&app, alice).await, 1);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn anonymous_writes_redirect_to_login_and_change_nothing() {
    let app = setup().await;
    let srv = service(&app).await;

    let name = unique_name("bob");
    let (bob, _) = seed_user(&app, &name).await;
    let before = count_posts_by(&app, bob).await;

    let request = test::TestRequest::post()
        .uri("/create/")
        .set_json(serde_json::json!({ "text": "should not land" }))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/auth/login/?next=%2Fcreate%2F");
    assert_eq!(count_posts_by(&app, bob).await, before);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn non_authors_cannot_edit_and_are_redirected_to_detail() {
    let app = setup().await;
    let srv = service(&app).await;

    let (author, _) = seed_user(&app, &unique_name("author")).await;
    let (_, intruder_token) = seed_user(&app, &unique_name("intruder")).await;
    let post_id = seed_post(&app, author, "original text").await;

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/edit/"))
        .insert_header((AUTHORIZATION, format!("Bearer {intruder_token}")))
        .set_json(serde_json::json!({ "text": "hijacked" }))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let mut conn = app.db_read().await.unwrap();
    let text = sqlx::query_scalar::<_, String>(r#"SELECT text FROM "posts" WHERE id = $1"#)
        .bind(post_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(text, "original text");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn unknown_resources_answer_with_a_branded_404() {
    let app = setup().await;
    let srv = service(&app).await;

    let missing = unique_name("nobody");
    for uri in [
        format!("/group/{missing}/"),
        format!("/profile/{missing}/"),
        "/posts/987654321/".to_string(),
    ] {
        let request = test::TestRequest::get().uri(&uri).to_request();
        let response = test::call_service(&srv, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "not_found", "GET {uri}");
    }
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn comments_attach_to_the_post_owned_by_the_caller() {
    let app = setup().await;
    let srv = service(&app).await;

    let (author, _) = seed_user(&app, &unique_name("poster")).await;
    let (commenter, token) = seed_user(&app, &unique_name("commenter")).await;
    let post_id = seed_post(&app, author, "come discuss").await;

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comment/"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(serde_json::json!({ "text": "great post" }))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let authors = comment_authors(&app, post_id).await;
    assert_eq!(authors, vec![i64::try_from(commenter.get()).unwrap()]);

    let request = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&srv, request).await;
    assert_eq!(body["comments"][0]["text"], "great post");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn blank_comments_are_dropped_but_still_redirect() {
    let app = setup().await;
    let srv = service(&app).await;

    let (author, _) = seed_user(&app, &unique_name("poster")).await;
    let (_, token) = seed_user(&app, &unique_name("lurker")).await;
    let post_id = seed_post(&app, author, "quiet thread").await;

    let request = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comment/"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(serde_json::json!({ "text": "   " }))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));
    assert!(comment_authors(&app, post_id).await.is_empty());
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn follow_edges_are_idempotent_and_reversible() {
    let app = setup().await;
    let srv = service(&app).await;

    let (viewer, token) = seed_user(&app, &unique_name("viewer")).await;
    let author_name = unique_name("writer");
    seed_user(&app, &author_name).await;
    let before = count_follows(&app, viewer).await;

    for _ in 0..2 {
        let request = test::TestRequest::post()
            .uri(&format!("/profile/{author_name}/follow/"))
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let response = test::call_service(&srv, request).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }
    // duplicate edge suppressed
    assert_eq!(count_follows(&app, viewer).await, before + 1);

    let request = test::TestRequest::post()
        .uri(&format!("/profile/{author_name}/unfollow/"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(count_follows(&app, viewer).await, before);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn self_follow_is_suppressed() {
    let app = setup().await;
    let srv = service(&app).await;

    let name = unique_name("narcissus");
    let (user, token) = seed_user(&app, &name).await;

    let request = test::TestRequest::post()
        .uri(&format!("/profile/{name}/follow/"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();

    let response = test::call_service(&srv, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(count_follows(&app, user).await, 0);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn follow_feed_contains_exactly_followed_authors_newest_first() {
    let app = setup().await;
    let srv = service(&app).await;

    let (_, token) = seed_user(&app, &unique_name("reader")).await;
    let followed_name = unique_name("followed");
    let (followed, _) = seed_user(&app, &followed_name).await;
    let (stranger, _) = seed_user(&app, &unique_name("stranger")).await;

    seed_post(&app, followed, "older").await;
    seed_post(&app, followed, "newer").await;
    seed_post(&app, stranger, "noise").await;

    let request = test::TestRequest::post()
        .uri(&format!("/profile/{followed_name}/follow/"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    test::call_service(&srv, request).await;

    let request = test::TestRequest::get()
        .uri("/follow/")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&srv, request).await;

    let items = body["page"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["text"], "newer");
    assert_eq!(items[1]["text"], "older");
    for item in items {
        assert_eq!(item["author"], followed_name.as_str());
    }
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn thirteen_posts_paginate_as_ten_plus_three() {
    let app = setup().await;
    let srv = service(&app).await;

    let name = unique_name("prolific");
    let (author, _) = seed_user(&app, &name).await;
    for n in 0..13 {
        seed_post(&app, author, &format!("post {n}")).await;
    }

    let request = test::TestRequest::get()
        .uri(&format!("/profile/{name}/?page=1"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&srv, request).await;
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["page"]["total_pages"], 2);

    let request = test::TestRequest::get()
        .uri(&format!("/profile/{name}/?page=2"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&srv, request).await;
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database"]
async fn home_feed_stays_stale_until_the_cache_is_cleared() {
    let app = setup().await;
    let srv = service(&app).await;

    let (author, _) = seed_user(&app, &unique_name("cached")).await;

    let request = test::TestRequest::get().uri("/").to_request();
    let first = test::call_and_read_body(&srv, request).await;

    seed_post(&app, author, "written after the cache warmed").await;

    // the write does not invalidate; the stale body is served
    let request = test::TestRequest::get().uri("/").to_request();
    let second = test::call_and_read_body(&srv, request).await;
    assert_eq!(first, second);

    app.page_cache.clear();

    let request = test::TestRequest::get().uri("/").to_request();
    let third = test::call_and_read_body(&srv, request).await;
    assert_ne!(first, third);
}
