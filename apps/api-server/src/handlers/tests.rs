use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use blog_core::domain::{BlogPost, PostDraft, Section};
use blog_core::ports::{RateLimitError, RateLimitResult, RateLimiter};
use blog_infra::{
    Argon2PasswordService, InMemoryAdminRepository, InMemoryBlogPostRepository, JwtConfig,
    JwtTokenService,
};

use super::configure_app;
use crate::config::BlogSettings;
use crate::observability::RequestIdMiddleware;
use crate::state::{AppState, StorageKind};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .configure(|cfg| configure_app(cfg, &$state)),
        )
        .await
    };
}

struct DenyAll;

#[async_trait]
impl RateLimiter for DenyAll {
    async fn check(&self, _key: &str) -> Result<RateLimitResult, RateLimitError> {
        Ok(RateLimitResult {
            allowed: false,
            reset_after: Duration::from_millis(200),
        })
    }
}

/// Allows the first request of each key and refuses the rest.
#[derive(Default)]
struct OncePerKey {
    seen: Mutex<HashSet<String>>,
}

#[async_trait]
impl RateLimiter for OncePerKey {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let fresh = self.seen.lock().unwrap().insert(key.to_string());
        Ok(RateLimitResult {
            allowed: fresh,
            reset_after: Duration::from_secs(60),
        })
    }
}

fn state_with(rate_limiter: Option<Arc<dyn RateLimiter>>) -> AppState {
    // Cheap parameters keep the register/login tests fast.
    let passwords = Argon2PasswordService::with_params(1024, 1, 1).unwrap();

    AppState::from_parts(
        Arc::new(InMemoryAdminRepository::new()),
        Arc::new(InMemoryBlogPostRepository::new()),
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(passwords),
        rate_limiter,
        BlogSettings::default(),
        StorageKind::Memory,
    )
}

fn bearer(state: &AppState, admin_id: Uuid) -> (header::HeaderName, String) {
    let token = state
        .tokens
        .generate_token(admin_id, "admin@example.com", vec!["admin".to_string()])
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed(state: &AppState, author: Uuid, title: &str, publish: bool) -> BlogPost {
    let draft = PostDraft::new(
        title,
        "An introduction",
        vec![Section::new("Setup", "Install the toolchain.").with_example("rustup update")],
    )
    .unwrap();
    state.blog.create(author, draft, publish).await.unwrap()
}

fn post_body(title: &str) -> Value {
    json!({
        "title": title,
        "introduction": "Why this matters",
        "sections": [
            {"heading": "First", "content": "One", "examples": ["a"]},
            {"heading": "Second", "content": "Two"}
        ]
    })
}

#[actix_web::test]
async fn test_hidden_draft_is_indistinguishable_from_missing_post() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let draft = seed(&state, author, "Unreleased", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/blogs/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let missing = test::read_body(resp).await;

    let requests = [
        test::TestRequest::get().uri(&format!("/api/blogs/{}", draft.id)),
        test::TestRequest::get()
            .uri(&format!("/api/blogs/{}", draft.id))
            .insert_header(bearer(&state, Uuid::new_v4())),
        test::TestRequest::get()
            .uri(&format!("/api/blogs/{}", draft.id))
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token")),
        test::TestRequest::get().uri("/api/blogs/not-a-uuid"),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, missing);
    }

    let body: Value = serde_json::from_slice(&missing).unwrap();
    assert_eq!(body["detail"], "Blog post not found");
}

#[actix_web::test]
async fn test_author_reads_own_draft() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let draft = seed(&state, author, "Work in progress", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/blogs/{}", draft.id))
        .insert_header(bearer(&state, author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], draft.id.to_string());
    assert_eq!(body["isPublished"], false);
    assert!(body["publishedAt"].is_null());
    assert_eq!(body["sections"][0]["examples"][0], "rustup update");
}

#[actix_web::test]
async fn test_writes_require_owner() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Owned", true).await;
    let app = init_app!(state);
    let uri = format!("/api/admin/blogs/{}", post.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(post_body("Hijacked"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let intruder = bearer(&state, Uuid::new_v4());
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(intruder.clone())
        .set_json(post_body("Hijacked"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("{uri}/publish"))
        .insert_header(intruder.clone())
        .set_json(json!({"isPublished": false}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(intruder)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let stored = state.blog.get_visible(post.id, None).await.unwrap();
    assert_eq!(stored, post);
}

#[actix_web::test]
async fn test_publish_toggle_keeps_first_publish_time() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/admin/blogs")
        .insert_header(bearer(&state, author))
        .set_json(post_body("Toggling"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["authorId"], author.to_string());
    assert_eq!(created["isPublished"], false);
    let uri = format!("/api/admin/blogs/{}/publish", created["id"].as_str().unwrap());

    let toggle = |publish: bool| {
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&state, author))
            .set_json(json!({"isPublished": publish}))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, toggle(true)).await;
    let t1 = first["publishedAt"].clone();
    assert!(t1.is_string());

    let hidden: Value = test::call_and_read_body_json(&app, toggle(false)).await;
    assert_eq!(hidden["isPublished"], false);
    assert_eq!(hidden["publishedAt"], t1);

    let again: Value = test::call_and_read_body_json(&app, toggle(true)).await;
    assert_eq!(again["isPublished"], true);
    assert_eq!(again["publishedAt"], t1);
}

#[actix_web::test]
async fn test_update_replaces_sections() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Before", true).await;
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/blogs/{}", post.id))
        .insert_header(bearer(&state, author))
        .set_json(post_body("  After  "))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["title"], "After");
    assert_eq!(body["sections"].as_array().unwrap().len(), 2);
    assert_eq!(body["sections"][1]["heading"], "Second");
    assert_eq!(body["isPublished"], true);
}

#[actix_web::test]
async fn test_public_listing_pages_published_posts() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    for i in 0..13 {
        seed(&state, author, &format!("Post {i}"), true).await;
    }
    seed(&state, author, "Draft", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/blogs?page=3&limit=6")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalCount"], 13);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 3);

    let req = test::TestRequest::get()
        .uri("/api/blogs?page=4&limit=6")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/blogs?page=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["totalCount"], 13);

    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pageSize"], 6);
    assert_eq!(body["currentPage"], 1);

    let req = test::TestRequest::get()
        .uri("/api/blogs?page=0&limit=1000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pageSize"], 50);
    assert_eq!(body["currentPage"], 1);

    let req = test::TestRequest::get()
        .uri("/api/admin/blogs")
        .insert_header(bearer(&state, author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalCount"], 14);
}

#[actix_web::test]
async fn test_invalid_bodies() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/admin/blogs")
        .insert_header(bearer(&state, author))
        .set_json(json!({"title": "   ", "introduction": "", "sections": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("title"));
    assert!(detail.contains("introduction"));

    let req = test::TestRequest::post()
        .uri("/api/admin/blogs")
        .insert_header(bearer(&state, author))
        .insert_header(header::ContentType::json())
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_delete_is_permanent() {
    let state = state_with(None);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Short lived", true).await;
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/blogs/{}", post.id))
        .insert_header(bearer(&state, author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], post.id.to_string());

    let req = test::TestRequest::get()
        .uri(&format!("/api/blogs/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/blogs/{}", post.id))
        .insert_header(bearer(&state, author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let state = state_with(None);
    let app = init_app!(state);
    let credentials = json!({"email": " Editor@Example.com ", "password": "correct horse"});

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Email already registered");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "editor@example.com", "password": "wrong password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&credentials)
        .to_request();
    let auth: Value = test::call_and_read_body_json(&app, req).await;
    let token = auth["access_token"].as_str().unwrap();
    assert_eq!(auth["token_type"], "Bearer");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["email"], "editor@example.com");
    assert_eq!(me["roles"][0], "admin");
}

#[actix_web::test]
async fn test_register_rejects_weak_input() {
    let state = state_with(None);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "nobody", "password": "short"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_rate_limited_login_returns_retry_after() {
    let state = state_with(Some(Arc::new(DenyAll)));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@example.com", "password": "whatever1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get("Retry-After").unwrap(), "1");

    // Reads are not limited.
    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_request_id_is_echoed_or_generated() {
    let state = state_with(None);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("x-request-id", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-42");

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("x-request-id", "has spaces"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["storage"], "memory");
}

async fn login_statuses(state: AppState, peer: SocketAddr) -> Vec<StatusCode> {
    let app = init_app!(state);
    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer)
            .insert_header(("X-Forwarded-For", format!("203.0.113.{i}")))
            .set_json(json!({"email": "a@example.com", "password": "whatever1"}))
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }
    statuses
}

#[actix_web::test]
async fn test_forwarded_header_does_not_reset_login_limit() {
    let state = state_with(Some(Arc::new(OncePerKey::default())));
    let statuses = login_statuses(state, "198.51.100.7:40000".parse().unwrap()).await;

    assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
    assert!(
        statuses[1..]
            .iter()
            .all(|s| *s == StatusCode::TOO_MANY_REQUESTS)
    );
}

#[actix_web::test]
async fn test_trusted_proxy_forwards_client_address() {
    let mut state = state_with(Some(Arc::new(OncePerKey::default())));
    state.settings.trusted_proxies = vec!["10.0.0.2".parse().unwrap()];
    let statuses = login_statuses(state, "10.0.0.2:40000".parse().unwrap()).await;

    assert!(statuses.iter().all(|s| *s == StatusCode::UNAUTHORIZED));
}
