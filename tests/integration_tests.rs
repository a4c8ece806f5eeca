//! Integration tests for the Vailite site server
//!
//! These tests boot the full router on an ephemeral port against a
//! temporary copy of the shipped locales and drive it over HTTP.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use vailite_site::adventure::DisabledNarrator;
use vailite_site::config::Config;
use vailite_site::content::FileContentStore;
use vailite_site::publish::{PublishError, PublishOutcome, PublishTrigger};
use vailite_site::server::{build_router, AppState};

const PASSWORD: &str = "test-admin-password";

// ==================== Test Helpers ====================

const SESSION_TTL: &str = "3600";

/// Publisher that reports nothing to publish after `delay` and counts calls.
#[derive(Default)]
struct CountingPublisher {
    calls: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl PublishTrigger for CountingPublisher {
    async fn publish(&self) -> Result<PublishOutcome, PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(PublishOutcome::NothingToPublish)
    }
}

struct TestServer {
    base: String,
    state: AppState,
    client: Client,
    locales: TempDir,
    publisher: Arc<CountingPublisher>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn stored_bytes(&self, lang: &str) -> Vec<u8> {
        std::fs::read(self.locales.path().join(lang).join("common.json"))
            .expect("Failed to read stored document")
    }

    async fn login(&self) -> String {
        let body: Value = self
            .client
            .post(self.url("/api/admin/login"))
            .json(&json!({ "password": PASSWORD }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("login returned no token").to_string()
    }

    async fn admin_post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn seed_locales(dir: &Path) {
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("locales");
    for lang in ["ru", "en"] {
        std::fs::create_dir_all(dir.join(lang)).unwrap();
        std::fs::copy(
            shipped.join(lang).join("common.json"),
            dir.join(lang).join("common.json"),
        )
        .expect("Failed to seed locales");
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_with(SESSION_TTL, Duration::ZERO).await
}

async fn spawn_server_with(session_ttl_secs: &str, publish_delay: Duration) -> TestServer {
    let locales = TempDir::new().unwrap();
    seed_locales(locales.path());

    let locales_dir = locales.path().to_string_lossy().to_string();
    let config = Config::from_lookup(|name| match name {
        "ADMIN_PASSWORD" => Some(PASSWORD.to_string()),
        "LOCALES_DIR" => Some(locales_dir.clone()),
        "CONTACT_DELAY_MS" | "QUICK_CONSULTATION_DELAY_MS" => Some("0".to_string()),
        "ADMIN_SESSION_TTL_SECS" => Some(session_ttl_secs.to_string()),
        _ => None,
    })
    .unwrap();

    let publisher = Arc::new(CountingPublisher {
        calls: AtomicUsize::new(0),
        delay: publish_delay,
    });
    let state = AppState::new(
        config,
        Arc::new(FileContentStore::new(locales.path())),
        publisher.clone(),
        Arc::new(DisabledNarrator),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        state,
        client: Client::new(),
        locales,
        publisher,
    }
}

// ==================== Public Site Tests ====================

#[tokio::test]
async fn test_health_and_languages() {
    let server = spawn_server().await;

    let health: Value = server.client.get(server.url("/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");

    let languages: Value = server
        .client
        .get(server.url("/api/languages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let codes: Vec<&str> = languages
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["ru", "en"]);
    assert_eq!(languages[0]["isCanonical"], true);
}

#[tokio::test]
async fn test_public_content_read() {
    let server = spawn_server().await;

    let response = server.client.get(server.url("/api/content/en")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["hero"]["title"], "VAIlite");
    // Renderer-only labels pass through
    assert_eq!(body["contact"]["submit"], "Send request");
    assert_eq!(body["pricing"]["featured"], "Popular");
}

#[tokio::test]
async fn test_unknown_language_is_not_found() {
    let server = spawn_server().await;

    let response = server.client.get(server.url("/api/content/xx")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    let response = server.client.get(server.url("/api/content/..%2Fetc")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_form_validation_and_success() {
    let server = spawn_server().await;
    let url = server.url("/api/contact");

    let response = server
        .client
        .post(&url)
        .json(&json!({ "name": "Anna", "email": "anna@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(&url)
        .json(&json!({
            "name": "Anna",
            "email": "not-an-email",
            "phone": "+7 900 000-00-00",
            "language": "en"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(&url)
        .json(&json!({
            "name": "Anna",
            "email": "anna@example.com",
            "phone": "+7 900 000-00-00",
            "plan": "start"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_quick_consultation_needs_phone_or_email() {
    let server = spawn_server().await;
    let url = server.url("/api/quick-consultation");

    let response = server
        .client
        .post(&url)
        .json(&json!({ "phone": "   ", "email": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(&url)
        .json(&json!({ "phone": "+7 900 000-00-00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_adventure_falls_back_without_ai() {
    let server = spawn_server().await;

    let response = server.client.post(server.url("/api/adventure/start")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["imageUrl"], "");
    assert!(body["story"].as_str().is_some_and(|s| !s.is_empty()));

    let response = server
        .client
        .post(server.url("/api/adventure/action"))
        .json(&json!({ "previousScene": "A dark cave." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(server.url("/api/adventure/action"))
        .json(&json!({ "command": "look around", "previousScene": "A dark cave." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ==================== Admin Auth Tests ====================

#[tokio::test]
async fn test_admin_requires_session() {
    let server = spawn_server().await;
    let before = server.stored_bytes("ru");

    let response = server
        .client
        .post(server.url("/api/admin/content"))
        .json(&json!({ "language": "ru", "content": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .client
        .get(server.url("/api/admin/content?lang=ru"))
        .bearer_auth("made-up-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server.client.post(server.url("/api/admin/deploy")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(server.stored_bytes("ru"), before);
    assert_eq!(server.publisher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let server = spawn_server().await;

    let response = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "password": "guess" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let server = spawn_server().await;
    let token = server.login().await;

    let (status, _) = server.admin_post(&token, "/api/admin/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let response = server
        .client
        .get(server.url("/api/admin/editor"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ==================== Admin Content Tests ====================

#[tokio::test]
async fn test_admin_write_then_read_round_trip() {
    let server = spawn_server().await;
    let token = server.login().await;

    let mut document: Value = server
        .client
        .get(server.url("/api/admin/content?lang=en"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    document["footer"]["copyright"] = json!("© 2026 VAIlite");

    let (status, body) = server
        .admin_post(
            &token,
            "/api/admin/content",
            json!({ "language": "en", "content": document }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let stored: Value = server
        .client
        .get(server.url("/api/content/en"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, document);
}

#[tokio::test]
async fn test_admin_write_creates_new_language() {
    let server = spawn_server().await;
    let token = server.login().await;

    let document: Value =
        serde_json::from_slice(&server.stored_bytes("en")).unwrap();
    let (status, _) = server
        .admin_post(
            &token,
            "/api/admin/content",
            json!({ "language": "de", "content": document }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let response = server.client.get(server.url("/api/content/de")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_write_rejects_malformed_documents() {
    let server = spawn_server().await;
    let token = server.login().await;
    let before = server.stored_bytes("en");
    let valid: Value = serde_json::from_slice(&before).unwrap();

    let mut fourth_plan = valid.clone();
    fourth_plan["pricing"]["plans"]["enterprise"] = valid["pricing"]["plans"]["pro"].clone();

    let mut bad_rating = valid.clone();
    bad_rating["testimonials"]["items"][0]["rating"] = json!(9);

    let mut missing_section = valid.clone();
    missing_section.as_object_mut().unwrap().remove("footer");

    for (case, content) in [
        ("fourth plan", fourth_plan),
        ("rating 9", bad_rating),
        ("missing footer", missing_section),
    ] {
        let (status, body) = server
            .admin_post(
                &token,
                "/api/admin/content",
                json!({ "language": "en", "content": content }),
            )
            .await;
        assert!(status.is_client_error(), "{} was accepted: {}", case, status);
        assert_eq!(body["success"], false, "{}", case);
        assert_eq!(server.stored_bytes("en"), before, "{} touched the store", case);
    }
}

#[tokio::test]
async fn test_admin_lists_stored_languages() {
    let server = spawn_server().await;
    let token = server.login().await;

    let document: Value = serde_json::from_slice(&server.stored_bytes("en")).unwrap();
    server
        .admin_post(
            &token,
            "/api/admin/content",
            json!({ "language": "de", "content": document }),
        )
        .await;

    let body: Value = server
        .client
        .get(server.url("/api/admin/languages"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["languages"], json!(["de", "en", "ru"]));
}

#[tokio::test]
async fn test_deploy_with_nothing_pending_succeeds() {
    let server = spawn_server().await;
    let token = server.login().await;

    let (status, body) = server.admin_post(&token, "/api/admin/deploy", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No changes to deploy");
    assert_eq!(server.publisher.calls.load(Ordering::SeqCst), 1);
}

// ==================== Editor Session Tests ====================

#[tokio::test]
async fn test_editor_hero_title_scenario() {
    let server = spawn_server().await;
    let token = server.login().await;
    let en_before = server.stored_bytes("en");

    let (status, loaded) = server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "ru" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["language"], "ru");
    assert_eq!(loaded["dirty"], false);
    let original = loaded["document"].clone();

    let (status, edited) = server
        .admin_post(
            &token,
            "/api/admin/editor/field",
            json!({ "path": "hero.title", "value": "Новый заголовок" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["dirty"], true);

    let (status, _) = server.admin_post(&token, "/api/admin/editor/save", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, reloaded) = server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "ru" }))
        .await;
    let reloaded = &reloaded["document"];
    assert_eq!(reloaded["hero"]["title"], "Новый заголовок");
    assert_eq!(reloaded["hero"]["tagline"], original["hero"]["tagline"]);
    for section in ["modules", "pricing", "testimonials", "contact", "footer"] {
        assert_eq!(reloaded[section], original[section], "section {} changed", section);
    }

    assert_eq!(server.stored_bytes("en"), en_before);
}

#[tokio::test]
async fn test_editor_plan_price_changes_only_that_plan() {
    let server = spawn_server().await;
    let token = server.login().await;

    let (_, loaded) = server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "en" }))
        .await;
    let original = loaded["document"].clone();

    server
        .admin_post(
            &token,
            "/api/admin/editor/field",
            json!({ "path": "pricing.plans.start.price", "value": "$99" }),
        )
        .await;
    server.admin_post(&token, "/api/admin/editor/save", json!({})).await;

    let stored: Value = serde_json::from_slice(&server.stored_bytes("en")).unwrap();
    let mut expected = original;
    expected["pricing"]["plans"]["start"]["price"] = json!("$99");
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn test_editor_list_item_edits() {
    let server = spawn_server().await;
    let token = server.login().await;
    server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "en" }))
        .await;

    let (status, body) = server
        .admin_post(
            &token,
            "/api/admin/editor/item",
            json!({ "listPath": "testimonials.items", "index": 1, "field": "rating", "value": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["document"]["testimonials"]["items"].as_array().unwrap();
    let ratings: Vec<u64> = items.iter().map(|t| t["rating"].as_u64().unwrap()).collect();
    assert_eq!(ratings, vec![5, 5, 5]);

    let (status, body) = server
        .admin_post(
            &token,
            "/api/admin/editor/item",
            json!({ "listPath": "testimonials.items", "index": 5, "field": "rating", "value": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, _) = server
        .admin_post(
            &token,
            "/api/admin/editor/field",
            json!({ "path": "hero.slogan", "value": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_editor_add_and_remove_feature() {
    let server = spawn_server().await;
    let token = server.login().await;
    server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "en" }))
        .await;

    let (status, body) = server
        .admin_post(
            &token,
            "/api/admin/editor/item/add",
            json!({ "listPath": "pricing.plans.light.features", "value": "Phone support" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index"], 4);
    assert_eq!(
        body["document"]["pricing"]["plans"]["light"]["features"][4],
        "Phone support"
    );

    let (status, body) = server
        .admin_post(
            &token,
            "/api/admin/editor/item/remove",
            json!({ "listPath": "pricing.plans.light.features", "index": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["document"]["pricing"]["plans"]["light"]["features"][0],
        "Up to 1,000 conversations a month"
    );
}

#[tokio::test]
async fn test_editor_publish_requires_saved_buffer() {
    let server = spawn_server().await;
    let token = server.login().await;
    server
        .admin_post(&token, "/api/admin/editor/load", json!({ "language": "ru" }))
        .await;
    server
        .admin_post(
            &token,
            "/api/admin/editor/field",
            json!({ "path": "footer.copyright", "value": "© 2026" }),
        )
        .await;

    let (status, _) = server.admin_post(&token, "/api/admin/editor/publish", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(server.publisher.calls.load(Ordering::SeqCst), 0);

    server.admin_post(&token, "/api/admin/editor/save", json!({})).await;
    let (status, body) = server.admin_post(&token, "/api/admin/editor/publish", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No changes to deploy");
    assert_eq!(server.publisher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_editor_sessions_are_isolated() {
    let server = spawn_server().await;
    let first = server.login().await;
    let second = server.login().await;

    server
        .admin_post(&first, "/api/admin/editor/load", json!({ "language": "ru" }))
        .await;

    let state: Value = server
        .client
        .get(server.url("/api/admin/editor"))
        .bearer_auth(&second)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(state["language"].is_null());
    assert_eq!(state["dirty"], false);

    let (status, _) = server.admin_post(&second, "/api/admin/editor/save", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_expired_sessions_release_their_editors() {
    let server = spawn_server_with("1", Duration::ZERO).await;

    for _ in 0..5 {
        let token = server.login().await;
        let (status, _) = server
            .admin_post(&token, "/api/admin/editor/load", json!({ "language": "ru" }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(server.state.editors.lock().await.len(), 5);

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let token = server.login().await;
    let response = server
        .client
        .get(server.url("/api/admin/editor"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.state.editors.lock().await.is_empty());
}

#[tokio::test]
async fn test_editor_publish_does_not_block_other_sessions() {
    let server = spawn_server_with(SESSION_TTL, Duration::from_secs(3)).await;
    let publishing = server.login().await;
    let editing = server.login().await;
    server
        .admin_post(&publishing, "/api/admin/editor/load", json!({ "language": "ru" }))
        .await;

    let client = server.client.clone();
    let url = server.url("/api/admin/editor/publish");
    let publish = tokio::spawn(async move {
        client.post(url).bearer_auth(publishing).send().await.unwrap().status()
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(1),
        server.admin_post(&editing, "/api/admin/editor/load", json!({ "language": "en" })),
    )
    .await
    .expect("editor request waited for the running publish");
    assert_eq!(status, StatusCode::OK);

    assert_eq!(publish.await.unwrap(), StatusCode::OK);
}
