//! HTTP routing integration tests against an in-memory state

use async_trait::async_trait;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use commonground::actions::{AuthActions, ContentActions};
use commonground::auth::{DemoGate, JwtValidator, LocalAuthProvider, TokenInput};
use commonground::cache::{CacheConfig, PageCache, PageRevalidator};
use commonground::config::Args;
use commonground::content::ContentRepository;
use commonground::db::{MemoryRowStore, Query, Row, RowStore, StoreResult, Table};
use commonground::models::NewAnnouncement;
use commonground::routes::{route, ApiRequest, FullBody};
use commonground::server::{AppState, StorageMode};

const STAFF_EMAIL: &str = "staff@commonground.org";
const STAFF_PASSWORD: &str = "correct horse";
const DEMO_EMAIL: &str = "demo@commonground.org";

/// Memory store whose selects can be made to stall after reading their rows
#[derive(Default)]
struct SlowSelectStore {
    inner: MemoryRowStore,
    slow: AtomicBool,
}

impl SlowSelectStore {
    fn set_slow(&self, slow: bool) {
        self.slow.store(slow, Ordering::SeqCst);
    }
}

#[async_trait]
impl RowStore for SlowSelectStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let rows = self.inner.select(table, query).await?;
        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        Ok(rows)
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Row> {
        self.inner.select_by_id(table, id).await
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        self.inner.delete(table, id).await
    }
}

fn test_state() -> AppState {
    state_with_store(Arc::new(MemoryRowStore::new()))
}

fn state_with_store(store: Arc<dyn RowStore>) -> AppState {
    let args = Args::try_parse_from(["commonground", "--dev-mode"]).unwrap();
    let jwt = JwtValidator::new_dev();

    let repo = ContentRepository::new(store.clone());
    let admin_repo = ContentRepository::new(store);

    let cache = Arc::new(PageCache::new(CacheConfig::default()));
    let revalidator = Arc::new(PageRevalidator::new(cache.clone()));
    let content = ContentActions::new(
        repo,
        admin_repo,
        DemoGate::new(Some(DEMO_EMAIL.to_string())),
        revalidator,
    );

    let provider = LocalAuthProvider::new(jwt.clone());
    provider.add_account(STAFF_EMAIL, STAFF_PASSWORD).unwrap();
    let auth = AuthActions::new(Arc::new(provider), "http://localhost:3000");

    AppState::new(args, jwt, content, auth, cache, StorageMode::Memory)
}

fn token_for(state: &AppState, email: &str) -> String {
    state
        .jwt
        .generate_token(TokenInput {
            user_id: format!("id-{}", email),
            email: Some(email.to_string()),
        })
        .unwrap()
}

async fn body_json(response: Response<FullBody>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let response = route(&state, ApiRequest::new(Method::GET, "/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["demoMode"], true);
    assert_eq!(body["mode"], "development");
}

#[tokio::test]
async fn test_dashboard_requires_session() {
    let state = test_state();

    let response = route(&state, ApiRequest::new(Method::GET, "/dashboard")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "NO_SESSION");

    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard/resources").with_bearer("garbage"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_list_through_dashboard() {
    let state = test_state();
    let token = token_for(&state, STAFF_EMAIL);

    // List viewed before the create
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard/resources").with_bearer(&token),
    )
    .await;
    assert_eq!(body_json(response).await, json!([]));

    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/dashboard/resources")
            .with_bearer(&token)
            .with_json(&json!({"name": "City Food Bank", "category": "Food", "phone": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard").with_bearer(&token),
    )
    .await;
    let overview = body_json(response).await;
    assert_eq!(overview["resourceCount"], 1);
    assert_eq!(overview["resources"][0]["name"], "City Food Bank");
    assert_eq!(overview["resources"][0]["phone"], Value::Null);
    assert_eq!(overview["resources"][0]["is_active"], true);

    // The create signals only the overview, but the list is rendered fresh
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard/resources").with_bearer(&token),
    )
    .await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["name"], "City Food Bank");

    let public = route(&state, ApiRequest::new(Method::GET, "/api/resources")).await;
    let rows = body_json(public).await;
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_update_visible_in_list() {
    let state = test_state();
    let token = token_for(&state, STAFF_EMAIL);

    let created = state
        .content
        .repository()
        .create_announcement(&NewAnnouncement::new("Closed", "Holiday"))
        .await
        .unwrap();

    let list = || ApiRequest::new(Method::GET, "/dashboard/announcements").with_bearer(&token);
    let before = body_json(route(&state, list()).await).await;
    assert_eq!(before[0]["title"], "Closed");

    let response = route(
        &state,
        ApiRequest::new(Method::PATCH, &format!("/dashboard/announcements/{}", created.id))
            .with_bearer(&token)
            .with_json(&json!({"title": "Open"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let after = body_json(route(&state, list()).await).await;
    assert_eq!(after[0]["title"], "Open");
}

#[tokio::test]
async fn test_overview_render_overlapping_update_is_not_cached() {
    let store = Arc::new(SlowSelectStore::default());
    let state = state_with_store(store.clone());
    let token = token_for(&state, STAFF_EMAIL);

    let created = state
        .content
        .repository()
        .create_announcement(&NewAnnouncement::new("Closed", "Holiday"))
        .await
        .unwrap();

    store.set_slow(true);
    let overview = ApiRequest::new(Method::GET, "/dashboard").with_bearer(&token);
    let patch = ApiRequest::new(Method::PATCH, &format!("/dashboard/announcements/{}", created.id))
        .with_bearer(&token)
        .with_json(&json!({"title": "Open"}));

    // The overview reads its rows, then stalls while the update completes
    let (in_flight, updated) = tokio::join!(route(&state, overview), route(&state, patch));
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(
        body_json(in_flight).await["announcements"][0]["title"],
        "Closed"
    );

    store.set_slow(false);
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard").with_bearer(&token),
    )
    .await;
    assert_eq!(
        body_json(response).await["announcements"][0]["title"],
        "Open"
    );
}

#[tokio::test]
async fn test_demo_account_mutation_refused() {
    let state = test_state();
    let token = token_for(&state, DEMO_EMAIL);

    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/dashboard/events")
            .with_bearer(&token)
            .with_json(&json!({"title": "Fair", "start_date": "2030-01-01T10:00:00.000Z"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Demo accounts are read-only."})
    );

    // Reads still work
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard/events").with_bearer(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let state = test_state();
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/api/resources").with_query("category=Spaceships"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_CATEGORY");
}

#[tokio::test]
async fn test_contact_form_public() {
    let state = test_state();
    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/api/contact").with_json(&json!({
            "name": "Ana",
            "email": "ana@example.com",
            "message": "Do you help with rent?"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/api/contact").with_json(&json!({
            "name": "Ana",
            "email": "not-an-email",
            "message": "Hello"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_flow() {
    let state = test_state();

    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/auth/signin")
            .with_json(&json!({"email": STAFF_EMAIL, "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid login credentials"})
    );

    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/auth/signin")
            .with_json(&json!({"email": STAFF_EMAIL, "password": STAFF_PASSWORD})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["redirectTo"], "/dashboard");

    let token = body["session"]["access_token"].as_str().unwrap().to_string();
    let response = route(
        &state,
        ApiRequest::new(Method::GET, "/dashboard").with_bearer(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_password_without_session() {
    let state = test_state();
    let response = route(
        &state,
        ApiRequest::new(Method::POST, "/auth/update-password")
            .with_json(&json!({"password": "longenough"})),
    )
    .await;
    assert_eq!(
        body_json(response).await,
        json!({"error": "Auth session missing!"})
    );
}
