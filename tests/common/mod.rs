// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fixtures: an in-process GoNotes API double plus client assembly
//! helpers. The double speaks the real envelope format and exposes knobs
//! for failing refreshes, delaying them, and forcing auth-failure statuses
//! on protected endpoints.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use gonotes_client::config::Config;
use gonotes_client::models::{AuthTokens, Session, User};
use gonotes_client::services::{ApiGate, AuthService, NotesService, RefreshPolicy, UserService};
use gonotes_client::store::SessionStore;

const FIXED_TIMESTAMP: &str = "2026-01-10T09:00:00Z";

// ─── Mock API State ──────────────────────────────────────────────

pub struct ApiState {
    /// Registered accounts: email -> (password, user json)
    users: Mutex<HashMap<String, (String, Value)>>,
    /// Profile served by the user endpoints
    profile: Mutex<Value>,
    /// The one refresh token the server currently accepts
    valid_refresh: Mutex<Option<String>>,
    /// Stored notes, in creation order
    notes: Mutex<Vec<Value>>,
    /// Authorization header observed per request, newest last
    seen_auth: Mutex<Vec<(String, Option<String>)>>,
    /// Lifetime handed out with every token pair
    pub expires_in: AtomicI64,
    /// Refuse refreshes with a 401 envelope when set
    pub fail_refresh: AtomicBool,
    /// Hold every refresh response for this long
    pub refresh_delay_ms: AtomicU64,
    /// Force this status (e.g. 401/403) from all protected endpoints
    protected_override: Mutex<Option<u16>>,
    pub refresh_calls: AtomicU64,
    pub logout_calls: AtomicU64,
    token_seq: AtomicU64,
    user_seq: AtomicU64,
    note_seq: AtomicU64,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            profile: Mutex::new(test_user_json()),
            valid_refresh: Mutex::new(None),
            notes: Mutex::new(Vec::new()),
            seen_auth: Mutex::new(Vec::new()),
            expires_in: AtomicI64::new(900),
            fail_refresh: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            protected_override: Mutex::new(None),
            refresh_calls: AtomicU64::new(0),
            logout_calls: AtomicU64::new(0),
            token_seq: AtomicU64::new(0),
            user_seq: AtomicU64::new(0),
            note_seq: AtomicU64::new(0),
        }
    }
}

impl ApiState {
    /// Mint a pair and make its refresh half the accepted one.
    pub fn mint_pair(&self) -> (String, String) {
        let seq = self.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{}", seq);
        let refresh = format!("refresh-{}", seq);
        *self.valid_refresh.lock().unwrap() = Some(refresh.clone());
        (access, refresh)
    }

    pub fn force_protected_status(&self, status: u16) {
        *self.protected_override.lock().unwrap() = Some(status);
    }

    pub fn clear_protected_status(&self) {
        *self.protected_override.lock().unwrap() = None;
    }

    /// Latest Authorization header observed on a path containing `fragment`.
    pub fn last_auth_for(&self, fragment: &str) -> Option<Option<String>> {
        self.seen_auth
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(path, _)| path.contains(fragment))
            .map(|(_, auth)| auth.clone())
    }

    fn record_auth(&self, path: &str, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen_auth
            .lock()
            .unwrap()
            .push((path.to_string(), auth));
    }

    fn overridden(&self) -> Option<Response> {
        let status = (*self.protected_override.lock().unwrap())?;
        let status = StatusCode::from_u16(status).expect("valid override status");
        Some(error_envelope(status, "Token expired"))
    }
}

// ─── Server Fixture ──────────────────────────────────────────────

pub struct MockApi {
    pub addr: SocketAddr,
    pub state: Arc<ApiState>,
}

impl MockApi {
    /// Bind a fresh port and serve the API double in the background.
    pub async fn spawn() -> Self {
        let state = Arc::new(ApiState::default());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock API");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url(),
            ..Config::default()
        }
    }
}

/// Config pointing at a port nothing listens on.
pub async fn unreachable_config() -> Config {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    Config {
        base_url: format!("http://{}", addr),
        connect_timeout_secs: 1,
        request_timeout_secs: 2,
        ..Config::default()
    }
}

// ─── Client Assembly ─────────────────────────────────────────────

pub struct TestClient {
    pub store: SessionStore,
    pub gate: ApiGate,
    pub auth: AuthService,
    pub notes: NotesService,
    pub users: UserService,
}

pub fn build_test_client(api: &MockApi) -> TestClient {
    test_client_with_config(api.config())
}

pub fn test_client_with_config(config: Config) -> TestClient {
    let store = SessionStore::in_memory();
    let gate = ApiGate::new(&config, store.clone()).expect("build gate");
    TestClient {
        store: store.clone(),
        gate: gate.clone(),
        auth: AuthService::new(gate.clone(), store.clone()),
        notes: NotesService::new(gate.clone()),
        users: UserService::new(gate, store),
    }
}

/// Millisecond-scale policy so coordinator tests run in real time.
pub fn fast_policy() -> RefreshPolicy {
    RefreshPolicy {
        check_interval: Duration::from_millis(50),
        refresh_margin_secs: 120,
    }
}

pub fn test_user() -> User {
    User {
        id: "u-1".to_string(),
        email: "ada@example.com".to_string(),
        full_name: "Ada Lovelace".to_string(),
        created_at: FIXED_TIMESTAMP.to_string(),
        updated_at: FIXED_TIMESTAMP.to_string(),
    }
}

fn test_user_json() -> Value {
    json!({
        "id": "u-1",
        "email": "ada@example.com",
        "full_name": "Ada Lovelace",
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    })
}

/// Store a session whose refresh token the mock server accepts.
pub async fn seed_session(store: &SessionStore, api: &MockApi, expires_in: i64) -> Session {
    let (access, refresh) = api.state.mint_pair();
    let session = Session {
        user: test_user(),
        tokens: AuthTokens::issued_now(access, refresh, expires_in),
    };
    store.save_session(&session).await.expect("seed session");
    session
}

// ─── Router ──────────────────────────────────────────────────────

fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/user/profile", get(get_profile).put(update_profile))
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route("/api/v1/notes/public", get(list_public_notes))
        .route("/api/v1/notes/search", post(search_notes))
        .route(
            "/api/v1/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}

fn ok_envelope(data: Value) -> Response {
    Json(json!({
        "status": "success",
        "code": 200,
        "message": "OK",
        "data": data,
    }))
    .into_response()
}

fn error_envelope(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "code": status.as_u16(),
            "message": message,
        })),
    )
        .into_response()
}

// ─── Auth Handlers ───────────────────────────────────────────────

async fn register(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/auth/register", &headers);

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    if email.is_empty() || password.is_empty() {
        return error_envelope(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    let seq = state.user_seq.fetch_add(1, Ordering::SeqCst) + 2;
    let user = json!({
        "id": format!("u-{}", seq),
        "email": email,
        "full_name": body["full_name"].as_str().unwrap_or_default(),
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    });
    state
        .users
        .lock()
        .unwrap()
        .insert(email, (password, user.clone()));
    ok_envelope(user)
}

async fn login(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/auth/login", &headers);

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let user = match state.users.lock().unwrap().get(&email) {
        Some((expected, user)) if expected == password => user.clone(),
        Some(_) => return error_envelope(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        // Unregistered emails sign in as the canned user, for tests that
        // skip registration
        None if password != "wrong" => {
            let mut user = test_user_json();
            user["email"] = json!(email);
            user
        }
        None => return error_envelope(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };

    *state.profile.lock().unwrap() = user.clone();
    let (access, refresh) = state.mint_pair();
    ok_envelope(json!({
        "user": user,
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": state.expires_in.load(Ordering::SeqCst),
    }))
}

async fn refresh(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/auth/refresh", &headers);
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.fail_refresh.load(Ordering::SeqCst) {
        return error_envelope(StatusCode::UNAUTHORIZED, "Token has been revoked");
    }

    let presented = body["refresh_token"].as_str();
    let valid = state.valid_refresh.lock().unwrap().clone();
    if presented.is_none() || presented != valid.as_deref() {
        return error_envelope(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }

    let (access, refresh) = state.mint_pair();
    ok_envelope(json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": state.expires_in.load(Ordering::SeqCst),
    }))
}

async fn logout(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/auth/logout", &headers);
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    *state.valid_refresh.lock().unwrap() = None;
    ok_envelope(Value::Null)
}

// ─── Profile Handlers ────────────────────────────────────────────

async fn get_profile(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    state.record_auth("/api/v1/user/profile", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }
    let profile = state.profile.lock().unwrap().clone();
    ok_envelope(profile)
}

async fn update_profile(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/user/profile", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let mut profile = state.profile.lock().unwrap();
    profile["full_name"] = body["full_name"].clone();
    profile["updated_at"] = json!("2026-02-01T12:00:00Z");
    ok_envelope(profile.clone())
}

// ─── Notes Handlers ──────────────────────────────────────────────

async fn list_notes(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record_auth("/api/v1/notes", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let notes = state.notes.lock().unwrap().clone();
    paged_response(&notes, page_param(&params, "page"), page_param(&params, "limit"))
}

async fn create_note(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/notes", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let seq = state.note_seq.fetch_add(1, Ordering::SeqCst) + 1;
    let note = json!({
        "id": format!("note-{}", seq),
        "user_id": "u-1",
        "title": body["title"],
        "content": body["content"],
        "tags": body["tags"].as_array().cloned().unwrap_or_default(),
        "is_public": body["is_public"].as_bool().unwrap_or(false),
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    });
    state.notes.lock().unwrap().push(note.clone());
    ok_envelope(note)
}

async fn get_note(
    State(state): State<Arc<ApiState>>,
    Path(note_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record_auth("/api/v1/notes/", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    match find_note(&state, &note_id) {
        Some(note) => ok_envelope(note),
        None => error_envelope(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn update_note(
    State(state): State<Arc<ApiState>>,
    Path(note_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/notes/", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let mut notes = state.notes.lock().unwrap();
    let Some(note) = notes.iter_mut().find(|n| n["id"] == json!(note_id)) else {
        return error_envelope(StatusCode::NOT_FOUND, "Note not found");
    };
    note["title"] = body["title"].clone();
    note["content"] = body["content"].clone();
    note["tags"] = json!(body["tags"].as_array().cloned().unwrap_or_default());
    note["is_public"] = json!(body["is_public"].as_bool().unwrap_or(false));
    note["updated_at"] = json!("2026-02-01T12:00:00Z");
    ok_envelope(note.clone())
}

async fn delete_note(
    State(state): State<Arc<ApiState>>,
    Path(note_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record_auth("/api/v1/notes/", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let mut notes = state.notes.lock().unwrap();
    let before = notes.len();
    notes.retain(|n| n["id"] != json!(note_id));
    if notes.len() == before {
        // bare body, no envelope, matching the real endpoint
        return (StatusCode::NOT_FOUND, "note not found").into_response();
    }
    Json(json!({"message": "Note deleted successfully"})).into_response()
}

async fn search_notes(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth("/api/v1/notes/search", &headers);
    if let Some(response) = state.overridden() {
        return response;
    }

    let query = body["query"].as_str().unwrap_or_default().to_lowercase();
    let notes: Vec<Value> = state
        .notes
        .lock()
        .unwrap()
        .iter()
        .filter(|n| {
            let title = n["title"].as_str().unwrap_or_default().to_lowercase();
            let content = n["content"].as_str().unwrap_or_default().to_lowercase();
            query.is_empty() || title.contains(&query) || content.contains(&query)
        })
        .cloned()
        .collect();

    let page = body["page"].as_i64().unwrap_or(1);
    let limit = body["page_size"].as_i64().unwrap_or(20);
    paged_response(&notes, page, limit)
}

async fn list_public_notes(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record_auth("/api/v1/notes/public", &headers);

    let notes: Vec<Value> = state
        .notes
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n["is_public"] == json!(true))
        .cloned()
        .collect();
    paged_response(&notes, page_param(&params, "page"), page_param(&params, "limit"))
}

// ─── Paging Helpers ──────────────────────────────────────────────

fn page_param(params: &HashMap<String, String>, key: &str) -> i64 {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(if key == "page" { 1 } else { 10 })
}

fn find_note(state: &ApiState, note_id: &str) -> Option<Value> {
    state
        .notes
        .lock()
        .unwrap()
        .iter()
        .find(|n| n["id"] == json!(note_id))
        .cloned()
}

/// List responses carry previews, not full content, like the real server.
fn note_summary(note: &Value) -> Value {
    let mut summary = note.clone();
    let content = summary["content"].as_str().unwrap_or_default().to_string();
    let preview: String = content.chars().take(100).collect();
    let fields = summary.as_object_mut().expect("note object");
    fields.remove("content");
    fields.insert("preview".to_string(), json!(preview));
    summary
}

fn paged_response(notes: &[Value], page: i64, limit: i64) -> Response {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = notes.len() as i64;
    let total_pages = (total + limit - 1) / limit;
    let start = ((page - 1) * limit) as usize;

    let slice: Vec<Value> = notes
        .iter()
        .skip(start)
        .take(limit as usize)
        .map(note_summary)
        .collect();

    ok_envelope(json!({
        "notes": slice,
        "total": total,
        "page": page,
        "page_size": limit,
        "total_pages": total_pages,
        "has_next": page < total_pages,
        "has_prev": page > 1,
    }))
}
