// Mock marketplace backend shared by the integration tests in one binary.
#![allow(dead_code)]
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

pub const SESSION_COOKIE: &str = "session=test-session";
pub const SLOW_RESPONSE: Duration = Duration::from_millis(500);

const ORG_ID: &str = "0b8d8f3a-2c4b-4b7a-9a4e-6f1d2c3b4a5e";
const USER_ID: &str = "6f1c1f9e-4f6e-4c9a-9c1b-0d6f1b1e2a3c";
pub const DEAL_ID: &str = "3c2b1a09-8f7e-4d6c-9b5a-4e3d2c1b0a98";
const CREATED_AT: &str = "2026-01-05T10:00:00Z";

static SERVER_URL: OnceLock<String> = OnceLock::new();
// Every call served by `journal`, in arrival order.
static JOURNAL: Mutex<Vec<Recorded>> = Mutex::new(Vec::new());

// What the mock saw for one call.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
}

// Calls recorded for one method and exact path.
pub fn recorded(method: &str, path: &str) -> Vec<Recorded> {
    JOURNAL
        .lock()
        .expect("journal mutex poisoned")
        .iter()
        .filter(|call| call.method == method && call.path == path)
        .cloned()
        .collect()
}

// The single call for a method and path; paths carry fresh ids so each is unique.
pub fn recorded_once(method: &str, path: &str) -> Recorded {
    let mut calls = recorded(method, path);
    assert_eq!(calls.len(), 1, "expected one {method} {path}, got {calls:?}");
    calls.remove(0)
}

static SERVER_READY: OnceLock<()> = OnceLock::new();

// Start the mock backend once and return its base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own thread and runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                axum::serve(listener, app()).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    drop(listener);
    format!("http://{}", addr)
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("mock backend did not become ready in time");
}

fn app() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/register", post(journal))
        .route("/auth/logout", post(journal))
        .route("/auth/profile", patch(journal))
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}", get(get_request).patch(journal))
        .route("/requests/{id}/publish", post(publish_request))
        .route("/requests/{id}/shortlist", post(journal))
        .route("/requests/{id}/award", post(journal))
        .route("/quotes", get(journal).post(create_quote))
        .route("/quotes/{id}", patch(journal))
        .route("/quotes/{id}/withdraw", post(journal))
        .route("/deals", get(journal))
        .route("/deals/{id}", get(journal))
        .route("/deals/{id}/create-invoice", post(journal))
        .route("/deals/{id}/mark-paid", post(journal))
        .route("/deals/{id}/messages", get(journal).post(journal))
        .route("/audit", get(journal))
        .route("/notifications", get(journal))
        .route("/notifications/{id}/read", post(journal))
        .route("/invites", get(journal).post(journal))
        .route("/invites/{id}/accept", post(journal))
        .route("/helper/suggest", post(journal))
        .route("/problems/title", get(title_problem))
        .route("/problems/plain", get(plain_problem))
        .route("/slow", get(slow))
        .route("/not-json", get(not_json))
        .route("/echo-headers", get(echo_headers).post(echo_headers))
}

pub fn user_json() -> Value {
    json!({
        "id": USER_ID,
        "org_id": ORG_ID,
        "email": "buyer@acme.test",
        "role": "BUYER",
        "display_name": "Dana"
    })
}

pub fn request_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "buyer_org_id": ORG_ID,
        "title": "Security audit",
        "description": "Annual SOC2 readiness review",
        "budget_cents": 100000,
        "currency": "USD",
        "deadline_date": "2026-12-01",
        "tags": ["saas"],
        "status": status,
        "created_at": CREATED_AT,
        "updated_at": CREATED_AT
    })
}

fn quote_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "request_id": "7d3f0a52-9a51-4f6e-8f0d-2a9b1c4d5e6f",
        "vendor_org_id": ORG_ID,
        "amount_cents": 120000,
        "timeline_days": 14,
        "terms": "Standard implementation support.",
        "status": status,
        "created_at": CREATED_AT,
        "updated_at": CREATED_AT
    })
}

fn deal_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "buyer_org_id": ORG_ID,
        "vendor_org_id": ORG_ID,
        "request_id": "7d3f0a52-9a51-4f6e-8f0d-2a9b1c4d5e6f",
        "winning_quote_id": null,
        "status": status,
        "created_at": CREATED_AT,
        "updated_at": CREATED_AT
    })
}

fn invite_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "org_id": ORG_ID,
        "email": "vendor@acme.test",
        "role": "VENDOR",
        "status": status,
        "created_by_user_id": USER_ID,
        "created_at": CREATED_AT
    })
}

fn empty_page(query: &HashMap<String, String>) -> Value {
    let number = |key: &str, default: u32| {
        query
            .get(key)
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(default)
    };
    json!({
        "items": [],
        "page": number("page", 1),
        "page_size": number("page_size", 20),
        "total": 0
    })
}

// Canned reply per route; the shape is what the client decodes for that call.
fn journal_reply(method: &Method, path: &str, query: &HashMap<String, String>) -> Option<Value> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let reply = match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "register"]) | ("PATCH", ["auth", "profile"]) => user_json(),
        ("POST", ["auth", "logout"]) => json!({ "message": "Logged out" }),
        ("PATCH", ["requests", id]) => request_json(id, "DRAFT"),
        ("POST", ["requests", id, "shortlist"]) => request_json(id, "SHORTLIST"),
        ("POST", ["requests", _, "award"]) => json!({ "deal_id": DEAL_ID }),
        ("GET", ["quotes" | "deals" | "audit" | "notifications"]) => empty_page(query),
        ("PATCH", ["quotes", id]) => quote_json(id, "UPDATED"),
        ("POST", ["quotes", id, "withdraw"]) => quote_json(id, "WITHDRAWN"),
        ("GET", ["deals", id]) => deal_json(id, "NEGOTIATION"),
        ("POST", ["deals", id, "mark-paid"]) => deal_json(id, "PAID"),
        ("POST", ["deals", id, "create-invoice"]) => json!({
            "id": "5a4b3c2d-1e0f-4a9b-8c7d-6e5f4a3b2c1d",
            "deal_id": id,
            "amount_cents": 120000,
            "currency": "USD",
            "status": "DRAFT",
            "issued_at": null,
            "paid_at": null
        }),
        ("GET", ["deals", _, "messages"]) | ("GET", ["invites"]) => json!([]),
        ("POST", ["deals", id, "messages"]) => json!({
            "id": "1f2e3d4c-5b6a-4798-8a7b-6c5d4e3f2a1b",
            "deal_id": id,
            "sender_user_id": USER_ID,
            "body": "On it",
            "created_at": CREATED_AT
        }),
        ("POST", ["notifications", id, "read"]) => json!({
            "id": id,
            "org_id": ORG_ID,
            "user_id": USER_ID,
            "type": "quote.submitted",
            "payload": {},
            "read_at": CREATED_AT,
            "created_at": CREATED_AT
        }),
        ("POST", ["invites"]) => invite_json("9e8d7c6b-5a49-4382-a1b0-c9d8e7f6a5b4", "PENDING"),
        ("POST", ["invites", id, "accept"]) => invite_json(id, "ACCEPTED"),
        ("POST", ["helper", "suggest"]) => json!({
            "title": "Suggestions",
            "suggestions": ["Ask for a fixed price"],
            "disclaimer": "Review before sending."
        }),
        _ => return None,
    };
    Some(reply)
}

// Records the call, then answers with the canned reply for its route.
async fn journal(method: Method, uri: Uri, body: Bytes) -> Response {
    let query: HashMap<String, String> = uri
        .query()
        .map(|raw| url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let reply = journal_reply(&method, uri.path(), &query);
    JOURNAL
        .lock()
        .expect("journal mutex poisoned")
        .push(Recorded {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
    match reply {
        Some(reply) => Json(reply).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "not found" }))).into_response(),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "correct-horse" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response();
    }
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
        Json(user_json()),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains(SESSION_COOKIE));
    if !authenticated {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Not authenticated" })),
        )
            .into_response();
    }
    Json(json!({
        "user": user_json(),
        "organization": { "id": ORG_ID, "name": "Acme" }
    }))
    .into_response()
}

// Echoes the paging and filters back so tests can see what was sent.
async fn list_requests(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u32 = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    let status = params.get("status").cloned().unwrap_or_else(|| "DRAFT".to_string());
    let title = params.get("search").cloned().unwrap_or_default();
    let mut item = request_json("7d3f0a52-9a51-4f6e-8f0d-2a9b1c4d5e6f", &status);
    item["title"] = json!(title);
    Json(json!({
        "items": [item],
        "page": page,
        "page_size": page_size,
        "total": 41
    }))
}

async fn create_request(Json(body): Json<Value>) -> Response {
    if body["budget_cents"].as_i64().unwrap_or_default() > 10_000_000 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Budget exceeds organization limit" })),
        )
            .into_response();
    }
    let mut item = request_json("7d3f0a52-9a51-4f6e-8f0d-2a9b1c4d5e6f", "DRAFT");
    item["title"] = body["title"].clone();
    (StatusCode::CREATED, Json(item)).into_response()
}

async fn get_request(Path(id): Path<String>) -> Response {
    if uuid::Uuid::parse_str(&id).is_err() {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "not found" }))).into_response();
    }
    Json(request_json(&id, "DRAFT")).into_response()
}

async fn publish_request(Path(id): Path<String>, headers: HeaderMap) -> Response {
    let expected = format!("pub-{id}");
    let key = headers
        .get("idempotency-key")
        .and_then(|value| value.to_str().ok());
    if key != Some(expected.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "missing idempotency key" })),
        )
            .into_response();
    }
    Json(request_json(&id, "PUBLISHED")).into_response()
}

async fn create_quote() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{
                "loc": ["body", "amount_cents"],
                "msg": "amount_cents must be positive",
                "type": "value_error"
            }]
        })),
    )
        .into_response()
}

async fn title_problem() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "title": "Request already awarded", "detail": "" })),
    )
        .into_response()
}

async fn plain_problem() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_RESPONSE).await;
    Json(json!({ "ok": true }))
}

async fn not_json() -> &'static str {
    "hello"
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "content_type": value("content-type"),
        "accept": value("accept"),
        "x_trace": value("x-trace"),
    }))
}
