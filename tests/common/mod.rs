// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: an in-process mock of the zone backend.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zone_admin::config::Config;
use zone_admin::map::SceneMapProvider;
use zone_admin::routes::create_router;
use zone_admin::AppState;

pub const TEST_TOKEN: &str = "test_token";

/// Mock backend state, inspected by tests after the fact.
#[derive(Default)]
pub struct MockBackend {
    pub zones: Mutex<Vec<Value>>,
    pub prices: Mutex<Vec<Value>>,
    pub services: Mutex<Vec<Value>>,
    /// `"METHOD /path"` for every call received
    pub calls: Mutex<Vec<String>>,
    /// Request bodies of writes, in order
    pub bodies: Mutex<Vec<Value>>,
    /// When set, writes are rejected with this message (empty = no message)
    pub reject_writes: Mutex<Option<String>>,
    /// When set, writes answer with HTTP 500 instead of `success: false`
    pub http_failure: AtomicBool,
    pub write_delay_ms: AtomicU64,
    next_id: AtomicU64,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Arc<Self> {
        let mock = Self::default();
        mock.next_id.store(100, Ordering::SeqCst);
        Arc::new(mock)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn reject_writes(&self, message: Option<&str>) {
        *self.reject_writes.lock().unwrap() = message.map(str::to_string);
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().unwrap().last().cloned()
    }

    fn record(&self, headers: &HeaderMap, call: &str) -> Result<(), (StatusCode, Json<Value>)> {
        self.calls.lock().unwrap().push(call.to_string());
        let expected = format!("Bearer {}", TEST_TOKEN);
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(auth) if auth == expected => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "Unauthorized"})),
            )),
        }
    }

    async fn write_gate(&self, body: &Value) -> Option<(StatusCode, Json<Value>)> {
        self.bodies.lock().unwrap().push(body.clone());
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let rejection = self.reject_writes.lock().unwrap().clone();
        rejection.map(|message| {
            let body = if message.is_empty() {
                json!({"success": false})
            } else {
                json!({"success": false, "message": message})
            };
            if self.http_failure.load(Ordering::SeqCst) {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
            } else {
                (StatusCode::OK, Json(body))
            }
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

type Reply = (StatusCode, Json<Value>);

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({"success": true, "data": data})))
}

async fn list_zones(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(e) = mock.record(&headers, "GET /manage-zones/managezone-list") {
        return e;
    }
    let zones = mock.zones.lock().unwrap().clone();
    ok(Value::Array(zones))
}

async fn save_zone(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(e) = mock.record(&headers, "POST /manage-zones/managezone-save") {
        return e;
    }
    if let Some(rejection) = mock.write_gate(&body).await {
        return rejection;
    }
    let mut record = body.clone();
    record["id"] = json!(mock.next_id());
    mock.zones.lock().unwrap().push(record.clone());
    ok(record)
}

async fn list_prices(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(e) = mock.record(&headers, "GET /manage-zones/zone-prices") {
        return e;
    }
    let prices = mock.prices.lock().unwrap().clone();
    ok(Value::Array(prices))
}

async fn create_price(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(e) = mock.record(&headers, "POST /manage-zones/zone-prices") {
        return e;
    }
    if let Some(rejection) = mock.write_gate(&body).await {
        return rejection;
    }
    let mut record = body.clone();
    record["id"] = json!(mock.next_id());
    mock.prices.lock().unwrap().push(record.clone());
    ok(record)
}

async fn update_price(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(e) = mock.record(&headers, &format!("PUT /manage-zones/zone-prices/{}", id)) {
        return e;
    }
    if let Some(rejection) = mock.write_gate(&body).await {
        return rejection;
    }
    let mut prices = mock.prices.lock().unwrap();
    match prices.iter_mut().find(|p| p["id"].to_string() == id) {
        Some(existing) => {
            let mut updated = body.clone();
            updated["id"] = existing["id"].clone();
            *existing = updated.clone();
            ok(updated)
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Zone price not found"})),
        ),
    }
}

async fn list_services(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    if let Err(e) = mock.record(&headers, "GET /services/service-list") {
        return e;
    }
    let services = mock.services.lock().unwrap().clone();
    ok(Value::Array(services))
}

/// Start the mock backend on an ephemeral port and return its base URL.
pub async fn spawn_backend(mock: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/manage-zones/managezone-list", get(list_zones))
        .route("/manage-zones/managezone-save", post(save_zone))
        .route(
            "/manage-zones/zone-prices",
            get(list_prices).post(create_price),
        )
        .route("/manage-zones/zone-prices/{id}", put(update_price))
        .route("/services/service-list", get(list_services))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend failed");
    });
    format!("http://{}", addr)
}

/// Config pointing at a mock backend.
#[allow(dead_code)]
pub fn test_config(backend_url: &str) -> Config {
    Config {
        backend_url: backend_url.to_string(),
        backend_token: TEST_TOKEN.to_string(),
        ..Config::test_default()
    }
}

/// Create app state backed by a headless map scene.
#[allow(dead_code)]
pub fn create_test_state(config: Config) -> (Arc<AppState>, SceneMapProvider) {
    let provider = SceneMapProvider::new();
    let state = AppState::new(config, Box::new(provider.clone())).expect("Failed to build state");
    (Arc::new(state), provider)
}

/// Create a test app against a fresh mock backend.
/// Returns the router, the shared state and the mock.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MockBackend>) {
    let mock = MockBackend::new();
    let url = spawn_backend(mock.clone()).await;
    let (state, _) = create_test_state(test_config(&url));
    (create_router(state.clone()), state, mock)
}

/// A backend zone record for the unit square.
#[allow(dead_code)]
pub fn square_zone_record(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "latitude": 0.5,
        "longitude": 0.5,
        "status": 1,
        "description": json!({
            "type": "polygon",
            "coordinates": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
        }).to_string(),
    })
}
