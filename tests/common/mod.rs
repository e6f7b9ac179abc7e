//! In-process stand-in for the task API, served on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use task_manager_client::{
    platform::MemoryPlatform,
    state::{AppState, Config},
    task::{Task, TaskPriority},
};
use uuid::Uuid;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret1";

#[derive(Default)]
pub struct MockDb {
    pub tasks: Vec<Task>,
    pub list_queries: Vec<String>,
    pub auth_headers: Vec<Option<String>>,
    pub requests: usize,
    pub fail_lists: bool,
}

#[derive(Clone, Default)]
pub struct MockApi {
    pub db: Arc<Mutex<MockDb>>,
}

impl MockApi {
    pub fn seed(&self, count: usize) -> Vec<Task> {
        let mut db = self.db.lock().unwrap();
        for i in 0..count {
            let now = Utc::now();
            db.tasks.push(Task {
                id: Uuid::new_v4(),
                title: format!("Task {}", i + 1),
                description: None,
                completed: i % 2 == 1,
                priority: match i % 3 {
                    0 => TaskPriority::Low,
                    1 => TaskPriority::Medium,
                    _ => TaskPriority::High,
                },
                due_date: None,
                created_at: now,
                updated_at: now,
            });
        }
        db.tasks.clone()
    }

    pub fn list_queries(&self) -> Vec<String> {
        self.db.lock().unwrap().list_queries.clone()
    }

    pub fn last_auth_header(&self) -> Option<String> {
        self.db.lock().unwrap().auth_headers.last().cloned().flatten()
    }

    pub fn requests(&self) -> usize {
        self.db.lock().unwrap().requests
    }

    pub fn task_count(&self) -> usize {
        self.db.lock().unwrap().tasks.len()
    }

    pub fn task(&self, id: Uuid) -> Option<Task> {
        self.db.lock().unwrap().tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Makes every `GET /tasks` answer 500 until turned off again.
    pub fn fail_lists(&self, fail: bool) {
        self.db.lock().unwrap().fail_lists = fail;
    }
}

fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn authorize(db: &mut MockDb, headers: &HeaderMap) -> Result<(), Response> {
    db.requests += 1;
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    db.auth_headers.push(header.clone());

    if header.as_deref() == Some(format!("Bearer {}", TOKEN).as_str()) {
        Ok(())
    } else {
        Err(fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
    }
}

async fn login(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    api.db.lock().unwrap().requests += 1;
    if body["password"] != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    ok(
        StatusCode::OK,
        json!({
            "token": TOKEN,
            "user": { "id": Uuid::new_v4(), "name": "Ada", "email": body["email"] }
        }),
    )
}

async fn register(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    api.db.lock().unwrap().requests += 1;
    ok(
        StatusCode::CREATED,
        json!({
            "token": TOKEN,
            "user": { "id": Uuid::new_v4(), "name": body["name"], "email": body["email"] }
        }),
    )
}

async fn list_tasks(
    State(api): State<MockApi>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut db = api.db.lock().unwrap();
    if let Err(rejection) = authorize(&mut db, &headers) {
        return rejection;
    }
    db.list_queries.push(raw.unwrap_or_default());
    if db.fail_lists {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Database unavailable" })),
        )
            .into_response();
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);

    let matching: Vec<Task> = db
        .tasks
        .iter()
        .filter(|t| params.get("completed").map_or(true, |c| *c == t.completed.to_string()))
        .filter(|t| params.get("priority").map_or(true, |p| *p == t.priority.to_string()))
        .cloned()
        .collect();
    let total = matching.len();
    let data: Vec<Task> = matching
        .into_iter()
        .skip(((page.max(1) - 1) * limit) as usize)
        .take(limit as usize)
        .collect();

    ok(
        StatusCode::OK,
        json!({ "data": data, "total": total, "page": page, "limit": limit }),
    )
}

async fn get_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let mut db = api.db.lock().unwrap();
    if let Err(rejection) = authorize(&mut db, &headers) {
        return rejection;
    }
    match db.tasks.iter().find(|t| t.id == id) {
        Some(task) => ok(StatusCode::OK, task),
        None => fail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn create_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = api.db.lock().unwrap();
    if let Err(rejection) = authorize(&mut db, &headers) {
        return rejection;
    }

    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": { "title": ["Title is required"] }
            })),
        )
            .into_response();
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        title,
        description: body["description"].as_str().map(str::to_string),
        completed: false,
        priority: serde_json::from_value(body["priority"].clone()).unwrap_or_default(),
        due_date: serde_json::from_value(body["due_date"].clone()).unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    db.tasks.insert(0, task.clone());
    ok(StatusCode::CREATED, task)
}

async fn update_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = api.db.lock().unwrap();
    if let Err(rejection) = authorize(&mut db, &headers) {
        return rejection;
    }
    let Some(task) = db.tasks.iter_mut().find(|t| t.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Task not found");
    };

    if let Some(title) = body["title"].as_str() {
        task.title = title.to_string();
    }
    if let Some(description) = body.get("description") {
        task.description = description.as_str().map(str::to_string);
    }
    if let Some(due_date) = body.get("due_date") {
        task.due_date = serde_json::from_value(due_date.clone()).unwrap_or_default();
    }
    if let Some(completed) = body["completed"].as_bool() {
        task.completed = completed;
    }
    if let Ok(priority) = serde_json::from_value(body["priority"].clone()) {
        task.priority = priority;
    }
    task.updated_at = Utc::now();
    ok(StatusCode::OK, task.clone())
}

async fn delete_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let mut db = api.db.lock().unwrap();
    if let Err(rejection) = authorize(&mut db, &headers) {
        return rejection;
    }
    let before = db.tasks.len();
    db.tasks.retain(|t| t.id != id);
    if db.tasks.len() == before {
        return fail(StatusCode::NOT_FOUND, "Task not found");
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Task deleted" })),
    )
        .into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    ok(StatusCode::OK, json!({}))
}

async fn boom() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Database exploded" })),
    )
        .into_response()
}

pub async fn spawn_api() -> (String, MockApi) {
    let api = MockApi::default();

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/slow", get(slow))
        .route("/api/boom", get(boom))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), api)
}

pub struct Harness {
    pub app: AppState,
    pub api: MockApi,
    pub platform: MemoryPlatform,
}

pub async fn harness_with(configure: impl FnOnce(Config) -> Config) -> Harness {
    let (base_url, api) = spawn_api().await;
    let platform = MemoryPlatform::new();
    let config = configure(Config::new(base_url).with_stale_time(Duration::from_secs(60)));
    let app = AppState::new(config, Arc::new(platform.clone())).unwrap();
    Harness { app, api, platform }
}

pub async fn harness() -> Harness {
    harness_with(|config| config).await
}

/// Harness with a logged-in session, as the front end would set it up.
pub async fn signed_in() -> Harness {
    let harness = harness().await;
    let session = harness
        .app
        .auth_service
        .login(&task_manager_client::auth::LoginRequest {
            email: "ada@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    harness.app.store.sign_in(&session);
    harness.platform.clear_log();
    harness
}
