//! In-memory stand-in for the catalog and auth backends.
//!
//! Mirrors the FastAPI service: form bodies with an optional `audio` upload,
//! `{"detail": ...}` error bodies, 422 validation issues checked before the
//! 404 lookup.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

struct CollectionSpec {
    name: &'static str,
    label: &'static str,
    id_key: &'static str,
    fields: [&'static str; 2],
    int_field: Option<&'static str>,
}

const COLLECTIONS: [CollectionSpec; 3] = [
    CollectionSpec {
        name: "artists",
        label: "Artist",
        id_key: "Artist_id",
        fields: ["Artist_name", "Country"],
        int_field: None,
    },
    CollectionSpec {
        name: "albums",
        label: "Album",
        id_key: "Album_id",
        fields: ["Album_title", "Total_tracks"],
        int_field: Some("Total_tracks"),
    },
    CollectionSpec {
        name: "songs",
        label: "Song",
        id_key: "Songs_id",
        fields: ["Songs_name", "Gener"],
        int_field: None,
    },
];

fn spec(collection: &str) -> Option<&'static CollectionSpec> {
    COLLECTIONS.iter().find(|spec| spec.name == collection)
}

#[derive(Default)]
struct Store {
    rows: HashMap<&'static str, Vec<Value>>,
    next_id: HashMap<&'static str, u64>,
    users: HashSet<String>,
}

#[derive(Default)]
pub struct BackendState {
    store: Mutex<Store>,
    catalog_requests: AtomicUsize,
    auth_requests: AtomicUsize,
    failing: AtomicBool,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<BackendState>,
    _server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/api/:collection/all", get(list))
            .route("/api/:collection/create", post(create))
            .route("/api/:collection/search", get(search))
            .route("/api/:collection/:id", put(update).delete(delete))
            .route("/login", post(login))
            .route("/auth/signup", post(signup))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            _server: server,
        }
    }

    /// The reference data set: 3 artists, 3 albums, 5 songs.
    pub async fn seeded() -> Self {
        let backend = Self::start().await;
        for (name, country) in [("Queen", "UK"), ("The Weeknd", "Canada"), ("Eagles", "USA")] {
            backend.insert("artists", [name, country]);
        }
        for (title, tracks) in [("Greatest Hits", "15"), ("Summer Vibes", "20"), ("Classic Collection", "12")] {
            backend.insert("albums", [title, tracks]);
        }
        for (name, genre) in [
            ("Bohemian Rhapsody", "Rock"),
            ("Blinding Lights", "Pop"),
            ("Hotel California", "Rock"),
            ("Shape of You", "Pop"),
            ("Stairway to Heaven", "Rock"),
        ] {
            backend.insert("songs", [name, genre]);
        }
        backend
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn auth_base(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests that reached a catalog endpoint
    pub fn catalog_requests(&self) -> usize {
        self.state.catalog_requests.load(Ordering::SeqCst)
    }

    pub fn auth_requests(&self) -> usize {
        self.state.auth_requests.load(Ordering::SeqCst)
    }

    pub fn count(&self, collection: &str) -> usize {
        let store = self.state.store.lock().unwrap();
        store.rows.get(collection).map(Vec::len).unwrap_or(0)
    }

    pub fn row(&self, collection: &str, id: u64) -> Option<Value> {
        let spec = spec(collection)?;
        let store = self.state.store.lock().unwrap();
        store
            .rows
            .get(collection)?
            .iter()
            .find(|row| row[spec.id_key] == json!(id))
            .cloned()
    }

    /// Make every catalog endpoint answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn register_user(&self, email: &str) {
        self.state.store.lock().unwrap().users.insert(email.to_string());
    }

    fn insert(&self, collection: &str, values: [&str; 2]) -> Value {
        let spec = spec(collection).unwrap();
        let fields = spec
            .fields
            .iter()
            .zip(values)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let mut store = self.state.store.lock().unwrap();
        store.insert(spec, &fields, None)
    }
}

/// An address nothing listens on.
pub async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

impl Store {
    fn insert(
        &mut self,
        spec: &'static CollectionSpec,
        fields: &HashMap<String, String>,
        audio: Option<&str>,
    ) -> Value {
        let next = self.next_id.entry(spec.name).or_insert(1);
        let id = *next;
        *next += 1;
        let row = build_row(spec, id, fields, audio.map(|f| format!("/static/{f}")));
        self.rows.entry(spec.name).or_default().push(row.clone());
        row
    }
}

fn build_row(
    spec: &CollectionSpec,
    id: u64,
    fields: &HashMap<String, String>,
    audio_url: Option<String>,
) -> Value {
    let mut row = Map::new();
    row.insert(spec.id_key.to_string(), json!(id));
    for field in spec.fields {
        let value = &fields[field];
        let value = match spec.int_field {
            Some(int_field) if int_field == field => json!(value.trim().parse::<i64>().unwrap()),
            _ => json!(value),
        };
        row.insert(field.to_string(), value);
    }
    row.insert("audio_url".to_string(), json!(audio_url));
    Value::Object(row)
}

fn detail(status: StatusCode, detail: impl Into<Value>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

fn gate(state: &BackendState, collection: &str) -> Result<&'static CollectionSpec, Response> {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }
    spec(collection).ok_or_else(|| detail(StatusCode::NOT_FOUND, "Not Found"))
}

struct Form {
    fields: HashMap<String, String>,
    audio: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Form {
    let mut form = Form {
        fields: HashMap::new(),
        audio: None,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "audio" {
            form.audio = field.file_name().map(str::to_string);
            let _ = field.bytes().await.unwrap();
        } else {
            let value = field.text().await.unwrap();
            form.fields.insert(name, value);
        }
    }
    form
}

/// FastAPI-style 422 issues for missing or malformed form fields
fn validate(spec: &CollectionSpec, form: &Form) -> Option<Response> {
    let mut issues = Vec::new();
    for field in spec.fields {
        match form.fields.get(field) {
            None => issues.push(json!({
                "type": "missing",
                "loc": ["body", field],
                "msg": "Field required",
                "input": null,
            })),
            Some(value) if spec.int_field == Some(field) && value.trim().parse::<i64>().is_err() => {
                issues.push(json!({
                    "type": "int_parsing",
                    "loc": ["body", field],
                    "msg": "Input should be a valid integer, unable to parse string as an integer",
                    "input": value,
                }))
            }
            Some(_) => {}
        }
    }
    if issues.is_empty() {
        None
    } else {
        Some(detail(StatusCode::UNPROCESSABLE_ENTITY, issues))
    }
}

async fn list(State(state): State<Arc<BackendState>>, Path(collection): Path<String>) -> Response {
    let spec = match gate(&state, &collection) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    let store = state.store.lock().unwrap();
    Json(store.rows.get(spec.name).cloned().unwrap_or_default()).into_response()
}

async fn search(
    State(state): State<Arc<BackendState>>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let spec = match gate(&state, &collection) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    let Some(query) = params.get("query") else {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{ "type": "missing", "loc": ["query", "query"], "msg": "Field required" }]),
        );
    };
    let needle = query.to_lowercase();
    let store = state.store.lock().unwrap();
    let matches: Vec<Value> = store
        .rows
        .get(spec.name)
        .into_iter()
        .flatten()
        .filter(|row| {
            row[spec.fields[0]]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    Json(matches).into_response()
}

async fn create(
    State(state): State<Arc<BackendState>>,
    Path(collection): Path<String>,
    multipart: Multipart,
) -> Response {
    let spec = match gate(&state, &collection) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    let form = read_form(multipart).await;
    if let Some(rejection) = validate(spec, &form) {
        return rejection;
    }
    let mut store = state.store.lock().unwrap();
    Json(store.insert(spec, &form.fields, form.audio.as_deref())).into_response()
}

async fn update(
    State(state): State<Arc<BackendState>>,
    Path((collection, id)): Path<(String, u64)>,
    multipart: Multipart,
) -> Response {
    let spec = match gate(&state, &collection) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    let form = read_form(multipart).await;
    if let Some(rejection) = validate(spec, &form) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();
    let rows = store.rows.entry(spec.name).or_default();
    let Some(row) = rows.iter_mut().find(|row| row[spec.id_key] == json!(id)) else {
        return detail(StatusCode::NOT_FOUND, format!("{} not found", spec.label));
    };
    let audio_url = match form.audio {
        Some(file) => Some(format!("/static/{file}")),
        None => row["audio_url"].as_str().map(str::to_string),
    };
    *row = build_row(spec, id, &form.fields, audio_url);
    Json(row.clone()).into_response()
}

async fn delete(
    State(state): State<Arc<BackendState>>,
    Path((collection, id)): Path<(String, u64)>,
) -> Response {
    let spec = match gate(&state, &collection) {
        Ok(spec) => spec,
        Err(response) => return response,
    };
    let mut store = state.store.lock().unwrap();
    let rows = store.rows.entry(spec.name).or_default();
    let Some(index) = rows.iter().position(|row| row[spec.id_key] == json!(id)) else {
        return detail(StatusCode::NOT_FOUND, format!("{} not found", spec.label));
    };
    rows.remove(index);
    Json(json!({ "message": format!("{} deleted successfully", spec.label) })).into_response()
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.auth_requests.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if body["password"] == "wrong" {
        return detail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    if body["password"] == "garbled" {
        return "<html>maintenance</html>".into_response();
    }
    Json(json!({
        "access_token": format!("token-{email}"),
        "token_type": "bearer",
        "email": email,
    }))
    .into_response()
}

async fn signup(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.auth_requests.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut store = state.store.lock().unwrap();
    if !store.users.insert(email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    StatusCode::CREATED.into_response()
}
