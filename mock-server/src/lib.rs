use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const COLLECTION_PATH: &str = "/business-units";

/// Stored record. Only `id` and `name` are interpreted; every other field is
/// kept as-is and echoed back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Injected failures, used by client tests to exercise error paths.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_list: Option<u16>,
    pub failing_ids: HashMap<u64, u16>,
}

/// Number of requests served per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

#[derive(Debug, Default)]
struct Counters {
    list: AtomicUsize,
    get: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct AppState {
    units: Arc<RwLock<BTreeMap<u64, BusinessUnit>>>,
    faults: Arc<RwLock<Faults>>,
    counters: Arc<Counters>,
}

impl AppState {
    pub async fn seed(&self, units: Vec<BusinessUnit>) {
        let mut stored = self.units.write().await;
        for unit in units {
            stored.insert(unit.id, unit);
        }
    }

    pub async fn units(&self) -> Vec<BusinessUnit> {
        self.units.read().await.values().cloned().collect()
    }

    pub async fn fail_list(&self, status: u16) {
        self.faults.write().await.fail_list = Some(status);
    }

    pub async fn fail_id(&self, id: u64, status: u16) {
        self.faults.write().await.failing_ids.insert(id, status);
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            list: c.list.load(Ordering::SeqCst),
            get: c.get.load(Ordering::SeqCst),
            create: c.create.load(Ordering::SeqCst),
            update: c.update.load(Ordering::SeqCst),
            delete: c.delete.load(Ordering::SeqCst),
        }
    }

    async fn injected(&self, id: u64) -> Option<Response> {
        let faults = self.faults.read().await;
        faults.failing_ids.get(&id).map(|status| fault(*status, id))
    }
}

fn fault(status: u16, id: u64) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("injected failure for business unit {id}")).into_response()
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route(COLLECTION_PATH, get(list_units).post(create_unit))
        .route(
            &format!("{COLLECTION_PATH}/{{id}}"),
            get(get_unit).put(update_unit).delete(delete_unit),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn list_units(State(state): State<AppState>) -> Response {
    state.counters.list.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = state.faults.read().await.fail_list {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "snapshot unavailable").into_response();
    }
    Json(state.units().await).into_response()
}

async fn create_unit(State(state): State<AppState>, Json(input): Json<BusinessUnit>) -> Response {
    state.counters.create.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.injected(input.id).await {
        return response;
    }
    let mut units = state.units.write().await;
    if units.contains_key(&input.id) {
        return (StatusCode::CONFLICT, format!("business unit {} already exists", input.id))
            .into_response();
    }
    tracing::info!(id = input.id, name = %input.name, "created business unit");
    units.insert(input.id, input.clone());
    (StatusCode::CREATED, Json(input)).into_response()
}

async fn get_unit(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<BusinessUnit>, StatusCode> {
    state.counters.get.fetch_add(1, Ordering::SeqCst);
    let units = state.units.read().await;
    units.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut input): Json<BusinessUnit>,
) -> Response {
    state.counters.update.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.injected(id).await {
        return response;
    }
    let mut units = state.units.write().await;
    let Some(stored) = units.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    input.id = id;
    *stored = input.clone();
    tracing::info!(id, "updated business unit");
    Json(input).into_response()
}

async fn delete_unit(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    state.counters.delete.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = state.injected(id).await {
        return response;
    }
    let mut units = state.units.write().await;
    match units.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
