//! In-memory `Transport` double used by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{BusinessUnit, UnitId};

#[derive(Default)]
struct FakeState {
    remote: Vec<BusinessUnit>,
    fail_list: Option<u16>,
    failing_ids: HashMap<UnitId, u16>,
    delays: HashMap<UnitId, Duration>,
    disconnected: bool,
    calls: Vec<(HttpMethod, String)>,
}

/// Behaves like the remote collection API, keyed on the last URL segment.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub(crate) fn with_remote(remote: Vec<BusinessUnit>) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().remote = remote;
        transport
    }

    pub(crate) fn fail_list(&self, status: u16) {
        self.state.lock().unwrap().fail_list = Some(status);
    }

    pub(crate) fn fail_id(&self, id: UnitId, status: u16) {
        self.state.lock().unwrap().failing_ids.insert(id, status);
    }

    pub(crate) fn delay_id(&self, id: UnitId, delay: Duration) {
        self.state.lock().unwrap().delays.insert(id, delay);
    }

    pub(crate) fn disconnect(&self) {
        self.state.lock().unwrap().disconnected = true;
    }

    pub(crate) fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than the snapshot GET.
    pub(crate) fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(method, _)| *method != HttpMethod::Get)
            .count()
    }

    pub(crate) fn remote(&self) -> Vec<BusinessUnit> {
        self.state.lock().unwrap().remote.clone()
    }
}

fn respond(status: u16, body: String) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

fn item_id(url: &str) -> Option<UnitId> {
    url.rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body_unit: Option<BusinessUnit> = request
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap());
        let id = item_id(&request.url).or(body_unit.as_ref().map(|u| u.id));

        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((request.method, request.url.clone()));
            if state.disconnected {
                return Err(TransportError::Network {
                    method: request.method,
                    endpoint: request.url,
                    message: "connection refused".to_string(),
                    timed_out: false,
                });
            }
            id.and_then(|id| state.delays.get(&id).copied())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if request.method == HttpMethod::Get {
            if let Some(status) = state.fail_list {
                return respond(status, "snapshot unavailable".to_string());
            }
            return respond(200, serde_json::to_string(&state.remote).unwrap());
        }

        let id = id.unwrap();
        if let Some(status) = state.failing_ids.get(&id) {
            return respond(*status, format!("injected failure for {id}"));
        }
        let position = state.remote.iter().position(|u| u.id == id);
        match (request.method, position, body_unit) {
            (HttpMethod::Post, Some(_), _) => respond(409, "already exists".to_string()),
            (HttpMethod::Post, None, Some(unit)) => {
                state.remote.push(unit.clone());
                respond(201, serde_json::to_string(&unit).unwrap())
            }
            (HttpMethod::Put, Some(index), Some(unit)) => {
                state.remote[index] = unit.clone();
                respond(200, serde_json::to_string(&unit).unwrap())
            }
            (HttpMethod::Delete, Some(index), _) => {
                state.remote.remove(index);
                respond(204, String::new())
            }
            _ => respond(404, String::new()),
        }
    }
}
