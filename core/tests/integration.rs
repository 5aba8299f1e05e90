//! Reconciliation passes against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port with its own state, then
//! drives the core over real HTTP through `ReqwestTransport`. Validates that
//! request building, status handling and the reconciler work end-to-end, and
//! catches schema drift between the two crates.

use gym_sync_core::catalog::{boulders_copenhagen, sample_catalog};
use gym_sync_core::{
    Attempt, BusinessUnit, ClientConfig, Lookup, Reconciler, ResourceClient, SyncAction,
    SyncConfig, SyncError, TransportError,
};
use std::time::Duration;

use mock_server::AppState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with_state(listener, state));
    format!("http://{addr}")
}

fn to_mock(unit: &BusinessUnit) -> mock_server::BusinessUnit {
    serde_json::from_value(serde_json::to_value(unit).unwrap()).unwrap()
}

fn reconciler(base_url: &str) -> Reconciler<gym_sync_core::ReqwestTransport> {
    let client = ResourceClient::from_config(&ClientConfig::new(base_url)).unwrap();
    Reconciler::new(client, SyncConfig::default())
}

#[tokio::test]
async fn first_pass_creates_second_pass_updates() {
    let state = AppState::default();
    let base_url = start_server(state.clone()).await;
    let reconciler = reconciler(&base_url);
    let catalog = sample_catalog();

    let first = reconciler.sync_all(&catalog).await.unwrap();
    assert_eq!(first.created, 3);
    assert!(first.is_complete_success());

    let second = reconciler.sync_all(&catalog).await.unwrap();
    assert_eq!(second.updated, 3);
    let echoed = second.outcomes[0].payload().unwrap();
    assert_eq!(echoed, &catalog[0]);

    let calls = state.calls();
    assert_eq!((calls.list, calls.create, calls.update), (2, 3, 3));
}

#[tokio::test]
async fn mixed_pass_reports_each_record() {
    let state = AppState::default();
    state.seed(vec![to_mock(&boulders_copenhagen())]).await;
    state.fail_id(2, 500).await;
    let base_url = start_server(state.clone()).await;

    let report = reconciler(&base_url).sync_all(&sample_catalog()).await.unwrap();

    let actions: Vec<&str> = report.outcomes.iter().map(|o| o.action_name()).collect();
    assert_eq!(actions, vec!["updated", "failed", "created"]);

    let SyncAction::Failed { attempted, error } = &report.outcomes[1].action else {
        panic!("expected failure for id 2");
    };
    assert_eq!(*attempted, Attempt::Create);
    assert_eq!(error.status(), Some(500));
    assert_eq!(error.endpoint(), format!("{base_url}/business-units"));

    let stored: Vec<u64> = state.units().await.iter().map(|u| u.id).collect();
    assert_eq!(stored, vec![1, 3]);
}

#[tokio::test]
async fn snapshot_failure_makes_no_writes() {
    let state = AppState::default();
    state.fail_list(500).await;
    let base_url = start_server(state.clone()).await;

    let err = reconciler(&base_url)
        .sync_all(&sample_catalog())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Snapshot(TransportError::Status { status: 500, .. })
    ));
    let calls = state.calls();
    assert_eq!(calls.create + calls.update, 0);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = reconciler(&format!("http://{addr}"))
        .sync_all(&sample_catalog())
        .await
        .unwrap_err();

    let SyncError::Snapshot(source) = err else {
        panic!("expected snapshot failure");
    };
    assert!(matches!(source, TransportError::Network { .. }));
    assert_eq!(source.status(), None);
}

#[tokio::test]
async fn query_helpers_and_delete_over_http() {
    let state = AppState::default();
    state
        .seed(sample_catalog().iter().map(to_mock).collect())
        .await;
    let base_url = start_server(state).await;
    let client = ResourceClient::from_config(&ClientConfig::new(&base_url)).unwrap();

    let hits = client.search_by_text("COPENHAGEN").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Boulders Copenhagen");

    assert_eq!(client.find_by_id(99).await.unwrap(), Lookup::NotFound(99));
    assert!(client.find_by_id(3).await.unwrap().is_found());

    assert!(client.delete(3).await.unwrap());
    assert_eq!(client.find_by_id(3).await.unwrap(), Lookup::NotFound(3));

    let err = client.delete(3).await.unwrap_err();
    assert!(err.is_not_found());
}

/// Answer snapshot GETs with an empty collection; accept any other request and
/// never reply to it.
async fn start_stalling_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::spawn(serve_until_write(stream));
        }
    });
    format!("http://{addr}")
}

async fn serve_until_write(mut stream: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        if !buf.starts_with(b"GET ") {
            // Hold the connection open without answering.
            std::future::pending::<()>().await;
        }
        buf.drain(..end + 4);
        let response = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n[]";
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

#[tokio::test]
async fn stalled_write_times_out_as_a_record_failure() {
    let base_url = start_stalling_server().await;
    let config = ClientConfig {
        timeout_secs: 1,
        ..ClientConfig::new(&base_url)
    };
    let client = ResourceClient::from_config(&config).unwrap();
    let reconciler = Reconciler::new(client, SyncConfig::default());

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        reconciler.sync_all(&[boulders_copenhagen()]),
    )
    .await
    .expect("pass should finish once the request times out")
    .unwrap();

    assert_eq!(report.failed, 1);
    let SyncAction::Failed { attempted, error } = &report.outcomes[0].action else {
        panic!("expected a failed create");
    };
    assert_eq!(*attempted, Attempt::Create);
    assert!(error.is_timeout());
    assert!(matches!(error, TransportError::Network { timed_out: true, .. }));
    assert_eq!(error.endpoint(), format!("{base_url}/business-units"));
}
