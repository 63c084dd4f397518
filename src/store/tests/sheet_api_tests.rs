use super::*;
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct ServerState {
    papers: Arc<Mutex<Vec<Paper>>>,
    fail_update: bool,
}

async fn data(State(state): State<ServerState>) -> Json<serde_json::Value> {
    let papers = state.papers.lock().unwrap().clone();
    Json(serde_json::json!({
        "papers": papers,
        "researcher": {
            "name": "Dr. Test",
            "credentials": "MBBS",
            "guide": "Prof. Guide",
            "guideCredentials": "MS Ortho"
        }
    }))
}

async fn update(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    if state.fail_update {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let papers: Vec<Paper> =
        serde_json::from_value(body["papers"].clone()).expect("papers in body");
    *state.papers.lock().unwrap() = papers;
    StatusCode::OK
}

async fn spawn_server(state: ServerState) -> String {
    let app = Router::new()
        .route("/api/data", get(data))
        .route("/api/update", post(update))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

#[test]
fn localhost_origin_uses_dev_server() {
    assert_eq!(
        resolve_api_base(None, "http://localhost:5173").unwrap(),
        DEV_API_BASE
    );
}

#[test]
fn remote_origin_is_same_origin() {
    assert_eq!(
        resolve_api_base(None, "https://tracker.example.org/").unwrap(),
        "https://tracker.example.org"
    );
}

#[test]
fn explicit_base_wins_and_is_validated() {
    assert_eq!(
        resolve_api_base(Some("http://10.0.0.2:3001/"), "http://localhost").unwrap(),
        "http://10.0.0.2:3001"
    );
    assert!(resolve_api_base(Some("not a url"), "http://localhost").is_err());
}

#[tokio::test]
async fn fetches_papers_and_researcher() {
    let state = ServerState::default();
    state
        .papers
        .lock()
        .unwrap()
        .push(Paper::new(1, "Cervical myelopathy", "GS Journal"));
    let base = spawn_server(state).await;

    let store = SheetApiStore::new(reqwest::Client::new(), base);
    let data = store.fetch().await.expect("fetch");
    assert_eq!(data.papers.len(), 1);
    assert_eq!(data.papers[0].status, "GS Journal");
    assert_eq!(data.researcher.guide_credentials, "MS Ortho");
}

#[tokio::test]
async fn push_sends_full_collection() {
    let state = ServerState::default();
    let base = spawn_server(state.clone()).await;
    let store = SheetApiStore::new(reqwest::Client::new(), base);

    let papers = vec![
        Paper::new(1, "A", "Rejected"),
        Paper::new(4, "B", "Yet to start"),
    ];
    store.push(&papers).await.expect("push");
    assert_eq!(*state.papers.lock().unwrap(), papers);
}

#[tokio::test]
async fn push_reports_http_failure() {
    let state = ServerState {
        fail_update: true,
        ..Default::default()
    };
    let base = spawn_server(state).await;
    let store = SheetApiStore::new(reqwest::Client::new(), base);

    let err = store.push(&[]).await.expect_err("should fail");
    assert!(matches!(
        err,
        StoreError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn fetch_from_unreachable_server_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = SheetApiStore::new(reqwest::Client::new(), format!("http://{addr}"));
    assert!(matches!(store.fetch().await, Err(StoreError::Http(_))));
}
