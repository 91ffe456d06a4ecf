use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::domain::{Answer, FeatureKey, FeatureValue, SessionId};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    answer_reply: Value,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn handle_start() -> Json<Value> {
    Json(json!({
        "session_id": "abc",
        "text": "Is it slow tempo?",
        "feature": "tempo",
        "value": "slow"
    }))
}

async fn handle_answer(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.seen.lock().await.push(body);
    Json(state.answer_reply.clone())
}

async fn spawn_backend(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_genie_server(answer_reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        answer_reply,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/start", get(handle_start))
        .route("/answer", post(handle_answer))
        .with_state(state);
    (spawn_backend(app).await, seen)
}

fn backend_for(url: &str) -> HttpGenieBackend {
    HttpGenieBackend::new(url, Duration::from_secs(5)).expect("backend")
}

fn sample_request() -> AnswerRequest {
    AnswerRequest {
        session_id: SessionId("abc".into()),
        feature: FeatureKey("tempo".into()),
        value: FeatureValue::Text("slow".into()),
        answer: Answer::Yes,
    }
}

#[tokio::test]
async fn start_session_parses_start_payload() {
    let (url, _) = spawn_genie_server(json!({})).await;
    let start = backend_for(&url).start_session().await.expect("start");
    assert_eq!(start.session_id, SessionId("abc".into()));
    assert_eq!(start.text, "Is it slow tempo?");
    assert_eq!(start.feature, FeatureKey("tempo".into()));
    assert_eq!(start.value, FeatureValue::Text("slow".into()));
}

#[tokio::test]
async fn submit_answer_posts_wire_body() {
    let (url, seen) = spawn_genie_server(json!({
        "type": "result",
        "song": {"title": "Bohemian Rhapsody"},
        "confidence": 0.92
    }))
    .await;

    let reply = backend_for(&url)
        .submit_answer(&sample_request())
        .await
        .expect("answer");
    assert!(matches!(
        reply,
        AnswerReply::Result { ref song, confidence } if song.title == "Bohemian Rhapsody" && confidence == 0.92
    ));

    let seen = seen.lock().await;
    assert_eq!(
        seen.as_slice(),
        &[json!({"session_id": "abc", "feature": "tempo", "value": "slow", "answer": "yes"})]
    );
}

#[tokio::test]
async fn unknown_reply_shape_is_uncertain() {
    let (url, _) = spawn_genie_server(json!({"type": "shrug"})).await;
    let reply = backend_for(&url)
        .submit_answer(&sample_request())
        .await
        .expect("answer");
    assert_eq!(reply, AnswerReply::Uncertain);
}

#[tokio::test]
async fn base_url_with_path_keeps_prefix() {
    let (url, _) = spawn_genie_server(json!({})).await;
    let nested = Router::new().nest("/genie", Router::new().route("/start", get(handle_start)));
    let nested_url = spawn_backend(nested).await;
    let backend = backend_for(&format!("{nested_url}/genie"));
    assert!(backend.base_url().path().ends_with("/genie/"));
    backend.start_session().await.expect("nested start");

    assert_eq!(backend_for(&url).base_url().path(), "/");
}

#[tokio::test]
async fn error_status_is_reported() {
    let app = Router::new().route(
        "/start",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = spawn_backend(app).await;
    let err = backend_for(&url)
        .start_session()
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        BackendError::Status { status } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let app = Router::new()
        .route("/start", get(|| async { "not json" }))
        .route("/answer", post(|| async { "<html>" }));
    let url = spawn_backend(app).await;
    let backend = backend_for(&url);

    assert!(matches!(
        backend.start_session().await,
        Err(BackendError::Malformed(_))
    ));
    assert!(matches!(
        backend.submit_answer(&sample_request()).await,
        Err(BackendError::Malformed(_))
    ));
}

#[tokio::test]
async fn incomplete_start_payload_is_malformed() {
    let app = Router::new().route(
        "/start",
        get(|| async { Json(json!({"text": "Is it slow tempo?"})) }),
    );
    let url = spawn_backend(app).await;
    assert!(matches!(
        backend_for(&url).start_session().await,
        Err(BackendError::Malformed(_))
    ));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = backend_for(&format!("http://{addr}"))
        .start_session()
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, BackendError::Transport(_)));
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        HttpGenieBackend::new("not a url", Duration::from_secs(1)),
        Err(BackendError::InvalidUrl { .. })
    ));
}
