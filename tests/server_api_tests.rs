use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lytton::data::allocation::{AllocationTable, AllocationsFile};
use lytton::data::registry::{DataRegistry, ALLOCATIONS_FILE, SCORING_KEY_FILE};
use lytton::data::scoring_key::{ScoringKey, ScoringKeyFile};
use lytton::server::routes;

fn test_app() -> Router {
    routes::app(Arc::new(DataRegistry::builtin()))
}

async fn get_response(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = app.oneshot(request).await.expect("request should route");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, bytes.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get_response(app, uri).await;
    let body = serde_json::from_slice(&bytes).expect("response should be valid json");
    (status, body)
}

async fn post_raw(app: Router, uri: &str, payload: String) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .expect("request should build");
    let response = app.oneshot(request).await.expect("request should route");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, bytes.to_vec())
}

async fn post_json(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let (status, bytes) = post_raw(app, uri, payload.to_string()).await;
    let body = serde_json::from_slice(&bytes).expect("response should be valid json");
    (status, body)
}

fn answers_payload(choose: impl Fn(u32) -> &'static str) -> Value {
    let answers: Vec<Value> = (1..=13)
        .map(|question| json!({ "question": question, "answer": choose(question) }))
        .collect();
    json!({ "answers": answers })
}

fn lowest_payload() -> Value {
    answers_payload(|q| if q == 1 { "D" } else { "A" })
}

fn highest_payload() -> Value {
    answers_payload(|q| match q {
        1 => "A",
        4 | 5 => "C",
        9 | 10 => "B",
        _ => "D",
    })
}

#[tokio::test]
async fn health_endpoint_identifies_the_service() {
    let (status, body) = get_json(test_app(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lytton-api");
    assert!(body["version"].is_string(), "version should be reported");
}

#[tokio::test]
async fn questions_endpoint_lists_ids_and_letters() {
    let (status, body) = get_json(test_app(), "/api/questions").await;

    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"]
        .as_array()
        .expect("questions should be an array");
    assert_eq!(questions.len(), 13);
    assert_eq!(questions[0]["id"], 1);
    assert_eq!(questions[0]["choices"], json!(["A", "B", "C", "D"]));
    assert_eq!(questions[3]["id"], 4);
    assert_eq!(questions[3]["choices"], json!(["A", "B", "C"]));
    assert_eq!(questions[8]["id"], 9);
    assert_eq!(questions[8]["choices"], json!(["A", "B"]));
}

#[tokio::test]
async fn allocations_endpoint_returns_the_full_tier_table() {
    let (status, body) = get_json(test_app(), "/api/allocations").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["allocations"]
        .as_array()
        .expect("allocations should be an array");
    assert_eq!(rows.len(), 19);
    assert_eq!(rows[0]["risk_tier"], 1.0);
    assert_eq!(rows[0]["profile"], "Conservative");
    assert_eq!(rows[18]["risk_tier"], 10.0);
    assert_eq!(rows[18]["profile"], "Aggressive");

    for row in rows {
        let total = row["money_market"].as_u64().expect("money_market should be a number")
            + row["obligation"].as_u64().expect("obligation should be a number")
            + row["stocks"].as_u64().expect("stocks should be a number");
        assert_eq!(
            total, 100,
            "weights for tier {} should sum to 100",
            row["risk_tier"]
        );
    }
}

#[tokio::test]
async fn data_version_endpoint_reports_builtin_sources() {
    let (status, body) = get_json(test_app(), "/api/data/version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scoring_key_source"], "builtin");
    assert_eq!(body["allocations_source"], "builtin");
    assert_eq!(body["question_count"], 13);
    assert_eq!(body["tier_count"], 19);
    assert!(body["loaded_at"].is_string(), "load time should be reported");
}

#[tokio::test]
async fn assess_endpoint_scores_the_highest_risk_submission() {
    let (status, body) = post_json(test_app(), "/api/assess-risk", &highest_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["raw_score"], 48.0);
    assert_eq!(body["risk_tier"], 10.0);
    assert_eq!(body["profile"], "Aggressive");
    assert_eq!(body["allocation"]["money_market"], 10);
    assert_eq!(body["allocation"]["obligation"], 20);
    assert_eq!(body["allocation"]["stocks"], 70);
}

#[tokio::test]
async fn assess_endpoint_scores_the_lowest_risk_submission() {
    let (status, body) = post_json(test_app(), "/api/assess-risk", &lowest_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw_score"], 13.0);
    assert_eq!(body["risk_tier"], 3.5);
    assert_eq!(body["profile"], "Conservative");
    assert_eq!(body["allocation"]["money_market"], 27);
    assert_eq!(body["allocation"]["obligation"], 62);
    assert_eq!(body["allocation"]["stocks"], 11);
}

#[tokio::test]
async fn duplicate_answer_is_a_bad_request() {
    let mut payload = lowest_payload();
    payload["answers"][4] = json!({ "question": 2, "answer": "A" });

    let (status, body) = post_json(test_app(), "/api/assess-risk", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "duplicate_question");
    assert_eq!(body["question"], 2);
    let message = body["message"].as_str().expect("message should be text");
    assert!(
        message.contains("answered more than once"),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn unknown_question_is_a_bad_request() {
    let mut payload = lowest_payload();
    payload["answers"][12] = json!({ "question": 99, "answer": "A" });

    let (status, body) = post_json(test_app(), "/api/assess-risk", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "unknown_question");
    assert_eq!(body["question"], 99);
}

#[tokio::test]
async fn invalid_choice_reports_the_allowed_letters() {
    let mut payload = lowest_payload();
    payload["answers"][3] = json!({ "question": 4, "answer": "D" });

    let (status, body) = post_json(test_app(), "/api/assess-risk", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_choice");
    assert_eq!(body["question"], 4);
    assert_eq!(body["choice"], "D");
    assert_eq!(body["allowed"], json!(["A", "B", "C"]));
}

#[tokio::test]
async fn short_answer_set_is_a_bad_request() {
    let mut payload = lowest_payload();
    payload["answers"]
        .as_array_mut()
        .expect("answers should be an array")
        .pop();

    let (status, body) = post_json(test_app(), "/api/assess-risk", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "incomplete_answer_set");
    let message = body["message"].as_str().expect("message should be text");
    assert!(
        message.contains("expected answers for all 13"),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn letter_past_d_is_rejected_during_deserialization() {
    let mut payload = lowest_payload();
    payload["answers"][0] = json!({ "question": 1, "answer": "E" });

    let (status, _body) = post_raw(test_app(), "/api/assess-risk", payload.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (status, _body) =
        post_raw(test_app(), "/api/assess-risk", "{not valid json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_api_route_returns_not_found() {
    let (status, body) = get_json(test_app(), "/api/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "unknown api route");
}

#[tokio::test]
async fn console_page_is_served_at_the_root() {
    let (status, bytes) = get_response(test_app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("Lytton Risk Assessment"));
    assert!(page.contains("assess-risk"));
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be past the epoch")
        .as_nanos();
    env::temp_dir().join(format!("lytton-{name}-{stamp}"))
}

#[tokio::test]
async fn missing_allocation_row_surfaces_as_a_server_error() {
    let dir = unique_temp_dir("gap");
    fs::create_dir_all(&dir).expect("temp dir should be creatable");

    let key_file = ScoringKeyFile {
        questions: ScoringKey::builtin().to_rows(),
    };
    fs::write(
        dir.join(SCORING_KEY_FILE),
        serde_json::to_string_pretty(&key_file).expect("key should serialize"),
    )
    .expect("scoring key file should write");

    let mut rows = AllocationTable::builtin().to_rows();
    rows.retain(|row| row.risk_tier != 3.5);
    let allocations_file = AllocationsFile { allocations: rows };
    fs::write(
        dir.join(ALLOCATIONS_FILE),
        serde_json::to_string_pretty(&allocations_file).expect("table should serialize"),
    )
    .expect("allocations file should write");

    let registry = DataRegistry::from_data_dir(&dir).expect("override tables should load");
    let app = routes::app(Arc::new(registry));

    let (status, body) = post_json(app, "/api/assess-risk", &lowest_payload()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "allocation_not_configured");
    let message = body["message"].as_str().expect("message should be text");
    assert!(message.contains("3.5"), "unexpected message: {message}");

    let _ = fs::remove_dir_all(&dir);
}
