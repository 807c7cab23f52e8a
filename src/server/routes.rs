use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::data::registry::DataRegistry;
use crate::server::api::{
    self, ApiError, AssessRequest, AssessResponse, ErrorBody, QuestionsResponse,
};
use crate::scoring;

/// Built web frontend, when one has been produced. Absent in a plain checkout,
/// where the inline console at `/` stands in.
const WEBUI_DIST_DIR: &str = "webui/dist";

pub fn app(registry: Arc<DataRegistry>) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/questions", get(questions))
        .route("/api/allocations", get(allocations))
        .route("/api/data/version", get(data_version))
        .route("/api/assess-risk", post(assess_risk))
        .route("/api/*rest", any(api_not_found));

    let dist = Path::new(WEBUI_DIST_DIR);
    let router = if dist.is_dir() {
        let index = dist.join("index.html");
        router.fallback_service(ServeDir::new(dist).not_found_service(ServeFile::new(index)))
    } else {
        router.route("/", get(console)).fallback(route_not_found)
    };

    router.with_state(registry)
}

async fn health() -> Json<serde_json::Value> {
    Json(api::health_payload())
}

async fn questions(State(registry): State<Arc<DataRegistry>>) -> Json<QuestionsResponse> {
    Json(api::questions_response(registry.scoring_key()))
}

async fn allocations(State(registry): State<Arc<DataRegistry>>) -> Json<api::AllocationsResponse> {
    Json(api::AllocationsResponse {
        allocations: registry.allocations().to_rows(),
    })
}

async fn data_version(
    State(registry): State<Arc<DataRegistry>>,
) -> Json<api::DataVersionResponse> {
    Json(api::data_version_response(&registry))
}

async fn assess_risk(
    State(registry): State<Arc<DataRegistry>>,
    Json(request): Json<AssessRequest>,
) -> Result<Json<AssessResponse>, ApiError> {
    let assessment = scoring::assess(&request.answers, &registry)?;
    Ok(Json(AssessResponse::from_assessment(&assessment)))
}

async fn api_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("not_found", "unknown api route")),
    )
}

async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("not_found", "route not found")),
    )
}

async fn console() -> Html<String> {
    Html(console_html())
}

fn console_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Lytton Risk Console</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    .question { display: flex; align-items: center; gap: 12px; margin: 6px 0; }
    .question label { min-width: 110px; font-weight: 600; }
    select { padding: 6px; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Lytton Risk Assessment</h1>
  <p>Answer all thirteen questions, then assess to see the tier and allocation.</p>

  <div class="card">
    <strong>Health</strong>
    <div><button id="health-btn">GET /api/health</button></div>
  </div>

  <div class="card">
    <strong>Questionnaire</strong>
    <div id="questions">Loading questions…</div>
    <div><button id="assess-btn">POST /api/assess-risk</button></div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    const questionsEl = document.getElementById('questions');

    async function request(path, options) {
      output.textContent = 'Loading…';
      const response = await fetch(path, options);
      const text = await response.text();
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    }

    fetch('/api/questions').then(r => r.json()).then(data => {
      questionsEl.innerHTML = '';
      data.questions.forEach(q => {
        const row = document.createElement('div');
        row.className = 'question';
        const label = document.createElement('label');
        label.textContent = 'Question ' + q.id;
        const select = document.createElement('select');
        select.dataset.question = q.id;
        q.choices.forEach(letter => {
          const option = document.createElement('option');
          option.value = letter;
          option.textContent = letter;
          select.appendChild(option);
        });
        row.appendChild(label);
        row.appendChild(select);
        questionsEl.appendChild(row);
      });
    }).catch(() => { questionsEl.textContent = 'Failed to load questions.'; });

    document.getElementById('health-btn').addEventListener('click', () => {
      request('/api/health', { method: 'GET' });
    });

    document.getElementById('assess-btn').addEventListener('click', () => {
      const answers = Array.from(questionsEl.querySelectorAll('select')).map(select => ({
        question: Number(select.dataset.question),
        answer: select.value,
      }));
      request('/api/assess-risk', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ answers }),
      });
    });
  </script>
</body>
</html>
"#
    .to_string()
}
