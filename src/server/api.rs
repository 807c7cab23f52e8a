use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::data::allocation::AllocationRow;
use crate::data::registry::DataRegistry;
use crate::data::scoring_key::{Choice, ScoringKey};
use crate::scoring::{Answer, AssessError, Assessment, ScoreError, Tier};

#[derive(Debug, Clone, Deserialize)]
pub struct AssessRequest {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessResponse {
    pub status: &'static str,
    pub raw_score: f64,
    pub risk_tier: f64,
    pub profile: &'static str,
    pub allocation: AllocationSplit,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationSplit {
    pub money_market: u32,
    pub obligation: u32,
    pub stocks: u32,
}

impl AssessResponse {
    pub fn from_assessment(assessment: &Assessment) -> AssessResponse {
        AssessResponse {
            status: "ok",
            raw_score: f64::from(assessment.raw_score),
            risk_tier: assessment.tier.value(),
            profile: assessment.allocation.profile.as_str(),
            allocation: AllocationSplit {
                money_market: assessment.allocation.money_market,
                obligation: assessment.allocation.obligation,
                stocks: assessment.allocation.stocks,
            },
        }
    }
}

pub fn health_payload() -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "service": "lytton-api",
        "version": env!("CARGO_PKG_VERSION")
    })
}

/// Questionnaire shape for form rendering: ids and allowed letters only.
/// Point values stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub id: u32,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<QuestionSummary>,
}

pub fn questions_response(key: &ScoringKey) -> QuestionsResponse {
    QuestionsResponse {
        questions: key
            .question_ids()
            .map(|id| QuestionSummary {
                id,
                choices: key.allowed_choices(id),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationsResponse {
    pub allocations: Vec<AllocationRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataVersionResponse {
    pub scoring_key_source: String,
    pub allocations_source: String,
    pub question_count: usize,
    pub tier_count: usize,
    pub loaded_at: String,
}

pub fn data_version_response(registry: &DataRegistry) -> DataVersionResponse {
    let provenance = registry.provenance();
    DataVersionResponse {
        scoring_key_source: provenance.scoring_key_source.describe(),
        allocations_source: provenance.allocations_source.describe(),
        question_count: registry.scoring_key().question_count(),
        tier_count: Tier::COUNT,
        loaded_at: provenance.loaded_at.clone(),
    }
}

/// Structured error body. `code` names the violated rule; the optional fields
/// carry the offending question/choice when the rule has one.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Choice>>,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            status: "error",
            code,
            message: message.into(),
            question: None,
            choice: None,
            allowed: None,
        }
    }
}

/// Assessment failure mapped onto an HTTP response. Input violations are the
/// client's problem; a tier with no allocation row is ours.
#[derive(Debug)]
pub struct ApiError(pub AssessError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AssessError::Score(_) => StatusCode::BAD_REQUEST,
            AssessError::Allocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let message = self.0.to_string();
        match &self.0 {
            AssessError::Score(ScoreError::DuplicateQuestion(question)) => {
                let mut body = ErrorBody::new("duplicate_question", message);
                body.question = Some(*question);
                body
            }
            AssessError::Score(ScoreError::UnknownQuestion(question)) => {
                let mut body = ErrorBody::new("unknown_question", message);
                body.question = Some(*question);
                body
            }
            AssessError::Score(ScoreError::InvalidChoice {
                question,
                choice,
                allowed,
            }) => {
                let mut body = ErrorBody::new("invalid_choice", message);
                body.question = Some(*question);
                body.choice = Some(*choice);
                body.allowed = Some(allowed.clone());
                body
            }
            AssessError::Score(ScoreError::IncompleteAnswerSet { .. }) => {
                ErrorBody::new("incomplete_answer_set", message)
            }
            AssessError::Allocation(_) => ErrorBody::new("allocation_not_configured", message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<AssessError> for ApiError {
    fn from(err: AssessError) -> Self {
        ApiError(err)
    }
}
