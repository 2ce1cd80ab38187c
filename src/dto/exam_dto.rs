use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::ResponsePayload;
use crate::models::question::QuestionBank;
use crate::models::test_attempt::AttemptStatus;
use crate::services::timing_service::Timing;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AccessQuery {
    #[validate(length(min = 1))]
    pub candidate_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1))]
    pub candidate_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub occurrence_id: Uuid,
    pub item_id: Uuid,
    pub question_bank: QuestionBank,
    pub response: ResponsePayload,
    #[validate(range(min = 0))]
    pub elapsed_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseResponse {
    pub success: bool,
    pub pause_count: i32,
    pub pauses_remaining: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeResponse {
    pub success: bool,
    pub status: AttemptStatus,
    pub time_remaining_seconds: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingQuery {
    pub section: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingResponse {
    pub timing: Timing,
    pub label: String,
    /// Countdown rendering of the answer or section budget.
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSyncRequest {
    pub client_now_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSyncResponse {
    pub server_now_ms: i64,
    pub drift_ms: i64,
}
