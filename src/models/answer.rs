use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::question::QuestionBank;

/// A candidate's response, tagged by shape.
///
/// Speaking items carry a `media` reference to the uploaded recording, writing
/// items carry `text`, and the choice/reorder item families in reading and
/// listening carry `selections` or `ordering`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponsePayload {
    Text {
        text: String,
    },
    Selections {
        selected: Vec<String>,
    },
    Ordering {
        order: Vec<String>,
    },
    Media {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub test_question_id: Uuid,
    pub question_id: Uuid,
    pub question_bank: QuestionBank,
    pub response: Json<ResponsePayload>,
    pub elapsed_seconds: i32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub attempt_id: Uuid,
    pub test_question_id: Uuid,
    pub question_id: Uuid,
    pub question_bank: QuestionBank,
    pub response: ResponsePayload,
    pub elapsed_seconds: i32,
}
