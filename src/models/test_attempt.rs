use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::section::Section;

/// Persisted attempt states. "Not started" is the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "attempt_status", rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Paused,
    Completed,
    Abandoned,
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Completed | AttemptStatus::Abandoned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Paused => "paused",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TestAttempt {
    pub id: Uuid,
    pub user_id: String,
    pub mock_test_id: Uuid,
    pub status: AttemptStatus,
    pub current_question_index: i32,
    pub current_section: Section,
    pub pause_count: i32,
    /// Budget left as of `resumed_at`. Only banked on pause and completion.
    pub time_remaining_seconds: i32,
    pub started_at: DateTime<Utc>,
    /// Start of the current running stretch.
    pub resumed_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTestAttempt {
    pub user_id: String,
    pub mock_test_id: Uuid,
    pub current_section: Section,
    pub time_remaining_seconds: i32,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestAttemptUpdate {
    pub status: Option<AttemptStatus>,
    pub current_question_index: Option<i32>,
    pub current_section: Option<Section>,
    pub pause_count: Option<i32>,
    pub time_remaining_seconds: Option<i32>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
