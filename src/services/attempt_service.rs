use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::{Error, Result};
use crate::models::test_attempt::{AttemptStatus, NewTestAttempt, TestAttempt, TestAttemptUpdate};
use crate::services::session_service::SessionService;
use crate::services::test_service::TestService;

#[derive(Debug, Clone, Serialize)]
pub struct StartedAttempt {
    pub attempt_id: Uuid,
    pub total_questions: usize,
    #[serde(skip)]
    pub attempt: TestAttempt,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedAttempt {
    pub success: bool,
    pub attempt_id: Uuid,
}

/// Creates attempts and drives the status transitions that are not tied to
/// question position (pausing lives in `PauseService`).
#[derive(Clone)]
pub struct AttemptService {
    storage: Storage,
    test_service: TestService,
    session_service: SessionService,
}

impl AttemptService {
    pub fn new(storage: Storage) -> Self {
        Self {
            test_service: TestService::new(storage.clone()),
            session_service: SessionService::new(storage.clone()),
            storage,
        }
    }

    pub async fn start(&self, user_id: &str, test_id: Uuid) -> Result<StartedAttempt> {
        if let Some(active) = self.storage.exams.find_in_progress_attempt(user_id).await? {
            tracing::warn!(
                user_id,
                active_attempt = %active.id,
                "rejected start: candidate already has an attempt in progress"
            );
            return Err(Error::Conflict(
                "There is already an attempt in progress for this candidate".to_string(),
            ));
        }

        let loaded = self.test_service.load_test(test_id).await?;
        let first = loaded.questions.first().ok_or_else(|| {
            Error::BadRequest(format!("Mock test {} has no questions", test_id))
        })?;

        let attempt = self
            .storage
            .exams
            .insert_attempt(NewTestAttempt {
                user_id: user_id.to_string(),
                mock_test_id: loaded.test.id,
                current_section: first.section,
                time_remaining_seconds: loaded.test.duration_seconds(),
            })
            .await?;

        tracing::info!(
            attempt_id = %attempt.id,
            user_id,
            %test_id,
            total_questions = loaded.questions.len(),
            "mock test attempt started"
        );

        Ok(StartedAttempt {
            attempt_id: attempt.id,
            total_questions: loaded.questions.len(),
            attempt,
        })
    }

    pub async fn resume(&self, attempt_id: Uuid) -> Result<TestAttempt> {
        let attempt = self.session_service.get_attempt(attempt_id).await?;
        match attempt.status {
            AttemptStatus::InProgress => Ok(attempt),
            AttemptStatus::Paused => {
                // The store rejects this if the candidate started another
                // attempt while this one was paused.
                let resumed = self
                    .storage
                    .exams
                    .update_attempt(
                        attempt_id,
                        TestAttemptUpdate {
                            status: Some(AttemptStatus::InProgress),
                            resumed_at: Some(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(
                    %attempt_id,
                    time_remaining_seconds = resumed.time_remaining_seconds,
                    "mock test attempt resumed"
                );
                Ok(resumed)
            }
            status => Err(Error::InvalidState(format!(
                "Attempt {} is already {}",
                attempt_id, status
            ))),
        }
    }

    pub async fn complete(&self, attempt_id: Uuid) -> Result<CompletedAttempt> {
        let session = self.session_service.compose(attempt_id).await?;
        match session.status {
            AttemptStatus::Completed => {}
            AttemptStatus::Abandoned => {
                return Err(Error::InvalidState(format!(
                    "Attempt {} was abandoned",
                    attempt_id
                )));
            }
            AttemptStatus::InProgress | AttemptStatus::Paused => {
                self.storage
                    .exams
                    .update_attempt(
                        attempt_id,
                        TestAttemptUpdate {
                            status: Some(AttemptStatus::Completed),
                            time_remaining_seconds: Some(session.time_remaining_seconds),
                            completed_at: Some(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(
                    %attempt_id,
                    answered = session.completed_question_ids.len(),
                    total = session.total_questions(),
                    "mock test attempt completed"
                );
            }
        }

        Ok(CompletedAttempt {
            success: true,
            attempt_id,
        })
    }

    /// Administrative exit for attempts that will never be finished.
    pub async fn abandon(&self, attempt_id: Uuid) -> Result<TestAttempt> {
        let attempt = self.session_service.get_attempt(attempt_id).await?;
        if attempt.status.is_terminal() {
            return Err(Error::InvalidState(format!(
                "Attempt {} is already {}",
                attempt_id, attempt.status
            )));
        }

        let abandoned = self
            .storage
            .exams
            .update_attempt(
                attempt_id,
                TestAttemptUpdate {
                    status: Some(AttemptStatus::Abandoned),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(%attempt_id, previous = %attempt.status, "mock test attempt abandoned");
        Ok(abandoned)
    }
}
