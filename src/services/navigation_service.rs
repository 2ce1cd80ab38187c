use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::{Error, Result};
use crate::models::test_attempt::TestAttemptUpdate;
use crate::services::session_service::{QuestionDescriptor, SessionService};

#[derive(Clone)]
pub struct NavigationService {
    storage: Storage,
    session_service: SessionService,
}

impl NavigationService {
    pub fn new(storage: Storage) -> Self {
        Self {
            session_service: SessionService::new(storage.clone()),
            storage,
        }
    }

    /// Moves the attempt one question forward and returns the question the
    /// candidate now faces. Fails with `NoMoreQuestions` on the last question,
    /// leaving the attempt untouched.
    pub async fn advance(&self, attempt_id: Uuid) -> Result<QuestionDescriptor> {
        let session = self.session_service.compose(attempt_id).await?;
        session.ensure_in_progress()?;

        if session.is_last_question() {
            return Err(Error::NoMoreQuestions);
        }

        let next_index = session.current_index() + 1;
        // Section comes from the post-increment question.
        let next = session.questions[next_index].clone();
        let next_index = i32::try_from(next_index)
            .map_err(|_| Error::Internal(format!("question index {} overflows", next_index)))?;

        self.storage
            .exams
            .update_attempt(
                attempt_id,
                TestAttemptUpdate {
                    current_question_index: Some(next_index),
                    current_section: Some(next.section),
                    ..Default::default()
                },
            )
            .await?;

        if next.section != session.current_section {
            tracing::info!(
                %attempt_id,
                from = %session.current_section,
                to = %next.section,
                "attempt entered a new section"
            );
        }

        Ok(next)
    }
}
