use uuid::Uuid;
use validator::Validate;

use crate::database::store::Storage;
use crate::dto::exam_dto::SubmitAnswerRequest;
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::test_attempt::AttemptStatus;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AnswerService {
    storage: Storage,
    session_service: SessionService,
}

impl AnswerService {
    pub fn new(storage: Storage) -> Self {
        Self {
            session_service: SessionService::new(storage.clone()),
            storage,
        }
    }

    /// Appends an answer record. Resubmitting the same occurrence creates a
    /// second record; the session treats the occurrence as answered either way.
    pub async fn submit(&self, attempt_id: Uuid, req: SubmitAnswerRequest) -> Result<Answer> {
        req.validate()?;

        let attempt = self.session_service.get_attempt(attempt_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "Attempt {} is {}",
                attempt_id, attempt.status
            )));
        }

        let questions = self
            .storage
            .exams
            .list_test_questions(attempt.mock_test_id)
            .await?;
        let occurrence = questions
            .iter()
            .find(|q| q.id == req.occurrence_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Question {} is not part of this mock test",
                    req.occurrence_id
                ))
            })?;
        if occurrence.question_id != req.item_id || occurrence.question_bank != req.question_bank {
            return Err(Error::BadRequest(format!(
                "Item {} in {} does not match question {}",
                req.item_id,
                req.question_bank.table_name(),
                req.occurrence_id
            )));
        }

        let answer = self
            .storage
            .exams
            .insert_answer(NewAnswer {
                attempt_id,
                test_question_id: req.occurrence_id,
                question_id: req.item_id,
                question_bank: req.question_bank,
                response: req.response,
                elapsed_seconds: req.elapsed_seconds,
            })
            .await?;

        tracing::info!(
            %attempt_id,
            occurrence_id = %answer.test_question_id,
            elapsed_seconds = answer.elapsed_seconds,
            "answer recorded"
        );
        Ok(answer)
    }
}
