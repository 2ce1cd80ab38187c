use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::{Error, Result};
use crate::models::question::{BankItem, QuestionBank};
use crate::models::section::Section;
use crate::models::test::MockTest;
use crate::models::test_attempt::{AttemptStatus, TestAttempt};
use crate::services::timing_service::{timing_for_section, Timing};
use crate::utils::time;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionDescriptor {
    /// Occurrence id (`mock_test_questions.id`).
    pub id: Uuid,
    pub question_id: Uuid,
    pub question_bank: QuestionBank,
    pub section: Section,
    pub order_index: i32,
    pub time_limit_seconds: Option<i32>,
    pub item: Option<BankItem>,
    pub timing: Timing,
}

/// Point-in-time view of an attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub attempt_id: Uuid,
    pub user_id: String,
    pub test: MockTest,
    pub status: AttemptStatus,
    pub current_section: Section,
    pub current_question_index: i32,
    pub pause_count: i32,
    /// Live countdown value; frozen while paused.
    pub time_remaining_seconds: i32,
    /// Projected finish on the server clock; only set while the countdown runs.
    pub ends_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionDescriptor>,
    pub completed_question_ids: Vec<Uuid>,
    pub current_question: Option<QuestionDescriptor>,
}

impl Session {
    pub fn current_index(&self) -> usize {
        self.current_question_index.max(0) as usize
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index() + 1 >= self.questions.len()
    }

    pub fn is_at_section_boundary(&self) -> bool {
        is_section_boundary(&self.questions, self.current_index())
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidState(format!(
                "Attempt {} is already {}",
                self.attempt_id, self.status
            )));
        }
        Ok(())
    }

    /// Candidate-driven actions need a running attempt.
    pub fn ensure_in_progress(&self) -> Result<()> {
        self.ensure_active()?;
        if self.status != AttemptStatus::InProgress {
            return Err(Error::InvalidState(format!(
                "Attempt {} is {}",
                self.attempt_id, self.status
            )));
        }
        Ok(())
    }
}

/// True when `index` is the last question of its section: the next question
/// starts another section, or there is no next question.
pub fn is_section_boundary(questions: &[QuestionDescriptor], index: usize) -> bool {
    let Some(current) = questions.get(index) else {
        return false;
    };
    match questions.get(index + 1) {
        Some(next) => next.section != current.section,
        None => true,
    }
}

#[derive(Clone)]
pub struct SessionService {
    storage: Storage,
}

impl SessionService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn get_attempt(&self, attempt_id: Uuid) -> Result<TestAttempt> {
        self.storage
            .exams
            .get_attempt(attempt_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))
    }

    pub async fn compose(&self, attempt_id: Uuid) -> Result<Session> {
        let attempt = self.get_attempt(attempt_id).await?;
        let test = self
            .storage
            .exams
            .get_test(attempt.mock_test_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Mock test {} not found", attempt.mock_test_id))
            })?;
        let questions = self
            .storage
            .exams
            .list_test_questions(attempt.mock_test_id)
            .await?;
        let answers = self.storage.exams.list_answers(attempt.id).await?;
        let answered: HashSet<Uuid> = answers.iter().map(|a| a.test_question_id).collect();

        let mut descriptors = Vec::with_capacity(questions.len());
        for question in questions {
            let item = self
                .storage
                .banks
                .reader(question.question_bank)
                .get_item(question.question_id)
                .await?;
            if item.is_none() {
                tracing::warn!(
                    occurrence_id = %question.id,
                    item_id = %question.question_id,
                    bank = question.question_bank.table_name(),
                    "question content missing from item bank"
                );
            }
            let timing = timing_for_section(
                question.section,
                item.as_ref().map(|i| i.item_type.as_str()),
            );
            descriptors.push(QuestionDescriptor {
                id: question.id,
                question_id: question.question_id,
                question_bank: question.question_bank,
                section: question.section,
                order_index: question.order_index,
                time_limit_seconds: question.time_limit_seconds,
                item,
                timing,
            });
        }

        let completed_question_ids = descriptors
            .iter()
            .filter(|d| answered.contains(&d.id))
            .map(|d| d.id)
            .collect();
        let current_question = usize::try_from(attempt.current_question_index)
            .ok()
            .and_then(|idx| descriptors.get(idx).cloned());

        // The countdown only runs while in progress, anchored at `resumed_at`.
        let running = attempt.status == AttemptStatus::InProgress;
        let time_remaining_seconds = if running {
            time::remaining_seconds(
                attempt.time_remaining_seconds,
                attempt.resumed_at,
                time::now(),
            )
        } else {
            attempt.time_remaining_seconds
        };
        let ends_at = running.then(|| {
            time::end_at(
                attempt.resumed_at,
                i64::from(attempt.time_remaining_seconds) * time::MS_PER_SECOND,
            )
        });

        Ok(Session {
            attempt_id: attempt.id,
            user_id: attempt.user_id,
            test,
            status: attempt.status,
            current_section: attempt.current_section,
            current_question_index: attempt.current_question_index,
            pause_count: attempt.pause_count,
            time_remaining_seconds,
            ends_at,
            questions: descriptors,
            completed_question_ids,
            current_question,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::ExamStore;
    use crate::models::answer::{NewAnswer, ResponsePayload};
    use crate::models::test_attempt::TestAttemptUpdate;
    use crate::services::fixtures::Fixture;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn composes_session_with_resolved_content() {
        let fx = Fixture::new(&[Section::Speaking, Section::Writing, Section::Listening], 90);
        let attempt = fx.start("user-1").await;

        let session = SessionService::new(fx.storage())
            .compose(attempt.id)
            .await
            .unwrap();

        assert_eq!(session.status, AttemptStatus::InProgress);
        assert_eq!(session.current_section, Section::Speaking);
        assert_eq!(session.total_questions(), 3);
        assert!(session.questions.iter().all(|q| q.item.is_some()));
        let current = session.current_question.unwrap();
        assert_eq!(current.id, fx.questions[0].id);
        assert_eq!(current.item.unwrap().item_type, "read_aloud");
        assert!(matches!(current.timing, Timing::Item { section: Section::Speaking, .. }));

        let ends_at = session.ends_at.unwrap();
        let remaining = ends_at - Utc::now();
        assert!(remaining.num_seconds() > 90 * 60 - 5);
        assert!(remaining.num_seconds() <= 90 * 60);
    }

    #[tokio::test]
    async fn projected_end_is_stable_between_reads() {
        let fx = Fixture::new(&[Section::Reading], 30);
        let attempt = fx.start("user-1").await;
        let sessions = SessionService::new(fx.storage());

        let first = sessions.compose(attempt.id).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(1100)).await;
        let second = sessions.compose(attempt.id).await.unwrap();

        assert_eq!(first.ends_at, second.ends_at);
        assert_eq!(first.time_remaining_seconds, 30 * 60);
        assert!(second.time_remaining_seconds < first.time_remaining_seconds);
    }

    #[tokio::test]
    async fn countdown_is_measured_from_the_last_resume() {
        let fx = Fixture::new(&[Section::Reading], 30);
        let attempt = fx.start("user-1").await;
        let resumed_at = Utc::now() - chrono::Duration::minutes(10);
        fx.store
            .update_attempt(
                attempt.id,
                TestAttemptUpdate {
                    resumed_at: Some(resumed_at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = SessionService::new(fx.storage())
            .compose(attempt.id)
            .await
            .unwrap();
        assert!(session.time_remaining_seconds <= 20 * 60);
        assert!(session.time_remaining_seconds > 20 * 60 - 5);
        assert_eq!(session.ends_at, Some(resumed_at + chrono::Duration::minutes(30)));
    }

    #[tokio::test]
    async fn paused_session_freezes_the_countdown() {
        let fx = Fixture::new(&[Section::Reading], 30);
        let attempt = fx.start("user-1").await;
        fx.store
            .update_attempt(
                attempt.id,
                TestAttemptUpdate {
                    status: Some(AttemptStatus::Paused),
                    resumed_at: Some(Utc::now() - chrono::Duration::minutes(10)),
                    time_remaining_seconds: Some(600),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = SessionService::new(fx.storage())
            .compose(attempt.id)
            .await
            .unwrap();
        assert_eq!(session.time_remaining_seconds, 600);
        assert!(session.ends_at.is_none());
        assert!(matches!(session.ensure_in_progress(), Err(Error::InvalidState(_))));
        assert!(session.ensure_active().is_ok());
    }

    #[tokio::test]
    async fn completed_set_lists_answered_occurrences_only() {
        let fx = Fixture::new(&[Section::Speaking, Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        for question in &fx.questions[..2] {
            fx.store
                .insert_answer(NewAnswer {
                    attempt_id: attempt.id,
                    test_question_id: question.id,
                    question_id: question.question_id,
                    question_bank: question.question_bank,
                    response: ResponsePayload::Text { text: "ok".into() },
                    elapsed_seconds: 12,
                })
                .await
                .unwrap();
        }

        let session = SessionService::new(fx.storage())
            .compose(attempt.id)
            .await
            .unwrap();

        assert_eq!(session.completed_question_ids.len(), 2);
        assert!(session.completed_question_ids.contains(&fx.questions[0].id));
        assert!(session.completed_question_ids.contains(&fx.questions[1].id));
        assert!(!session.completed_question_ids.contains(&fx.questions[2].id));
    }

    #[tokio::test]
    async fn missing_bank_item_leaves_content_empty() {
        let fx = Fixture::new(&[Section::Reading, Section::Reading], 30);
        fx.add_orphan_question(Section::Listening);
        let attempt = fx.start("user-1").await;

        let session = SessionService::new(fx.storage())
            .compose(attempt.id)
            .await
            .unwrap();

        assert_eq!(session.total_questions(), 3);
        assert!(session.questions[2].item.is_none());
        assert!(matches!(session.questions[2].timing, Timing::Section { .. }));
    }

    #[tokio::test]
    async fn unknown_attempt_is_not_found() {
        let fx = Fixture::new(&[Section::Speaking], 10);
        let err = SessionService::new(fx.storage())
            .compose(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn boundary_detection() {
        let fx = Fixture::new(&[Section::Speaking, Section::Speaking, Section::Writing], 10);
        let descriptors = fx.descriptors();
        assert!(!is_section_boundary(&descriptors, 0));
        assert!(is_section_boundary(&descriptors, 1));
        assert!(is_section_boundary(&descriptors, 2));
        assert!(!is_section_boundary(&descriptors, 3));
        assert!(!is_section_boundary(&[], 0));
    }
}
