use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::store::{ExamStore, ItemBank};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{BankItem, QuestionBank, TestQuestion};
use crate::models::test::MockTest;
use crate::models::test_attempt::{
    AttemptStatus, NewTestAttempt, TestAttempt, TestAttemptUpdate,
};

#[derive(Default)]
struct Tables {
    tests: HashMap<Uuid, MockTest>,
    questions: Vec<TestQuestion>,
    attempts: HashMap<Uuid, TestAttempt>,
    answers: Vec<Answer>,
    items: HashMap<(QuestionBank, Uuid), BankItem>,
}

/// Process-local store with the same constraints as the Postgres schema:
/// one in-progress attempt per user, and answers must reference an existing
/// attempt and question occurrence.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| Error::Internal(format!("in-memory store poisoned: {}", e)))
    }

    pub fn insert_test(&self, test: MockTest) -> Result<()> {
        self.lock()?.tests.insert(test.id, test);
        Ok(())
    }

    pub fn insert_question(&self, question: TestQuestion) -> Result<()> {
        self.lock()?.questions.push(question);
        Ok(())
    }

    pub fn insert_item(&self, bank: QuestionBank, item: BankItem) -> Result<()> {
        self.lock()?.items.insert((bank, item.id), item);
        Ok(())
    }

    pub fn attempt_count(&self) -> Result<usize> {
        Ok(self.lock()?.attempts.len())
    }

    pub fn bank(&self, bank: QuestionBank) -> InMemoryItemBank {
        InMemoryItemBank {
            store: self.clone(),
            bank,
        }
    }
}

#[async_trait]
impl ExamStore for InMemoryStore {
    async fn get_test(&self, test_id: Uuid) -> Result<Option<MockTest>> {
        Ok(self.lock()?.tests.get(&test_id).cloned())
    }

    async fn list_test_questions(&self, test_id: Uuid) -> Result<Vec<TestQuestion>> {
        let tables = self.lock()?;
        let mut rows: Vec<TestQuestion> = tables
            .questions
            .iter()
            .filter(|q| q.mock_test_id == test_id)
            .cloned()
            .collect();
        rows.sort_by_key(|q| q.order_index);
        Ok(rows)
    }

    async fn find_in_progress_attempt(&self, user_id: &str) -> Result<Option<TestAttempt>> {
        Ok(self
            .lock()?
            .attempts
            .values()
            .find(|a| a.user_id == user_id && a.status == AttemptStatus::InProgress)
            .cloned())
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>> {
        Ok(self.lock()?.attempts.get(&attempt_id).cloned())
    }

    async fn insert_attempt(&self, attempt: NewTestAttempt) -> Result<TestAttempt> {
        let mut tables = self.lock()?;
        let active = tables
            .attempts
            .values()
            .any(|a| a.user_id == attempt.user_id && a.status == AttemptStatus::InProgress);
        if active {
            return Err(Error::Conflict(
                "There is already an attempt in progress for this candidate".to_string(),
            ));
        }

        let now = Utc::now();
        let created = TestAttempt {
            id: Uuid::new_v4(),
            user_id: attempt.user_id,
            mock_test_id: attempt.mock_test_id,
            status: AttemptStatus::InProgress,
            current_question_index: 0,
            current_section: attempt.current_section,
            pause_count: 0,
            time_remaining_seconds: attempt.time_remaining_seconds,
            started_at: now,
            resumed_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.attempts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_attempt(
        &self,
        attempt_id: Uuid,
        update: TestAttemptUpdate,
    ) -> Result<TestAttempt> {
        let mut tables = self.lock()?;
        let user_id = tables
            .attempts
            .get(&attempt_id)
            .map(|a| a.user_id.clone())
            .ok_or_else(|| Error::NotFound("Resource not found".to_string()))?;

        if update.status == Some(AttemptStatus::InProgress) {
            let other_active = tables.attempts.values().any(|a| {
                a.id != attempt_id && a.user_id == user_id && a.status == AttemptStatus::InProgress
            });
            if other_active {
                return Err(Error::Conflict(
                    "There is already an attempt in progress for this candidate".to_string(),
                ));
            }
        }

        let attempt = tables
            .attempts
            .get_mut(&attempt_id)
            .ok_or_else(|| Error::NotFound("Resource not found".to_string()))?;
        if let Some(status) = update.status {
            attempt.status = status;
        }
        if let Some(index) = update.current_question_index {
            attempt.current_question_index = index;
        }
        if let Some(section) = update.current_section {
            attempt.current_section = section;
        }
        if let Some(count) = update.pause_count {
            attempt.pause_count = count;
        }
        if let Some(seconds) = update.time_remaining_seconds {
            attempt.time_remaining_seconds = seconds;
        }
        if let Some(resumed_at) = update.resumed_at {
            attempt.resumed_at = resumed_at;
        }
        if update.completed_at.is_some() {
            attempt.completed_at = update.completed_at;
        }
        attempt.updated_at = Utc::now();
        Ok(attempt.clone())
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        Ok(self
            .lock()?
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let mut tables = self.lock()?;
        if !tables.attempts.contains_key(&answer.attempt_id) {
            return Err(Error::NotFound(format!(
                "Attempt {} not found",
                answer.attempt_id
            )));
        }
        if !tables.questions.iter().any(|q| q.id == answer.test_question_id) {
            return Err(Error::NotFound(format!(
                "Test question {} not found",
                answer.test_question_id
            )));
        }

        let created = Answer {
            id: Uuid::new_v4(),
            attempt_id: answer.attempt_id,
            test_question_id: answer.test_question_id,
            question_id: answer.question_id,
            question_bank: answer.question_bank,
            response: Json(answer.response),
            elapsed_seconds: answer.elapsed_seconds,
            submitted_at: Utc::now(),
        };
        tables.answers.push(created.clone());
        Ok(created)
    }
}

#[derive(Clone)]
pub struct InMemoryItemBank {
    store: InMemoryStore,
    bank: QuestionBank,
}

#[async_trait]
impl ItemBank for InMemoryItemBank {
    async fn get_item(&self, item_id: Uuid) -> Result<Option<BankItem>> {
        Ok(self.store.lock()?.items.get(&(self.bank, item_id)).cloned())
    }
}
