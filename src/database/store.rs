use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{BankItem, QuestionBank, TestQuestion};
use crate::models::test::MockTest;
use crate::models::test_attempt::{NewTestAttempt, TestAttempt, TestAttemptUpdate};

/// Reads and writes against the test, question, attempt and answer relations.
///
/// Every call is a single statement; the orchestrator never holds a
/// transaction open across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn get_test(&self, test_id: Uuid) -> Result<Option<MockTest>>;

    /// Questions of a test ordered by `order_index`.
    async fn list_test_questions(&self, test_id: Uuid) -> Result<Vec<TestQuestion>>;

    async fn find_in_progress_attempt(&self, user_id: &str) -> Result<Option<TestAttempt>>;

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>>;

    /// Inserts an `in_progress` attempt at index 0.
    ///
    /// Fails with `Error::Conflict` when the candidate already has an
    /// in-progress attempt at commit time.
    async fn insert_attempt(&self, attempt: NewTestAttempt) -> Result<TestAttempt>;

    /// Fails with `Error::NotFound` if the attempt does not exist.
    async fn update_attempt(
        &self,
        attempt_id: Uuid,
        update: TestAttemptUpdate,
    ) -> Result<TestAttempt>;

    /// Answers of an attempt in submission order.
    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>>;

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer>;
}

/// Point reads against a single item bank.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemBank: Send + Sync {
    async fn get_item(&self, item_id: Uuid) -> Result<Option<BankItem>>;
}

/// One reader per bank tag.
#[derive(Clone)]
pub struct ItemBanks {
    pub speaking: Arc<dyn ItemBank>,
    pub writing: Arc<dyn ItemBank>,
    pub reading: Arc<dyn ItemBank>,
    pub listening: Arc<dyn ItemBank>,
}

impl ItemBanks {
    pub fn reader(&self, bank: QuestionBank) -> &dyn ItemBank {
        match bank {
            QuestionBank::SpeakingQuestions => self.speaking.as_ref(),
            QuestionBank::WritingQuestions => self.writing.as_ref(),
            QuestionBank::ReadingQuestions => self.reading.as_ref(),
            QuestionBank::ListeningQuestions => self.listening.as_ref(),
        }
    }
}

/// Store handles shared by every service.
#[derive(Clone)]
pub struct Storage {
    pub exams: Arc<dyn ExamStore>,
    pub banks: ItemBanks,
}

impl Storage {
    pub fn new(exams: Arc<dyn ExamStore>, banks: ItemBanks) -> Self {
        Self { exams, banks }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use super::postgres::{PgExamStore, PgItemBank};

        let bank = |tag| -> Arc<dyn ItemBank> { Arc::new(PgItemBank::new(pool.clone(), tag)) };
        let banks = ItemBanks {
            speaking: bank(QuestionBank::SpeakingQuestions),
            writing: bank(QuestionBank::WritingQuestions),
            reading: bank(QuestionBank::ReadingQuestions),
            listening: bank(QuestionBank::ListeningQuestions),
        };
        Self::new(Arc::new(PgExamStore::new(pool)), banks)
    }

    pub fn in_memory(store: super::memory::InMemoryStore) -> Self {
        let banks = ItemBanks {
            speaking: Arc::new(store.bank(QuestionBank::SpeakingQuestions)),
            writing: Arc::new(store.bank(QuestionBank::WritingQuestions)),
            reading: Arc::new(store.bank(QuestionBank::ReadingQuestions)),
            listening: Arc::new(store.bank(QuestionBank::ListeningQuestions)),
        };
        Self::new(Arc::new(store), banks)
    }
}
