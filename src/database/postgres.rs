use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{ExamStore, ItemBank};
use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{BankItem, QuestionBank, TestQuestion};
use crate::models::test::MockTest;
use crate::models::test_attempt::{
    AttemptStatus, NewTestAttempt, TestAttempt, TestAttemptUpdate,
};

#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamStore for PgExamStore {
    async fn get_test(&self, test_id: Uuid) -> Result<Option<MockTest>> {
        let test = sqlx::query_as::<_, MockTest>(
            r#"
            SELECT id, test_number, title, description, total_questions,
                   duration_minutes, is_free, created_at
            FROM mock_tests WHERE id = $1
            "#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(test)
    }

    async fn list_test_questions(&self, test_id: Uuid) -> Result<Vec<TestQuestion>> {
        let rows = sqlx::query_as::<_, TestQuestion>(
            r#"
            SELECT id, mock_test_id, question_id, question_bank, section,
                   order_index, time_limit_seconds
            FROM mock_test_questions
            WHERE mock_test_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_in_progress_attempt(&self, user_id: &str) -> Result<Option<TestAttempt>> {
        let attempt = sqlx::query_as::<_, TestAttempt>(
            r#"
            SELECT * FROM mock_test_attempts
            WHERE user_id = $1 AND status = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(AttemptStatus::InProgress)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<TestAttempt>> {
        let attempt =
            sqlx::query_as::<_, TestAttempt>(r#"SELECT * FROM mock_test_attempts WHERE id = $1"#)
                .bind(attempt_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(attempt)
    }

    async fn insert_attempt(&self, attempt: NewTestAttempt) -> Result<TestAttempt> {
        // uq_mock_test_attempts_active turns a lost start race into a unique
        // violation, which surfaces as Error::Conflict.
        let now = Utc::now();
        let created = sqlx::query_as::<_, TestAttempt>(
            r#"
            INSERT INTO mock_test_attempts (
                id, user_id, mock_test_id, status, current_question_index, current_section,
                pause_count, time_remaining_seconds, started_at, resumed_at, completed_at,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, 0, $5,
                0, $6, $7, $7, NULL,
                $7, $7
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.mock_test_id)
        .bind(AttemptStatus::InProgress)
        .bind(attempt.current_section)
        .bind(attempt.time_remaining_seconds)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_attempt(
        &self,
        attempt_id: Uuid,
        update: TestAttemptUpdate,
    ) -> Result<TestAttempt> {
        let updated = sqlx::query_as::<_, TestAttempt>(
            r#"
            UPDATE mock_test_attempts
            SET status = COALESCE($2, status),
                current_question_index = COALESCE($3, current_question_index),
                current_section = COALESCE($4, current_section),
                pause_count = COALESCE($5, pause_count),
                time_remaining_seconds = COALESCE($6, time_remaining_seconds),
                resumed_at = COALESCE($7, resumed_at),
                completed_at = COALESCE($8, completed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(attempt_id)
        .bind(update.status)
        .bind(update.current_question_index)
        .bind(update.current_section)
        .bind(update.pause_count)
        .bind(update.time_remaining_seconds)
        .bind(update.resumed_at)
        .bind(update.completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, attempt_id, test_question_id, question_id, question_bank,
                   response, elapsed_seconds, submitted_at
            FROM mock_test_answers
            WHERE attempt_id = $1
            ORDER BY submitted_at ASC
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let created = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO mock_test_answers (
                id, attempt_id, test_question_id, question_id, question_bank,
                response, elapsed_seconds, submitted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, attempt_id, test_question_id, question_id, question_bank,
                      response, elapsed_seconds, submitted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(answer.attempt_id)
        .bind(answer.test_question_id)
        .bind(answer.question_id)
        .bind(answer.question_bank)
        .bind(Json(answer.response))
        .bind(answer.elapsed_seconds)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}

/// Reads a single bank table. The table name comes from the closed
/// `QuestionBank` enum, never from request input.
#[derive(Clone)]
pub struct PgItemBank {
    pool: PgPool,
    bank: QuestionBank,
}

impl PgItemBank {
    pub fn new(pool: PgPool, bank: QuestionBank) -> Self {
        Self { pool, bank }
    }
}

#[async_trait]
impl ItemBank for PgItemBank {
    async fn get_item(&self, item_id: Uuid) -> Result<Option<BankItem>> {
        let sql = format!(
            r#"SELECT id, type, title, content FROM {} WHERE id = $1"#,
            self.bank.table_name()
        );
        let item = sqlx::query_as::<_, BankItem>(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }
}
