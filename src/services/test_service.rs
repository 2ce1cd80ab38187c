use serde::Serialize;
use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::{Error, Result};
use crate::models::question::TestQuestion;
use crate::models::test::MockTest;

#[derive(Debug, Clone, Serialize)]
pub struct LoadedTest {
    pub test: MockTest,
    pub questions: Vec<TestQuestion>,
}

#[derive(Clone)]
pub struct TestService {
    storage: Storage,
}

impl TestService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn load_test(&self, test_id: Uuid) -> Result<LoadedTest> {
        let test = self
            .storage
            .exams
            .get_test(test_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Mock test {} not found", test_id)))?;

        let questions = self.storage.exams.list_test_questions(test_id).await?;
        if let Some(problem) = question_order_problem(&questions) {
            tracing::warn!(%test_id, problem, "mock test question order is inconsistent");
        }
        if questions.len() != test.total_questions as usize {
            tracing::warn!(
                %test_id,
                declared = test.total_questions,
                actual = questions.len(),
                "mock test question count differs from its declared total"
            );
        }

        Ok(LoadedTest { test, questions })
    }
}

/// Checks that indices run 0..n without gaps and that sections appear in
/// canonical order. Expects input sorted by `order_index`.
pub fn question_order_problem(questions: &[TestQuestion]) -> Option<String> {
    for (expected, question) in questions.iter().enumerate() {
        if question.order_index as usize != expected || question.order_index < 0 {
            return Some(format!(
                "expected order index {} but found {}",
                expected, question.order_index
            ));
        }
    }

    questions.windows(2).find_map(|pair| {
        (pair[1].section.ordinal() < pair[0].section.ordinal()).then(|| {
            format!(
                "{} question at index {} follows {} section",
                pair[1].section, pair[1].order_index, pair[0].section
            )
        })
    })
}
