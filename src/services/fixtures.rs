//! In-memory mock test builder shared by the service unit tests.

use serde_json::json;
use uuid::Uuid;

use crate::database::memory::InMemoryStore;
use crate::database::store::{ExamStore, Storage};
use crate::models::question::{BankItem, QuestionBank, TestQuestion};
use crate::models::section::Section;
use crate::models::test::MockTest;
use crate::models::test_attempt::{NewTestAttempt, TestAttempt};
use crate::services::session_service::QuestionDescriptor;
use crate::services::timing_service::timing_for_section;

pub fn item_type_for(section: Section) -> &'static str {
    match section {
        Section::Speaking => "read_aloud",
        Section::Writing => "write_essay",
        Section::Reading => "multiple_choice_single",
        Section::Listening => "write_from_dictation",
    }
}

pub struct Fixture {
    pub store: InMemoryStore,
    pub test: MockTest,
    pub questions: Vec<TestQuestion>,
}

impl Fixture {
    /// A free test with one question per entry of `sections`.
    pub fn new(sections: &[Section], duration_minutes: i32) -> Self {
        let store = InMemoryStore::new();
        let test = MockTest {
            id: Uuid::new_v4(),
            test_number: 1,
            title: "Mock Test 1".into(),
            description: None,
            total_questions: sections.len() as i32,
            duration_minutes,
            is_free: true,
            created_at: None,
        };
        store.insert_test(test.clone()).unwrap();

        let mut questions = Vec::with_capacity(sections.len());
        for (idx, section) in sections.iter().enumerate() {
            let bank = QuestionBank::for_section(*section);
            let item = BankItem {
                id: Uuid::new_v4(),
                item_type: item_type_for(*section).to_string(),
                title: Some(format!("{} item {}", section, idx)),
                content: json!({ "prompt": format!("prompt {}", idx) }),
            };
            store.insert_item(bank, item.clone()).unwrap();

            let question = TestQuestion {
                id: Uuid::new_v4(),
                mock_test_id: test.id,
                question_id: item.id,
                question_bank: bank,
                section: *section,
                order_index: idx as i32,
                time_limit_seconds: None,
            };
            store.insert_question(question.clone()).unwrap();
            questions.push(question);
        }

        Self { store, test, questions }
    }

    pub fn storage(&self) -> Storage {
        Storage::in_memory(self.store.clone())
    }

    /// Inserts an in-progress attempt directly, bypassing the lifecycle checks.
    pub async fn start(&self, user_id: &str) -> TestAttempt {
        self.store
            .insert_attempt(NewTestAttempt {
                user_id: user_id.to_string(),
                mock_test_id: self.test.id,
                current_section: self.questions[0].section,
                time_remaining_seconds: self.test.duration_seconds(),
            })
            .await
            .unwrap()
    }

    /// Appends an occurrence whose item is absent from its bank.
    pub fn add_orphan_question(&self, section: Section) -> TestQuestion {
        let question = TestQuestion {
            id: Uuid::new_v4(),
            mock_test_id: self.test.id,
            question_id: Uuid::new_v4(),
            question_bank: QuestionBank::for_section(section),
            section,
            order_index: self.questions.len() as i32,
            time_limit_seconds: None,
        };
        self.store.insert_question(question.clone()).unwrap();
        question
    }

    pub fn descriptors(&self) -> Vec<QuestionDescriptor> {
        self.questions
            .iter()
            .map(|q| QuestionDescriptor {
                id: q.id,
                question_id: q.question_id,
                question_bank: q.question_bank,
                section: q.section,
                order_index: q.order_index,
                time_limit_seconds: q.time_limit_seconds,
                item: None,
                timing: timing_for_section(q.section, Some(item_type_for(q.section))),
            })
            .collect()
    }
}
