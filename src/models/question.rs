use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::section::Section;

/// Which item bank an occurrence's underlying item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "question_bank", rename_all = "snake_case")]
pub enum QuestionBank {
    SpeakingQuestions,
    WritingQuestions,
    ReadingQuestions,
    ListeningQuestions,
}

impl QuestionBank {
    pub fn table_name(&self) -> &'static str {
        match self {
            QuestionBank::SpeakingQuestions => "speaking_questions",
            QuestionBank::WritingQuestions => "writing_questions",
            QuestionBank::ReadingQuestions => "reading_questions",
            QuestionBank::ListeningQuestions => "listening_questions",
        }
    }

    pub fn for_section(section: Section) -> Self {
        match section {
            Section::Speaking => QuestionBank::SpeakingQuestions,
            Section::Writing => QuestionBank::WritingQuestions,
            Section::Reading => QuestionBank::ReadingQuestions,
            Section::Listening => QuestionBank::ListeningQuestions,
        }
    }
}

/// One occurrence of a bank item inside a mock test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TestQuestion {
    pub id: Uuid,
    pub mock_test_id: Uuid,
    pub question_id: Uuid,
    pub question_bank: QuestionBank,
    pub section: Section,
    pub order_index: i32,
    pub time_limit_seconds: Option<i32>,
}

/// Content row read from one of the item banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BankItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub item_type: String,
    pub title: Option<String>,
    pub content: JsonValue,
}
