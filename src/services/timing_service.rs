use serde::Serialize;

use crate::models::section::Section;
use crate::utils::time::{MS_PER_MINUTE, MS_PER_SECOND};

/// Timing shape for an item or a whole section, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timing {
    Item {
        section: Section,
        item_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prep_ms: Option<i64>,
        answer_ms: i64,
    },
    Section {
        section: Section,
        section_ms: i64,
    },
}

impl Timing {
    pub fn section(&self) -> Section {
        match self {
            Timing::Item { section, .. } | Timing::Section { section, .. } => *section,
        }
    }

    /// Answer window for item timings, the whole section otherwise.
    pub fn budget_ms(&self) -> i64 {
        match self {
            Timing::Item { answer_ms, .. } => *answer_ms,
            Timing::Section { section_ms, .. } => *section_ms,
        }
    }
}

struct ItemTiming {
    item_type: &'static str,
    prep_ms: Option<i64>,
    answer_ms: i64,
}

const fn item(item_type: &'static str, prep_ms: Option<i64>, answer_ms: i64) -> ItemTiming {
    ItemTiming {
        item_type,
        prep_ms,
        answer_ms,
    }
}

// The first entry of each table is the section's fallback type.
const SPEAKING_ITEMS: &[ItemTiming] = &[
    item("read_aloud", Some(35 * MS_PER_SECOND), 40 * MS_PER_SECOND),
    item("repeat_sentence", None, 15 * MS_PER_SECOND),
    item("describe_image", Some(25 * MS_PER_SECOND), 40 * MS_PER_SECOND),
    item("retell_lecture", Some(10 * MS_PER_SECOND), 40 * MS_PER_SECOND),
    item("answer_short_question", None, 10 * MS_PER_SECOND),
    item("summarize_group_discussion", Some(20 * MS_PER_SECOND), 60 * MS_PER_SECOND),
    item("respond_to_a_situation", Some(20 * MS_PER_SECOND), 40 * MS_PER_SECOND),
];

const WRITING_ITEMS: &[ItemTiming] = &[
    item("write_essay", None, 20 * MS_PER_MINUTE),
    item("summarize_written_text", None, 10 * MS_PER_MINUTE),
];

const LISTENING_ITEMS: &[ItemTiming] = &[
    item("summarize_spoken_text", None, 10 * MS_PER_MINUTE),
];

pub const READING_SECTION_MS: i64 = 30 * MS_PER_MINUTE;
pub const LISTENING_SECTION_MS: i64 = 40 * MS_PER_MINUTE;

/// Sections that cannot be parsed resolve to reading.
pub const DEFAULT_SECTION: Section = Section::Reading;

fn find_item(table: &'static [ItemTiming], item_type: Option<&str>) -> Option<&'static ItemTiming> {
    let wanted = item_type?.trim();
    table.iter().find(|t| t.item_type.eq_ignore_ascii_case(wanted))
}

fn item_timing(section: Section, entry: &ItemTiming) -> Timing {
    Timing::Item {
        section,
        item_type: entry.item_type.to_string(),
        prep_ms: entry.prep_ms,
        answer_ms: entry.answer_ms,
    }
}

pub fn timing_for_section(section: Section, item_type: Option<&str>) -> Timing {
    match section {
        Section::Speaking => {
            let entry = find_item(SPEAKING_ITEMS, item_type).unwrap_or(&SPEAKING_ITEMS[0]);
            item_timing(section, entry)
        }
        Section::Writing => {
            let entry = find_item(WRITING_ITEMS, item_type).unwrap_or(&WRITING_ITEMS[0]);
            item_timing(section, entry)
        }
        Section::Reading => Timing::Section {
            section,
            section_ms: READING_SECTION_MS,
        },
        Section::Listening => match find_item(LISTENING_ITEMS, item_type) {
            Some(entry) => item_timing(section, entry),
            None => Timing::Section {
                section,
                section_ms: LISTENING_SECTION_MS,
            },
        },
    }
}

/// Lookup by raw section name. Never fails: unknown sections fall back to
/// `DEFAULT_SECTION`.
pub fn timing_for(section: &str, item_type: Option<&str>) -> Timing {
    match section.parse::<Section>() {
        Ok(section) => timing_for_section(section, item_type),
        Err(_) => timing_for_section(DEFAULT_SECTION, None),
    }
}

fn humanize(item_type: &str) -> String {
    item_type.trim().to_ascii_lowercase().replace('_', " ")
}

pub fn format_label(section: &str, item_type: Option<&str>) -> String {
    let item_type = item_type.map(str::trim).filter(|t| !t.is_empty());
    match section.parse::<Section>() {
        Ok(Section::Speaking) => match item_type {
            Some(t) => format!("Speaking · {}", humanize(t)),
            None => "Speaking".to_string(),
        },
        Ok(Section::Writing) => match item_type {
            Some(t) => format!("Writing · {}", humanize(t)),
            None => "Writing".to_string(),
        },
        Ok(Section::Reading) => "Reading Section".to_string(),
        Ok(Section::Listening) => match find_item(LISTENING_ITEMS, item_type) {
            Some(_) => "Listening · Summarize Spoken Text".to_string(),
            None => "Listening Section".to_string(),
        },
        Err(_) => "PTE".to_string(),
    }
}
