use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four exam sections, declared in the order a candidate sits them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "exam_section", rename_all = "snake_case")]
pub enum Section {
    Speaking,
    Writing,
    Reading,
    Listening,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Speaking,
        Section::Writing,
        Section::Reading,
        Section::Listening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Speaking => "speaking",
            Section::Writing => "writing",
            Section::Reading => "reading",
            Section::Listening => "listening",
        }
    }

    /// Position in the canonical section sequence.
    pub fn ordinal(&self) -> usize {
        match self {
            Section::Speaking => 0,
            Section::Writing => 1,
            Section::Reading => 2,
            Section::Listening => 3,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == normalized)
            .ok_or_else(|| format!("unknown section '{}'", s))
    }
}
