//! Data models for the sentence catalog

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// School grade a sentence is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Middle1,
    Middle2,
    Middle3,
    High1,
    High2,
    High3,
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::Middle1,
        Grade::Middle2,
        Grade::Middle3,
        Grade::High1,
        Grade::High2,
        Grade::High3,
    ];

    /// Identifier used in storage and as the progress category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Middle1 => "middle1",
            Self::Middle2 => "middle2",
            Self::Middle3 => "middle3",
            Self::High1 => "high1",
            Self::High2 => "high2",
            Self::High3 => "high3",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown grade: {}", s))
    }
}

/// A catalog sentence
///
/// `is_important` is never stored in the catalog; it is filled in from the
/// learner's important set whenever sentences are handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub grade: Grade,
    pub korean: String,
    pub english: String,
    #[serde(default)]
    pub is_important: bool,
}

/// Counts for one grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GradeStats {
    pub total: usize,
    pub important: usize,
}

/// Catalog-wide counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_sentences: usize,
    /// Important ids that still resolve to a catalog sentence
    pub total_important: usize,
    pub by_grade: BTreeMap<Grade, GradeStats>,
}
