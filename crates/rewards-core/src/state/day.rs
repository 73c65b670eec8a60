use serde::{Deserialize, Serialize};

use crate::rules;

/// A recorded rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StrikeRepr")]
pub struct Strike {
    /// Index into [`rules::RULES`].
    pub rule_index: usize,
    /// Rule text at the time the strike was recorded.
    pub reason: String,
    /// Local time of day (`HH:MM:SS`). Absent for strikes stored as bare text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// On-disk shapes a strike may take: the structured record, or just the
/// rule text.
#[derive(Deserialize)]
#[serde(untagged)]
enum StrikeRepr {
    Structured {
        rule_index: usize,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        time: Option<String>,
    },
    Bare(String),
}

impl From<StrikeRepr> for Strike {
    fn from(repr: StrikeRepr) -> Self {
        match repr {
            StrikeRepr::Structured {
                rule_index,
                reason,
                time,
            } => Self {
                rule_index,
                reason: reason
                    .or_else(|| rules::rule_text(rule_index).map(str::to_string))
                    .unwrap_or_default(),
                time,
            },
            StrikeRepr::Bare(text) => Self {
                rule_index: rules::index_of(&text),
                reason: text,
                time: None,
            },
        }
    }
}

/// One recording period.
///
/// A day is open until `end_day` closes it; after that it is never touched
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: u32,
    /// Calendar date (`YYYY-MM-DD`) the day was opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub strikes: Vec<Strike>,
    #[serde(default)]
    pub point_awarded: bool,
}

impl Day {
    pub fn new(id: u32, date: Option<String>) -> Self {
        Self {
            id,
            date,
            strikes: Vec::new(),
            point_awarded: false,
        }
    }

    pub fn strike_count(&self) -> usize {
        self.strikes.len()
    }
}
