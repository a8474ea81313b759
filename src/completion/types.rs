use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{ItemResult, OverallStatus};

pub const STORE_VERSION: u32 = 1;

/// Payload of the single "create completion" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompletion {
    pub checklist_id: String,
    pub items: Vec<ItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub score: u32,
    pub overall_status: OverallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Annotation attached after the fact by someone other than the submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// A persisted completion. Immutable apart from the one-time review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: String,
    #[serde(flatten)]
    pub completion: NewCompletion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
}

/// On-disk document holding every locally stored completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionLog {
    pub version: u32,
    #[serde(default)]
    pub records: Vec<CompletionRecord>,
}

impl Default for CompletionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionLog {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            records: Vec::new(),
        }
    }

    /// Find a record by full id or unique id prefix
    pub fn find(&self, id: &str) -> Option<&CompletionRecord> {
        if let Some(record) = self.records.iter().find(|r| r.id == id) {
            return Some(record);
        }
        let mut matches = self.records.iter().filter(|r| r.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(record), None) if !id.is_empty() => Some(record),
            _ => None,
        }
    }
}
