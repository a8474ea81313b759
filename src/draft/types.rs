use serde::{Deserialize, Serialize};

use crate::checklist::{Response, Responses};

pub const DRAFT_VERSION: u32 = 1;

/// In-progress answers for one checklist, kept until submission succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub version: u32,
    pub checklist_id: String,
    #[serde(default)]
    pub responses: Responses,
    /// Completion-level notes submitted with the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Draft {
    pub fn new(checklist_id: impl Into<String>) -> Self {
        Self {
            version: DRAFT_VERSION,
            checklist_id: checklist_id.into(),
            responses: Responses::new(),
            notes: None,
        }
    }

    /// Set an item's value. Existing notes are kept unless new ones are given.
    pub fn answer(&mut self, item_id: &str, value: impl Into<String>, notes: Option<String>) {
        let entry = self.responses.entry(item_id.to_string()).or_default();
        entry.value = value.into();
        if notes.is_some() {
            entry.notes = notes;
        }
    }

    pub fn response(&self, item_id: &str) -> Option<&Response> {
        self.responses.get(item_id)
    }

    /// Number of items with a non-empty value
    pub fn answered(&self) -> usize {
        self.responses.values().filter(|r| !r.value.is_empty()).count()
    }
}
