use serde::Serialize;
use std::fmt;

use super::evaluate::{evaluate, ItemStatus};
use crate::checklist::{ChecklistItem, Responses};

/// Why submission is refused. Critical failures take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    CriticalItemFailure,
    IncompleteItems,
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockingReason::CriticalItemFailure => {
                f.write_str("critical item failure: resolve critical items before submitting")
            }
            BlockingReason::IncompleteItems => {
                f.write_str("incomplete required items: every item needs an answer")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingItem {
    pub item_id: String,
    pub is_critical: bool,
    pub status: ItemStatus,
}

impl BlockingItem {
    pub fn is_missing(&self) -> bool {
        self.status == ItemStatus::NotApplicable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionGate {
    pub allowed: bool,
    pub blocking_reason: Option<BlockingReason>,
    /// Items that block submission, in checklist order
    pub blocking_items: Vec<BlockingItem>,
}

/// Decide whether a set of responses may be submitted.
///
/// Every item must have a value. Critical items must additionally not fail.
/// When any blocking item is critical the reason is `CriticalItemFailure`,
/// otherwise `IncompleteItems`.
pub fn can_submit(items: &[ChecklistItem], responses: &Responses) -> SubmissionGate {
    let blocking_items: Vec<BlockingItem> = items
        .iter()
        .filter_map(|item| {
            let value = responses.get(&item.id).map(|r| r.value.as_str()).unwrap_or("");
            let status = evaluate(item, value);
            let missing = value.is_empty();
            let critical_fail = item.is_critical && status == ItemStatus::Fail;
            (missing || critical_fail).then(|| BlockingItem {
                item_id: item.id.clone(),
                is_critical: item.is_critical,
                status,
            })
        })
        .collect();

    // A single critical item decides the reason
    let blocking_reason = if blocking_items.is_empty() {
        None
    } else if blocking_items.iter().any(|b| b.is_critical) {
        Some(BlockingReason::CriticalItemFailure)
    } else {
        Some(BlockingReason::IncompleteItems)
    };

    SubmissionGate {
        allowed: blocking_items.is_empty(),
        blocking_reason,
        blocking_items,
    }
}
