use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::error::ScoringError;
use super::evaluate::{evaluate, ItemStatus};
use crate::checklist::{ChecklistDefinition, ChecklistItem, Responses};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    Fail,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Pass => f.write_str("pass"),
            OverallStatus::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub item_id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    /// One entry per checklist item, in checklist order
    pub items: Vec<ItemResult>,
    /// Integer percentage of items with `pass` status
    pub score: u32,
    pub overall_status: OverallStatus,
}

impl CompletionResult {
    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

/// Score a checklist definition using its own passing threshold
pub fn score_checklist(
    checklist: &ChecklistDefinition,
    responses: &Responses,
) -> Result<CompletionResult, ScoringError> {
    calculate_score(&checklist.items, responses, checklist.passing_score())
}

/// Evaluate every item and aggregate into a percentage score.
///
/// Only `pass` counts toward the score. A `warning` is not a failure for
/// gating purposes, but it does not earn credit either. The overall status
/// compares the score against `passing_score` and nothing else.
pub fn calculate_score(
    items: &[ChecklistItem],
    responses: &Responses,
    passing_score: u32,
) -> Result<CompletionResult, ScoringError> {
    if items.is_empty() {
        return Err(ScoringError::EmptyChecklist);
    }

    // Missing responses evaluate as empty, i.e. not_applicable
    let results: Vec<ItemResult> = items
        .iter()
        .map(|item| {
            let response = responses.get(&item.id);
            let value = response.map(|r| r.value.clone()).unwrap_or_default();
            let status = evaluate(item, &value);
            ItemResult {
                item_id: item.id.clone(),
                notes: response.and_then(|r| r.notes.clone()),
                value,
                status,
            }
        })
        .collect();

    // Only pass counts; warnings and not_applicable stay in the denominator
    let passed = results
        .iter()
        .filter(|r| r.status == ItemStatus::Pass)
        .count();
    let score = percentage(passed, results.len());
    let overall_status = if score >= passing_score {
        OverallStatus::Pass
    } else {
        OverallStatus::Fail
    };

    debug!(
        passed,
        total = results.len(),
        score,
        passing_score,
        %overall_status,
        "scored checklist"
    );

    Ok(CompletionResult {
        items: results,
        score,
        overall_status,
    })
}

/// Rounded integer percentage; halves round up. `total` must be non-zero.
fn percentage(passed: usize, total: usize) -> u32 {
    (100.0 * passed as f64 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{ItemKind, Response, TemperatureRule, YesNo, YesNoRule};

    fn yes_no_item(id: &str) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            label: None,
            is_critical: false,
            kind: ItemKind::YesNo {
                validation: YesNoRule {
                    required_value: Some(YesNo::Yes),
                },
            },
        }
    }

    fn cooler_item(id: &str) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            label: None,
            is_critical: false,
            kind: ItemKind::Temperature {
                validation: TemperatureRule {
                    min_temp: Some(32.0),
                    max_temp: Some(40.0),
                    warning_threshold: Some(2.0),
                },
            },
        }
    }

    fn responses(pairs: &[(&str, &str)]) -> Responses {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), Response::new(*value)))
            .collect()
    }

    #[test]
    fn test_warning_does_not_count_toward_score() {
        let items = vec![
            yes_no_item("a"),
            yes_no_item("b"),
            yes_no_item("c"),
            cooler_item("temp"),
        ];
        let resp = responses(&[("a", "yes"), ("b", "yes"), ("c", "yes"), ("temp", "33")]);

        let result = calculate_score(&items, &resp, 70).unwrap();
        assert_eq!(result.items[3].status, ItemStatus::Warning);
        assert_eq!(result.score, 75);
        assert_eq!(result.overall_status, OverallStatus::Pass);
    }

    #[test]
    fn test_warning_can_drop_score_below_threshold() {
        let items = vec![yes_no_item("a"), cooler_item("t1"), cooler_item("t2")];
        let resp = responses(&[("a", "yes"), ("t1", "33"), ("t2", "39")]);

        let result = calculate_score(&items, &resp, 70).unwrap();
        assert_eq!(result.count(ItemStatus::Warning), 2);
        assert_eq!(result.score, 33);
        assert_eq!(result.overall_status, OverallStatus::Fail);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let items: Vec<_> = (0..10).map(|i| yes_no_item(&format!("q{}", i))).collect();
        let mut resp = Responses::new();
        for (i, item) in items.iter().enumerate() {
            let value = if i < 7 { "yes" } else { "no" };
            resp.insert(item.id.clone(), Response::new(value));
        }

        let result = calculate_score(&items, &resp, 70).unwrap();
        assert_eq!(result.score, 70);
        assert_eq!(result.overall_status, OverallStatus::Pass);

        let result = calculate_score(&items, &resp, 71).unwrap();
        assert_eq!(result.overall_status, OverallStatus::Fail);
    }

    #[test]
    fn test_score_rounds_to_nearest() {
        let items = vec![yes_no_item("a"), yes_no_item("b"), yes_no_item("c")];
        let resp = responses(&[("a", "yes"), ("b", "yes"), ("c", "no")]);
        assert_eq!(calculate_score(&items, &resp, 70).unwrap().score, 67);

        let items: Vec<_> = (0..8).map(|i| yes_no_item(&format!("q{}", i))).collect();
        let resp = responses(&[("q0", "yes")]);
        // 1/8 = 12.5%
        assert_eq!(calculate_score(&items, &resp, 70).unwrap().score, 13);
    }

    #[test]
    fn test_non_critical_failure_can_still_pass_overall() {
        let items = vec![
            yes_no_item("a"),
            yes_no_item("b"),
            yes_no_item("c"),
            yes_no_item("d"),
        ];
        let resp = responses(&[("a", "yes"), ("b", "yes"), ("c", "yes"), ("d", "no")]);

        let result = calculate_score(&items, &resp, 70).unwrap();
        assert_eq!(result.count(ItemStatus::Fail), 1);
        assert_eq!(result.overall_status, OverallStatus::Pass);
    }

    #[test]
    fn test_results_follow_checklist_order_and_carry_notes() {
        let items = vec![cooler_item("temp"), yes_no_item("door")];
        let mut resp = Responses::new();
        resp.insert("door".to_string(), Response::new("yes").with_notes("gasket replaced"));
        resp.insert("temp".to_string(), Response::new("36"));

        let result = calculate_score(&items, &resp, 70).unwrap();
        let ids: Vec<_> = result.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["temp", "door"]);
        assert_eq!(result.items[1].notes.as_deref(), Some("gasket replaced"));
        assert_eq!(result.items[0].value, "36");
    }

    #[test]
    fn test_missing_response_is_not_applicable() {
        let items = vec![yes_no_item("a"), yes_no_item("b")];
        let result = calculate_score(&items, &responses(&[("a", "yes")]), 50).unwrap();
        assert_eq!(result.items[1].status, ItemStatus::NotApplicable);
        assert_eq!(result.items[1].value, "");
        assert_eq!(result.score, 50);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let items = vec![yes_no_item("a"), cooler_item("t")];
        let resp = responses(&[("a", "no"), ("t", "35")]);
        let first = calculate_score(&items, &resp, 70).unwrap();
        let second = calculate_score(&items, &resp, 70).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_checklist_is_fatal() {
        let result = calculate_score(&[], &Responses::new(), 70);
        assert_eq!(result, Err(ScoringError::EmptyChecklist));
    }

    #[test]
    fn test_score_checklist_uses_default_threshold() {
        let checklist = ChecklistDefinition {
            id: "c".to_string(),
            name: "C".to_string(),
            description: None,
            passing_score: None,
            items: vec![
                yes_no_item("a"),
                yes_no_item("b"),
                yes_no_item("c"),
            ],
        };
        // 2/3 = 67 < 70
        let result =
            score_checklist(&checklist, &responses(&[("a", "yes"), ("b", "yes"), ("c", "no")]))
                .unwrap();
        assert_eq!(result.overall_status, OverallStatus::Fail);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let items = vec![yes_no_item("a")];
        let result = calculate_score(&items, &responses(&[("a", "yes")]), 70).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overallStatus"], "pass");
        assert_eq!(json["items"][0]["itemId"], "a");
        assert_eq!(json["items"][0]["status"], "pass");
    }
}
