use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::checklist::{ChecklistItem, ItemKind, TemperatureRule, TextRule, YesNoRule};

/// Outcome of evaluating one item's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pass,
    Warning,
    Fail,
    /// Nothing has been entered for the item
    NotApplicable,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pass => "pass",
            ItemStatus::Warning => "warning",
            ItemStatus::Fail => "fail",
            ItemStatus::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing a temperature field, including mid-entry states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureInput {
    /// Field is empty; the user has not typed anything yet
    Pending,
    Reading(f64),
    Invalid,
}

impl TemperatureInput {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return TemperatureInput::Pending;
        }
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => TemperatureInput::Reading(value),
            _ => TemperatureInput::Invalid,
        }
    }
}

/// Derive the status of a single item from its raw response value.
///
/// Never fails: malformed input maps to `Fail`, missing input to `NotApplicable`.
pub fn evaluate(item: &ChecklistItem, value: &str) -> ItemStatus {
    let status = if value.is_empty() {
        ItemStatus::NotApplicable
    } else {
        match &item.kind {
            ItemKind::YesNo { validation } => evaluate_yes_no(validation, value),
            ItemKind::Temperature { validation } => evaluate_temperature(validation, value),
            ItemKind::Text { validation } => evaluate_text(validation, value),
        }
    };

    debug!(item_id = %item.id, %status, "evaluated item");
    status
}

pub fn evaluate_yes_no(rule: &YesNoRule, value: &str) -> ItemStatus {
    if value.is_empty() {
        return ItemStatus::NotApplicable;
    }
    match rule.required_value {
        Some(required) if value == required.as_str() => ItemStatus::Pass,
        Some(_) => ItemStatus::Fail,
        None => ItemStatus::Pass,
    }
}

pub fn evaluate_temperature(rule: &TemperatureRule, value: &str) -> ItemStatus {
    match TemperatureInput::parse(value) {
        TemperatureInput::Pending => ItemStatus::NotApplicable,
        TemperatureInput::Invalid => ItemStatus::Fail,
        TemperatureInput::Reading(reading) => check_reading(rule, reading),
    }
}

/// Bounds are inclusive and checked independently, so a rule may set only one.
pub fn check_reading(rule: &TemperatureRule, reading: f64) -> ItemStatus {
    if rule.min_temp.is_none() && rule.max_temp.is_none() {
        return ItemStatus::Pass;
    }

    let below = rule.min_temp.is_some_and(|min| reading < min);
    let above = rule.max_temp.is_some_and(|max| reading > max);
    if below || above {
        return ItemStatus::Fail;
    }

    let margin = rule.warning_threshold.unwrap_or(0.0);
    if margin > 0.0 {
        let near_min = rule.min_temp.is_some_and(|min| reading <= min + margin);
        let near_max = rule.max_temp.is_some_and(|max| reading >= max - margin);
        if near_min || near_max {
            return ItemStatus::Warning;
        }
    }

    ItemStatus::Pass
}

pub fn evaluate_text(rule: &TextRule, value: &str) -> ItemStatus {
    if value.is_empty() {
        return ItemStatus::NotApplicable;
    }
    let trimmed = value.trim();
    let ok = match &rule.required_pattern {
        Some(pattern) => pattern.is_match(trimmed),
        None => !trimmed.is_empty(),
    };
    if ok {
        ItemStatus::Pass
    } else {
        ItemStatus::Fail
    }
}
