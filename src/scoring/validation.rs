use std::collections::HashSet;

use crate::checklist::{ChecklistDefinition, ItemKind};

/// Validate a checklist definition before it is used.
/// Returns all validation errors at once (not just the first).
pub fn validate_checklist(checklist: &ChecklistDefinition) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if checklist.id.trim().is_empty() {
        errors.push("id: must not be blank".to_string());
    }

    if let Some(score) = checklist.passing_score {
        if score > 100 {
            errors.push(format!("passingScore: must be between 0 and 100, got {}", score));
        }
    }

    if checklist.items.is_empty() {
        errors.push("items: checklist must have at least one item".to_string());
    }

    let mut seen = HashSet::new();
    for (i, item) in checklist.items.iter().enumerate() {
        if item.id.trim().is_empty() {
            errors.push(format!("items[{}].id: must not be blank", i));
        } else if !seen.insert(item.id.as_str()) {
            errors.push(format!("items[{}].id: duplicate id '{}'", i, item.id));
        }

        if let ItemKind::Temperature { validation } = &item.kind {
            let bounds = [
                ("minTemp", validation.min_temp),
                ("maxTemp", validation.max_temp),
            ];
            for (field, bound) in bounds {
                if bound.is_some_and(|b| !b.is_finite()) {
                    errors.push(format!(
                        "items[{}].validation.{}: must be a finite number",
                        i, field
                    ));
                }
            }

            if let (Some(min), Some(max)) = (validation.min_temp, validation.max_temp) {
                if min > max {
                    errors.push(format!(
                        "items[{}].validation.minTemp: {} is above maxTemp {}",
                        i, min, max
                    ));
                }
            }

            if let Some(margin) = validation.warning_threshold {
                if !margin.is_finite() || margin < 0.0 {
                    errors.push(format!(
                        "items[{}].validation.warningThreshold: must be non-negative, got {}",
                        i, margin
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
