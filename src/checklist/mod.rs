mod types;

pub use types::{
    ChecklistDefinition, ChecklistItem, ItemKind, Pattern, Response, Responses, TemperatureRule,
    TextRule, YesNo, YesNoRule, DEFAULT_PASSING_SCORE,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse a checklist definition from YAML or JSON text.
///
/// JSON is tried first when the text looks like a JSON object; everything
/// else goes through the YAML parser.
pub fn parse_checklist(content: &str) -> Result<ChecklistDefinition> {
    let definition: ChecklistDefinition = if content.trim_start().starts_with('{') {
        serde_json::from_str(content).context("Failed to parse checklist JSON")?
    } else {
        serde_saphyr::from_str(content).context("Failed to parse checklist YAML")?
    };

    if let Err(errors) = crate::scoring::validate_checklist(&definition) {
        anyhow::bail!(
            "Checklist '{}' is invalid:\n  - {}",
            definition.id,
            errors.join("\n  - ")
        );
    }

    Ok(definition)
}

/// Load and validate a checklist definition file
pub fn load_checklist(path: &Path) -> Result<ChecklistDefinition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read checklist at {}", path.display()))?;

    parse_checklist(&content).with_context(|| format!("Invalid checklist in {}", path.display()))
}
