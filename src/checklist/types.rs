use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Passing threshold applied when a checklist does not set one.
pub const DEFAULT_PASSING_SCORE: u32 = 70;

/// A checklist definition as served by the checklist collaborator.
///
/// Example YAML:
/// ```yaml
/// id: walk-in-cooler
/// name: Walk-in cooler opening check
/// passingScore: 80
/// items:
///   - id: door-seal
///     type: yes_no
///     isCritical: true
///     validation: { requiredValue: "yes" }
///   - id: cooler-temp
///     type: temperature
///     validation: { minTemp: 32, maxTemp: 40, warningThreshold: 2 }
///   - id: initials
///     type: text
///     validation: { requiredPattern: "^[A-Z]{2,3}$" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistDefinition {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Percentage (0-100) the score must reach for an overall pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passing_score: Option<u32>,

    /// Ordered; results are reported in this order.
    pub items: Vec<ChecklistItem>,
}

impl ChecklistDefinition {
    pub fn passing_score(&self) -> u32 {
        self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE)
    }

    pub fn item(&self, id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// One inspectable unit of a checklist.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,

    /// Question shown to the person completing the checklist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// A failing critical item blocks submission regardless of score
    #[serde(default)]
    pub is_critical: bool,

    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ChecklistItem {
    /// Label if present, otherwise the id
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Item type together with the validation rule that belongs to it.
///
/// The `type` tag is closed: anything other than `yes_no`, `temperature`
/// or `text` is rejected when the definition is parsed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    YesNo {
        #[serde(default)]
        validation: YesNoRule,
    },
    Temperature {
        #[serde(default)]
        validation: TemperatureRule,
    },
    Text {
        #[serde(default)]
        validation: TextRule,
    },
}

impl ItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::YesNo { .. } => "yes_no",
            ItemKind::Temperature { .. } => "temperature",
            ItemKind::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct YesNoRule {
    /// Answer the response must equal to pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_value: Option<YesNo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemperatureRule {
    /// Inclusive lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f64>,

    /// Inclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f64>,

    /// Margin inside either bound that demotes a pass to a warning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_pattern: Option<Pattern>,
}

/// Regular expression compiled when the definition is parsed.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(|e| {
            serde::de::Error::custom(format!("invalid requiredPattern '{}': {}", source, e))
        })
    }
}

/// Responses keyed by item id. Items without an entry count as unanswered.
pub type Responses = BTreeMap<String, Response>;

/// User-entered answer for one item.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Response {
    /// Raw input; an empty string means nothing has been entered yet
    #[serde(default)]
    pub value: String,

    /// Free text, never affects status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Response {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_definition() {
        let yaml = r#"
id: walk-in-cooler
name: Walk-in cooler
passingScore: 80
items:
  - id: door-seal
    type: yes_no
    isCritical: true
    validation:
      requiredValue: "yes"
  - id: cooler-temp
    type: temperature
    validation:
      minTemp: 32
      maxTemp: 40
      warningThreshold: 2
  - id: initials
    type: text
    label: Inspector initials
    validation:
      requiredPattern: "^[A-Z]"
"#;
        let def: ChecklistDefinition = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(def.passing_score(), 80);
        assert_eq!(def.items.len(), 3);
        assert!(def.items[0].is_critical);
        assert_eq!(
            def.items[0].kind,
            ItemKind::YesNo {
                validation: YesNoRule {
                    required_value: Some(YesNo::Yes)
                }
            }
        );
        match &def.items[1].kind {
            ItemKind::Temperature { validation } => {
                assert_eq!(validation.min_temp, Some(32.0));
                assert_eq!(validation.max_temp, Some(40.0));
                assert_eq!(validation.warning_threshold, Some(2.0));
            }
            other => panic!("expected temperature item, got {:?}", other),
        }
        assert_eq!(def.items[2].display_name(), "Inspector initials");
    }

    #[test]
    fn test_parse_json_definition_without_validation() {
        let json = r#"{
            "id": "close",
            "name": "Closing",
            "items": [
                {"id": "lights", "type": "yes_no"},
                {"id": "notes", "type": "text"}
            ]
        }"#;
        let def: ChecklistDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.passing_score(), DEFAULT_PASSING_SCORE);
        assert!(!def.items[0].is_critical);
        assert_eq!(def.items[0].kind.type_name(), "yes_no");
        assert_eq!(def.items[1].display_name(), "notes");
    }

    #[test]
    fn test_unknown_item_type_rejected() {
        let json = r#"{"id": "x", "name": "x", "items": [{"id": "a", "type": "photo"}]}"#;
        assert!(serde_json::from_str::<ChecklistDefinition>(json).is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let json = r#"{"id": "x", "name": "x", "items": [
            {"id": "a", "type": "text", "validation": {"requiredPattern": "([a-z"}}
        ]}"#;
        let err = serde_json::from_str::<ChecklistDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("requiredPattern"));
    }

    #[test]
    fn test_definition_json_roundtrip() {
        let json = r#"{"id": "x", "name": "x", "items": [
            {"id": "a", "type": "text", "validation": {"requiredPattern": "^[A-Z]"}},
            {"id": "b", "type": "temperature", "isCritical": true, "validation": {"maxTemp": 41}}
        ]}"#;
        let def: ChecklistDefinition = serde_json::from_str(json).unwrap();
        let reparsed: ChecklistDefinition =
            serde_json::from_str(&serde_json::to_string(&def).unwrap()).unwrap();
        assert_eq!(def, reparsed);
    }
}
