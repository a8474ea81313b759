use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// Upstream data-integrity problem: a checklist reached the scorer without items.
    #[error("checklist has no items; a score cannot be computed")]
    EmptyChecklist,
}
