pub mod engine;
pub mod error;
pub mod evaluate;
pub mod gate;
pub mod validation;

pub use engine::{calculate_score, score_checklist, CompletionResult, ItemResult, OverallStatus};
pub use error::ScoringError;
pub use evaluate::{evaluate, ItemStatus, TemperatureInput};
pub use gate::{can_submit, BlockingItem, BlockingReason, SubmissionGate};
pub use validation::validate_checklist;
