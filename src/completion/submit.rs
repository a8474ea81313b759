use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use super::events::{CompletionEvent, EventSink};
use super::sink::CompletionSink;
use super::types::NewCompletion;
use crate::checklist::ChecklistDefinition;
use crate::draft::Draft;
use crate::scoring::{
    can_submit, score_checklist, BlockingReason, ItemStatus, ScoringError, SubmissionGate,
};

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Local validation failure; nothing was sent
    #[error("submission blocked: {reason}")]
    Blocked {
        reason: BlockingReason,
        gate: SubmissionGate,
    },

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The persistence collaborator failed; the draft is untouched and can be retried
    #[error("failed to record completion: {0:#}")]
    Transport(anyhow::Error),
}

/// Successful submission
#[derive(Debug, Clone)]
pub struct Submitted {
    pub record_id: String,
    pub completion: NewCompletion,
}

/// Gate the draft, then score it, and assemble the create payload in memory.
pub fn prepare_submission(
    checklist: &ChecklistDefinition,
    draft: &Draft,
    completed_by: Option<&str>,
    completed_at: DateTime<Utc>,
) -> Result<NewCompletion, SubmitError> {
    let gate = can_submit(&checklist.items, &draft.responses);
    if let Some(reason) = gate.blocking_reason {
        return Err(SubmitError::Blocked { reason, gate });
    }

    let result = score_checklist(checklist, &draft.responses)?;

    Ok(NewCompletion {
        checklist_id: checklist.id.clone(),
        items: result.items,
        notes: draft.notes.clone(),
        score: result.score,
        overall_status: result.overall_status,
        completed_by: completed_by.map(str::to_string),
        completed_at,
    })
}

/// Prepare, persist with one create call, then emit `CompletionEvent::Recorded`.
///
/// The draft is only borrowed; callers decide whether to discard it afterwards.
pub async fn submit_completion<S, E>(
    sink: &S,
    events: &E,
    checklist: &ChecklistDefinition,
    draft: &Draft,
    completed_by: Option<&str>,
) -> Result<Submitted, SubmitError>
where
    S: CompletionSink,
    E: EventSink,
{
    let completion = prepare_submission(checklist, draft, completed_by, Utc::now())?;

    let record_id = match sink.create(&completion).await {
        Ok(id) => id,
        Err(e) => {
            warn!(checklist_id = %checklist.id, error = %e, "completion create failed");
            return Err(SubmitError::Transport(e));
        }
    };

    info!(
        record_id = %record_id,
        checklist_id = %checklist.id,
        score = completion.score,
        overall_status = %completion.overall_status,
        "completion recorded"
    );

    let flagged_items = completion
        .items
        .iter()
        .filter(|i| matches!(i.status, ItemStatus::Warning | ItemStatus::Fail))
        .map(|i| i.item_id.clone())
        .collect();

    events.emit(&CompletionEvent::Recorded {
        record_id: record_id.clone(),
        checklist_id: completion.checklist_id.clone(),
        score: completion.score,
        overall_status: completion.overall_status,
        flagged_items,
    });

    Ok(Submitted {
        record_id,
        completion,
    })
}
