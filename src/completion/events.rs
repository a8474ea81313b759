use serde::Serialize;
use tracing::info;

use crate::scoring::OverallStatus;

/// Outbound notifications for downstream consumers such as reminder schedulers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CompletionEvent {
    #[serde(rename_all = "camelCase")]
    Recorded {
        record_id: String,
        checklist_id: String,
        score: u32,
        overall_status: OverallStatus,
        /// Items that finished with `warning` or `fail`
        flagged_items: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Reviewed { record_id: String, reviewer: String },
}

pub trait EventSink {
    fn emit(&self, event: &CompletionEvent);
}

/// Writes events to the tracing log as JSON
pub struct LogEvents;

impl EventSink for LogEvents {
    fn emit(&self, event: &CompletionEvent) {
        match serde_json::to_string(event) {
            Ok(json) => {
                info!(target: "checklist_engine::events", event = %json, "completion event")
            }
            Err(e) => {
                info!(target: "checklist_engine::events", error = %e, ?event, "completion event")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_event_shape() {
        let event = CompletionEvent::Recorded {
            record_id: "r1".to_string(),
            checklist_id: "opening".to_string(),
            score: 75,
            overall_status: OverallStatus::Pass,
            flagged_items: vec!["cooler-temp".to_string()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "recorded");
        assert_eq!(json["recordId"], "r1");
        assert_eq!(json["overallStatus"], "pass");
        assert_eq!(json["flaggedItems"][0], "cooler-temp");
    }
}
