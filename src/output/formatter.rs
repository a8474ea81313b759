use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::checklist::ChecklistDefinition;
use crate::completion::CompletionRecord;
use crate::scoring::{BlockingItem, CompletionResult, ItemStatus, OverallStatus, SubmissionGate};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Four-character status badge: PASS, WARN, FAIL or ---- for unanswered
pub fn format_status(status: ItemStatus, use_colors: bool) -> String {
    let badge = match status {
        ItemStatus::Pass => "PASS",
        ItemStatus::Warning => "WARN",
        ItemStatus::Fail => "FAIL",
        ItemStatus::NotApplicable => "----",
    };
    if !use_colors {
        return badge.to_string();
    }
    match status {
        ItemStatus::Pass => badge.green().to_string(),
        ItemStatus::Warning => badge.yellow().to_string(),
        ItemStatus::Fail => badge.red().bold().to_string(),
        ItemStatus::NotApplicable => badge.dimmed().to_string(),
    }
}

fn format_overall(status: OverallStatus, use_colors: bool) -> String {
    match (status, use_colors) {
        (OverallStatus::Pass, true) => "PASS".green().bold().to_string(),
        (OverallStatus::Fail, true) => "FAIL".red().bold().to_string(),
        (OverallStatus::Pass, false) => "PASS".to_string(),
        (OverallStatus::Fail, false) => "FAIL".to_string(),
    }
}

/// One line per item: index, status badge, critical marker, name, entered value.
/// Names are truncated to the terminal width; pipes get full names.
pub fn format_item_table(
    checklist: &ChecklistDefinition,
    result: &CompletionResult,
    use_colors: bool,
) -> String {
    let term_width = get_terminal_width();
    let value_width = result
        .items
        .iter()
        .map(|i| i.value.chars().count())
        .max()
        .unwrap_or(0)
        .min(16);
    // "99. PASS ! " prefix plus two-space separator before the value
    let fixed_width = 11 + 2 + value_width;

    checklist
        .items
        .iter()
        .zip(&result.items)
        .enumerate()
        .map(|(idx, (item, outcome))| {
            let index_str = format!("{:>2}.", idx + 1);
            let marker = if item.is_critical { "!" } else { " " };
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(item.display_name(), width - fixed_width)
                }
                Some(_) => truncate_text(item.display_name(), 20),
                None => item.display_name().to_string(),
            };
            let value = truncate_text(&outcome.value, 16);

            let line = if use_colors {
                format!(
                    "{} {} {} {}  {}",
                    index_str.dimmed(),
                    format_status(outcome.status, true),
                    marker.red().bold(),
                    name,
                    value.cyan()
                )
            } else {
                format!(
                    "{} {} {} {}  {}",
                    index_str,
                    format_status(outcome.status, false),
                    marker,
                    name,
                    value
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary line: "Score: 75% PASS (needs 70%) | 3 pass, 1 warning, 0 fail, 0 unanswered"
pub fn format_score_line(
    result: &CompletionResult,
    passing_score: u32,
    use_colors: bool,
) -> String {
    let score = format!("{}%", result.score);
    let score = if use_colors {
        score.bold().to_string()
    } else {
        score
    };
    format!(
        "Score: {} {} (needs {}%) | {} pass, {} warning, {} fail, {} unanswered",
        score,
        format_overall(result.overall_status, use_colors),
        passing_score,
        result.count(ItemStatus::Pass),
        result.count(ItemStatus::Warning),
        result.count(ItemStatus::Fail),
        result.count(ItemStatus::NotApplicable),
    )
}

fn blocking_cause(blocking: &BlockingItem) -> &'static str {
    if blocking.is_missing() {
        "no answer"
    } else {
        "critical item failed"
    }
}

/// Gate verdict with the items that need attention
pub fn format_gate(
    gate: &SubmissionGate,
    checklist: &ChecklistDefinition,
    use_colors: bool,
) -> String {
    let Some(reason) = gate.blocking_reason else {
        return if use_colors {
            "Ready to submit".green().to_string()
        } else {
            "Ready to submit".to_string()
        };
    };

    let header = format!("Cannot submit: {}", reason);
    let mut lines = vec![if use_colors {
        header.red().bold().to_string()
    } else {
        header
    }];

    for blocking in &gate.blocking_items {
        let name = checklist
            .item(&blocking.item_id)
            .map(|i| i.display_name())
            .unwrap_or(&blocking.item_id);
        lines.push(format!("  - {} ({})", name, blocking_cause(blocking)));
    }

    lines.join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// One line per stored completion: short id, checklist, score, status, age, reviewer flag
pub fn format_record_line(record: &CompletionRecord, use_colors: bool) -> String {
    let short_id: String = record.id.chars().take(8).collect();
    let completion = &record.completion;
    let age = format_age(Utc::now() - completion.completed_at);
    let by = completion.completed_by.as_deref().unwrap_or("-");
    let reviewed = if record.review.is_some() { "reviewed" } else { "" };

    let line = if use_colors {
        format!(
            "{}  {}  {:>4}  {}  {:>4}  {}  {}",
            short_id.dimmed(),
            completion.checklist_id.cyan(),
            format!("{}%", completion.score).bold(),
            format_overall(completion.overall_status, true),
            age,
            by.yellow(),
            reviewed.dimmed()
        )
    } else {
        format!(
            "{}  {}  {:>4}  {}  {:>4}  {}  {}",
            short_id,
            completion.checklist_id,
            format!("{}%", completion.score),
            format_overall(completion.overall_status, false),
            age,
            by,
            reviewed
        )
    };
    line.trim_end().to_string()
}

/// Multi-line view of a stored completion
pub fn format_record_detail(record: &CompletionRecord, use_colors: bool) -> String {
    let completion = &record.completion;
    let mut lines = vec![
        format!("Completion {}", record.id),
        format!("  Checklist: {}", completion.checklist_id),
        format!(
            "  Score: {}% {}",
            completion.score,
            format_overall(completion.overall_status, use_colors)
        ),
        format!(
            "  Completed: {} by {}",
            completion.completed_at.format("%Y-%m-%d %H:%M UTC"),
            completion.completed_by.as_deref().unwrap_or("unknown")
        ),
    ];
    if let Some(notes) = &completion.notes {
        lines.push(format!("  Notes: {}", notes));
    }

    lines.push("  Items:".to_string());
    for item in &completion.items {
        let mut line = format!(
            "    {} {}  {}",
            format_status(item.status, use_colors),
            item.item_id,
            item.value
        );
        if let Some(notes) = &item.notes {
            line.push_str(&format!("  ({})", notes));
        }
        lines.push(line.trim_end().to_string());
    }

    match &record.review {
        Some(review) => {
            lines.push(format!(
                "  Reviewed: {} by {}",
                review.reviewed_at.format("%Y-%m-%d %H:%M UTC"),
                review.reviewer
            ));
            if let Some(notes) = &review.notes {
                lines.push(format!("  Review notes: {}", notes));
            }
        }
        None => lines.push("  Not reviewed".to_string()),
    }

    lines.join("\n")
}
