pub mod formatter;

pub use formatter::{
    format_age, format_gate, format_item_table, format_record_detail, format_record_line,
    format_score_line, format_status, should_use_colors,
};
