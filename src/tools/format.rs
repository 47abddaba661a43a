//! Text rendering for tool results.

use crate::models::{QueryResult, WriteResult};
use std::fmt::Write as _;

/// Render rows as numbered `column: value` blocks, or `no results` when empty.
pub fn format_rows(result: &QueryResult) -> String {
    if result.is_empty() {
        return "no results".to_string();
    }

    let mut output = format!("rows: {}\n\n", result.row_count());
    for (i, row) in result.iter_rows().enumerate() {
        let _ = writeln!(output, "--- row {} ---", i + 1);
        for (column, value) in row {
            let _ = writeln!(output, "{column}: {value}");
        }
        output.push('\n');
    }
    output
}

pub fn format_write_result(result: &WriteResult) -> String {
    if result.last_insert_id > 0 {
        format!(
            "success: {} row(s) affected, last insert id: {}",
            result.rows_affected, result.last_insert_id
        )
    } else {
        format!("success: {} row(s) affected", result.rows_affected)
    }
}

/// `tags` is echoed exactly as the caller supplied it.
pub fn format_observation_created(observation_id: i64, tags: &str) -> String {
    format!("success: observation {observation_id} created with tags: {tags}")
}
