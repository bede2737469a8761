//! `buildlink show-record` command.

use std::fmt::Write;
use std::path::Path;

use crate::model::CommandResult;
use crate::record::store::RunRecordStore;
use crate::record::{RunRecord, DISPLAY_NAME};

/// Execute the `show-record` command.
///
/// Prints the run record persisted in `record_dir`, one line per call.
///
/// # Errors
///
/// Returns an error string if the record is missing or unreadable.
pub fn run(record_dir: &Path) -> Result<(), String> {
    let store = RunRecordStore::new(record_dir).map_err(|e| e.to_string())?;
    let record = store.load().map_err(|e| e.to_string())?;
    print!("{}", render(&record));
    Ok(())
}

/// Renders a run record as a plain-text listing.
#[must_use]
pub fn render(record: &RunRecord) -> String {
    let mut out = format!("{DISPLAY_NAME} ({} calls)\n", record.num_commands());
    if record.num_commands() == 0 {
        out.push_str("  (none)\n");
        return out;
    }
    for command in record.commands() {
        let _ = writeln!(out, "{}", format_line(record.issue_url(), command));
    }
    let failed = record.failures().count();
    if failed > 0 {
        let _ = writeln!(out, "{failed} failed");
    }
    out
}

fn format_line(issue_url: &str, command: &CommandResult) -> String {
    let issue = command
        .issue_id()
        .map_or_else(|| "-".to_string(), |id| format!("{issue_url}{id}"));
    let silent = if command.silent() { " (silent)" } else { "" };
    format!(
        "  {} {:<6} {} {}: {}{silent}",
        command.date().format("%Y-%m-%d %H:%M:%S"),
        command.status(),
        command.username(),
        issue,
        command.command(),
    )
}
