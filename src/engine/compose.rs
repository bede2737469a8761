//! Build comment composition.

use std::fmt::Write;

use crate::model::{BuildInfo, ChangeLogEntry};
use crate::ports::TemplateExpander;

/// What goes into a build comment besides the build itself.
#[derive(Debug, Clone, Copy)]
pub struct CommentOptions<'a> {
    /// Append one summary block per referencing commit.
    pub add_commit_summary: bool,
    /// Description template appended last. Empty skips it.
    pub description: &'a str,
}

/// Builds the comment posted on an issue linked to `build`.
///
/// The body opens with the build URL and result, then lists `entries` in
/// the given order, then the expanded description.
#[must_use]
pub fn compose(
    build: &BuildInfo,
    entries: &[&ChangeLogEntry],
    options: CommentOptions<'_>,
    expander: &dyn TemplateExpander,
) -> String {
    let mut body = format!("Related build: {}\nBuild Result: {}", build.url, build.result);

    if options.add_commit_summary {
        body.push_str("\nVCS changesets summary:");
        for entry in entries {
            let _ = write!(
                body,
                "\nSHA: {}:\n{}\nby {}\n",
                entry.commit_id, entry.message, entry.author
            );
        }
    }

    if !options.description.is_empty() {
        body.push('\n');
        body.push_str(&expander.expand(options.description));
    }

    body
}
