//! Display helpers shared by the applier, the formatter and the CLI.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

/// `path` relative to `base` when it lies below it, otherwise unchanged.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|base| path.strip_prefix(base).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Unified line diff between the original and edited content of `file`.
pub fn render_diff(file: &str, original: &str, modified: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("--- {file} (original)").dimmed());
    let _ = writeln!(out, "{}", format!("+++ {file} (edited)").dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        let _ = write!(out, "{line}");
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}
