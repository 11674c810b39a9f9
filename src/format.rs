//! Human-readable report of a workspace edit, without applying it.
//!
//! Edits are listed in the order they were given, top to bottom, which is
//! how people read a change; the applier's bottom-up order is irrelevant
//! here.

use crate::apply::edit_count;
use crate::plan::{normalize, WorkItem};
use crate::report::display_path;
use crate::schema::{FileOperation, TextEdit, WorkspaceEdit};
use crate::uri::location_to_path;
use std::fmt::Write;
use std::path::Path;

/// Render `edit` as one line per file operation and a header plus one line
/// per edit for each text batch. Paths below `base` are shown relative.
pub fn format_workspace_edit(edit: &WorkspaceEdit, base: &Path) -> String {
    let mut out = String::new();
    for item in normalize(edit) {
        match item {
            WorkItem::FileOperation(op) => {
                let _ = writeln!(out, "{}", describe_operation(op, base));
            }
            WorkItem::TextEdits { location, edits } => {
                let _ = writeln!(
                    out,
                    "edit {} ({})",
                    resolve_for_display(location, base),
                    edit_count(edits.len())
                );
                for edit in edits {
                    let _ = writeln!(out, "  {}", describe_span(edit));
                }
            }
        }
    }
    out
}

fn describe_operation(op: &FileOperation, base: &Path) -> String {
    let show = |location: &Option<String>| match location {
        Some(location) => resolve_for_display(location, base),
        None => "<missing>".to_string(),
    };
    match op {
        FileOperation::Create { uri, .. } => format!("create {}", show(uri)),
        FileOperation::Rename {
            old_uri, new_uri, ..
        } => format!("rename {} -> {}", show(old_uri), show(new_uri)),
        FileOperation::Delete { uri, .. } => format!("delete {}", show(uri)),
    }
}

/// Locations that do not resolve to a path are shown verbatim.
fn resolve_for_display(location: &str, base: &Path) -> String {
    match location_to_path(location) {
        Ok(path) => display_path(&path, Some(base)),
        Err(_) => location.to_string(),
    }
}

/// 1-based line and column span followed by the replacement text.
fn describe_span(edit: &TextEdit) -> String {
    let range = edit.range;
    format!(
        "L{}:{}-L{}:{}: {:?}",
        u64::from(range.start.line) + 1,
        u64::from(range.start.character) + 1,
        u64::from(range.end.line) + 1,
        u64::from(range.end.character) + 1,
        edit.new_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DocumentEditBatch, Position, Range};

    #[test]
    fn test_format_mixed_document_changes() {
        let edit = WorkspaceEdit::from_document_changes(vec![
            FileOperation::create("file:///ws/src/new.rs").into(),
            DocumentEditBatch::new(
                "file:///ws/src/lib.rs",
                vec![
                    TextEdit::new(Range::from_coords(9, 0, 9, 3), "bar"),
                    TextEdit::insert(Position::new(0, 0), "use x;\n"),
                ],
            )
            .into(),
            FileOperation::rename("file:///ws/a.rs", "file:///elsewhere/b.rs").into(),
            FileOperation::Delete {
                uri: None,
                options: None,
            }
            .into(),
        ]);

        let report = format_workspace_edit(&edit, Path::new("/ws"));
        assert_eq!(
            report,
            "create src/new.rs\n\
             edit src/lib.rs (2 edits)\n  \
             L10:1-L10:4: \"bar\"\n  \
             L1:1-L1:1: \"use x;\\n\"\n\
             rename a.rs -> /elsewhere/b.rs\n\
             delete <missing>\n"
        );
    }

    #[test]
    fn test_format_legacy_changes() {
        let edit = WorkspaceEdit::from_changes([(
            "untitled:Untitled-1".to_string(),
            vec![TextEdit::delete(Range::from_coords(0, 0, 1, 0))],
        )]);
        assert_eq!(
            format_workspace_edit(&edit, Path::new("/ws")),
            "edit untitled:Untitled-1 (1 edit)\n  L1:1-L2:1: \"\"\n"
        );
    }

    #[test]
    fn test_format_max_coordinates() {
        let edit = WorkspaceEdit::from_changes([(
            "/ws/a.rs".to_string(),
            vec![TextEdit::insert(Position::new(u32::MAX, u32::MAX), "")],
        )]);
        assert_eq!(
            format_workspace_edit(&edit, Path::new("/ws")),
            "edit a.rs (1 edit)\n  L4294967296:4294967296-L4294967296:4294967296: \"\"\n"
        );
    }

    #[test]
    fn test_format_empty_edit() {
        assert_eq!(format_workspace_edit(&WorkspaceEdit::default(), Path::new("/")), "");
    }
}
