//! Normalizes both [`WorkspaceEdit`] shapes into one ordered list of work items.

use crate::schema::{DocumentChange, FileOperation, TextEdit, WorkspaceEdit};

/// A single unit of work, borrowed from the edit it was planned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem<'a> {
    FileOperation(&'a FileOperation),
    TextEdits {
        location: &'a str,
        edits: &'a [TextEdit],
    },
}

impl WorkItem<'_> {
    /// Number of edits (text batches) or 1 (file operations).
    pub fn change_count(&self) -> usize {
        match self {
            WorkItem::FileOperation(_) => 1,
            WorkItem::TextEdits { edits, .. } => edits.len(),
        }
    }
}

/// Build the execution plan for `edit`.
///
/// `documentChanges` takes precedence over the legacy `changes` map; with
/// neither present the plan is empty.
pub fn normalize(edit: &WorkspaceEdit) -> Vec<WorkItem<'_>> {
    if let Some(document_changes) = &edit.document_changes {
        return document_changes
            .iter()
            .map(|change| match change {
                DocumentChange::Operation(op) => WorkItem::FileOperation(op),
                DocumentChange::Edit(batch) => WorkItem::TextEdits {
                    location: &batch.text_document.uri,
                    edits: &batch.edits,
                },
            })
            .collect();
    }

    match &edit.changes {
        Some(changes) => changes
            .iter()
            .map(|(location, edits)| WorkItem::TextEdits { location, edits })
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DocumentEditBatch, Position, Range};

    fn edit_at(line: u32) -> TextEdit {
        TextEdit::new(Range::from_coords(line, 0, line, 1), "x")
    }

    #[test]
    fn test_empty_edit_yields_empty_plan() {
        assert!(normalize(&WorkspaceEdit::default()).is_empty());
    }

    #[test]
    fn test_document_changes_keep_caller_order() {
        let edit = WorkspaceEdit::from_document_changes(vec![
            FileOperation::create("file:///ws/b.rs").into(),
            DocumentEditBatch::new("file:///ws/b.rs", vec![edit_at(0)]).into(),
            FileOperation::delete("file:///ws/a.rs").into(),
        ]);

        let plan = normalize(&edit);
        assert_eq!(plan.len(), 3);
        assert!(matches!(plan[0], WorkItem::FileOperation(FileOperation::Create { .. })));
        assert!(matches!(
            plan[1],
            WorkItem::TextEdits {
                location: "file:///ws/b.rs",
                ..
            }
        ));
        assert!(matches!(plan[2], WorkItem::FileOperation(FileOperation::Delete { .. })));
    }

    #[test]
    fn test_legacy_changes_become_text_batches() {
        let edit = WorkspaceEdit::from_changes([
            ("file:///ws/z.rs".to_string(), vec![edit_at(0), edit_at(1)]),
            ("file:///ws/a.rs".to_string(), vec![]),
        ]);

        let plan = normalize(&edit);
        assert_eq!(
            plan,
            vec![
                WorkItem::TextEdits {
                    location: "file:///ws/z.rs",
                    edits: &edit.changes.as_ref().unwrap().0[0].1,
                },
                WorkItem::TextEdits {
                    location: "file:///ws/a.rs",
                    edits: &[],
                },
            ]
        );
        assert_eq!(plan[0].change_count(), 2);
    }

    #[test]
    fn test_document_changes_take_precedence_over_legacy() {
        let mut edit = WorkspaceEdit::from_document_changes(vec![DocumentEditBatch::new(
            "file:///ws/new.rs",
            vec![TextEdit::insert(Position::new(0, 0), "a")],
        )
        .into()]);
        edit.changes = Some(
            [("file:///ws/old.rs".to_string(), vec![edit_at(0)])]
                .into_iter()
                .collect(),
        );

        let plan = normalize(&edit);
        assert_eq!(plan.len(), 1);
        assert!(matches!(
            plan[0],
            WorkItem::TextEdits {
                location: "file:///ws/new.rs",
                ..
            }
        ));
    }
}
