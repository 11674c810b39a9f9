//! Executes a normalized plan against a [`FileSystem`].
//!
//! Work items run strictly in plan order. The first error aborts the call;
//! items already applied stay applied.

pub mod errors;
mod file_ops;
mod text_edits;

pub use errors::ApplyError;
pub use text_edits::{describe_edit, RenderedEdit};
pub(crate) use text_edits::edit_count;

use crate::config::ApplyConfig;
use crate::fs::FileSystem;
use crate::log::{ActionLog, PREVIEW_PREFIX};
use crate::plan::{normalize, WorkItem};
use crate::report::display_path;
use crate::safety::WorkspaceGuard;
use crate::schema::WorkspaceEdit;
use crate::uri::location_to_path;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "ApplyResult reports what was changed"]
pub struct ApplyResult {
    pub file: PathBuf,
    /// Edits applied (text batches), or 1/0 for a performed/skipped file
    /// operation.
    pub changes: usize,
}

pub struct EditApplier<F, L> {
    fs: F,
    log: L,
    config: ApplyConfig,
    guard: Option<WorkspaceGuard>,
    display_base: Option<PathBuf>,
}

impl<F: FileSystem, L: ActionLog> EditApplier<F, L> {
    /// Build an applier. A configured `workspace_root` must exist, since the
    /// boundary guard canonicalizes it.
    pub fn new(fs: F, log: L, config: ApplyConfig) -> Result<Self, ApplyError> {
        let guard = config
            .workspace_root
            .as_deref()
            .map(WorkspaceGuard::new)
            .transpose()?;
        let display_base = guard.as_ref().map(|g| g.workspace_root().to_path_buf());
        Ok(Self {
            fs,
            log,
            config,
            guard,
            display_base,
        })
    }

    /// Show paths in log lines relative to `base`.
    pub fn with_display_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.display_base = Some(base.into());
        self
    }

    pub fn is_preview(&self) -> bool {
        self.config.preview
    }

    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Apply every item of `edit`, in order.
    pub fn apply(&self, edit: &WorkspaceEdit) -> Result<Vec<ApplyResult>, ApplyError> {
        let plan = normalize(edit);
        tracing::debug!(items = plan.len(), preview = self.is_preview(), "applying workspace edit");

        let mut results = Vec::with_capacity(plan.len());
        for item in &plan {
            results.push(self.apply_item(item)?);
        }
        Ok(results)
    }

    pub fn apply_item(&self, item: &WorkItem<'_>) -> Result<ApplyResult, ApplyError> {
        match item {
            WorkItem::FileOperation(op) => self.apply_file_operation(op),
            WorkItem::TextEdits { location, edits } => self.apply_text_edits(location, edits),
        }
    }

    /// Resolve a wire location to the path the filesystem sees.
    pub fn resolve(&self, location: &str) -> Result<PathBuf, ApplyError> {
        let path = location_to_path(location)?;
        match &self.guard {
            Some(guard) => Ok(guard.validate_path(path)?),
            None => Ok(path),
        }
    }

    fn display(&self, path: &Path) -> String {
        display_path(path, self.display_base.as_deref())
    }

    /// Emit an action line, marked when nothing will actually happen.
    fn announce(&self, action: &str) {
        if self.config.preview {
            self.log.log(&format!("{PREVIEW_PREFIX} {action}"));
        } else {
            self.log.log(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use crate::log::MemoryLog;
    use crate::schema::{
        DocumentChange, DocumentEditBatch, FileOperation, Position, Range, TextEdit,
    };

    fn batch(uri: &str, edits: Vec<TextEdit>) -> DocumentChange {
        DocumentEditBatch::new(uri, edits).into()
    }

    #[test]
    fn test_apply_runs_items_in_order() {
        let fs = MemoryFs::new().with_file("/ws/a.rs", "fn a() {}\n");
        let log = MemoryLog::new();
        let applier = EditApplier::new(&fs, &log, ApplyConfig::default()).unwrap();

        let edit = WorkspaceEdit::from_document_changes(vec![
            FileOperation::rename("file:///ws/a.rs", "file:///ws/b.rs").into(),
            batch(
                "file:///ws/b.rs",
                vec![TextEdit::new(Range::from_coords(0, 3, 0, 4), "b")],
            ),
            FileOperation::create("file:///ws/c.rs").into(),
        ]);

        let results = applier.apply(&edit).unwrap();
        assert_eq!(
            results,
            vec![
                ApplyResult {
                    file: PathBuf::from("/ws/b.rs"),
                    changes: 1
                },
                ApplyResult {
                    file: PathBuf::from("/ws/b.rs"),
                    changes: 1
                },
                ApplyResult {
                    file: PathBuf::from("/ws/c.rs"),
                    changes: 1
                },
            ]
        );
        assert_eq!(fs.contents("/ws/b.rs").as_deref(), Some("fn b() {}\n"));
        assert_eq!(fs.contents("/ws/c.rs").as_deref(), Some(""));
        assert!(fs.contents("/ws/a.rs").is_none());
        assert_eq!(
            log.messages(),
            vec![
                "Rename /ws/a.rs -> /ws/b.rs",
                "Edit /ws/b.rs (1 edit)",
                "Create file /ws/c.rs",
            ]
        );
    }

    #[test]
    fn test_failure_stops_remaining_items() {
        let fs = MemoryFs::new().with_file("/ws/a.rs", "a");
        let applier = EditApplier::new(&fs, MemoryLog::new(), ApplyConfig::default()).unwrap();

        let edit = WorkspaceEdit::from_document_changes(vec![
            batch(
                "file:///ws/a.rs",
                vec![TextEdit::new(Range::from_coords(0, 0, 0, 1), "A")],
            ),
            batch(
                "file:///ws/missing.rs",
                vec![TextEdit::insert(Position::new(0, 0), "x")],
            ),
            FileOperation::create("file:///ws/never.rs").into(),
        ]);

        let err = applier.apply(&edit).unwrap_err();
        assert!(matches!(err, ApplyError::Filesystem { ref path, .. } if path == Path::new("/ws/missing.rs")));

        // First item stays applied, third never ran
        assert_eq!(fs.contents("/ws/a.rs").as_deref(), Some("A"));
        assert!(fs.contents("/ws/never.rs").is_none());
    }

    #[test]
    fn test_only_document_changes_applied_when_both_present() {
        let fs = MemoryFs::new()
            .with_file("/ws/new.rs", "new")
            .with_file("/ws/old.rs", "old");
        let applier = EditApplier::new(&fs, MemoryLog::new(), ApplyConfig::default()).unwrap();

        let mut edit = WorkspaceEdit::from_document_changes(vec![batch(
            "file:///ws/new.rs",
            vec![TextEdit::insert(Position::new(0, 3), "!")],
        )]);
        edit.changes = Some(
            [(
                "file:///ws/old.rs".to_string(),
                vec![TextEdit::insert(Position::new(0, 3), "?")],
            )]
            .into_iter()
            .collect(),
        );

        let results = applier.apply(&edit).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(fs.contents("/ws/new.rs").as_deref(), Some("new!"));
        assert_eq!(fs.contents("/ws/old.rs").as_deref(), Some("old"));
    }

    #[test]
    fn test_preview_whole_edit_touches_nothing() {
        let fs = MemoryFs::new().with_file("/ws/a.rs", "abc\ndef\nghi");
        let log = MemoryLog::new();
        let applier = EditApplier::new(&fs, &log, ApplyConfig::preview()).unwrap();

        let edit = WorkspaceEdit::from_changes([(
            "file:///ws/a.rs".to_string(),
            vec![
                TextEdit::new(Range::from_coords(0, 1, 0, 2), "X"),
                TextEdit::new(Range::from_coords(2, 0, 2, 1), "Y"),
            ],
        )]);

        let first = applier.apply(&edit).unwrap();
        let second = applier.apply(&edit).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].changes, 2);
        assert!(fs.calls().is_empty());
        assert_eq!(fs.contents("/ws/a.rs").as_deref(), Some("abc\ndef\nghi"));
        assert!(log.messages().iter().all(|m| m.starts_with(PREVIEW_PREFIX)));
    }

    #[test]
    fn test_display_base_shortens_log_paths() {
        let fs = MemoryFs::new();
        let log = MemoryLog::new();
        let applier = EditApplier::new(&fs, &log, ApplyConfig::default())
            .unwrap()
            .with_display_base("/ws");

        let _ = applier
            .apply_file_operation(&FileOperation::create("file:///ws/src/new.rs"))
            .unwrap();
        assert_eq!(log.messages(), vec!["Create file src/new.rs"]);
    }

    #[test]
    fn test_workspace_root_confines_edits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join("ws");
        std::fs::create_dir_all(&workspace).unwrap();

        let config = ApplyConfig {
            workspace_root: Some(workspace.clone()),
            ..ApplyConfig::preview()
        };
        let applier = EditApplier::new(MemoryFs::new(), MemoryLog::new(), config).unwrap();

        let inside = applier.resolve("src/lib.rs").unwrap();
        assert_eq!(inside, workspace.canonicalize().unwrap().join("src/lib.rs"));

        let outside = temp_dir.path().join("other.rs");
        let err = applier
            .apply_file_operation(&FileOperation::delete(outside.to_string_lossy()))
            .unwrap_err();
        assert!(matches!(err, ApplyError::Safety(_)));
    }
}
