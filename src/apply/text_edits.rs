use super::{ApplyError, ApplyResult, EditApplier};
use crate::fs::FileSystem;
use crate::lines::{self, find_overlap, sort_for_application};
use crate::log::ActionLog;
use crate::schema::TextEdit;
use std::path::{Path, PathBuf};

/// Before/after content of one file, computed without writing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEdit {
    pub file: PathBuf,
    pub original: String,
    pub edited: String,
}

impl<F: FileSystem, L: ActionLog> EditApplier<F, L> {
    /// Apply a batch of edits to one file and write it back once.
    ///
    /// Edits are applied bottom to top so each one's coordinates still refer
    /// to the original content. An empty batch is a no-op. In preview mode
    /// the file is neither read nor written; each edit is logged in
    /// application order instead.
    pub fn apply_text_edits(
        &self,
        location: &str,
        edits: &[TextEdit],
    ) -> Result<ApplyResult, ApplyError> {
        let path = self.resolve(location)?;
        if edits.is_empty() {
            return Ok(ApplyResult {
                file: path,
                changes: 0,
            });
        }

        self.check_overlaps(&path, edits)?;
        self.announce(&format!(
            "Edit {} ({})",
            self.display(&path),
            edit_count(edits.len())
        ));

        if self.is_preview() {
            for edit in sort_for_application(edits) {
                self.announce(&format!("  {}", describe_edit(edit)));
            }
            return Ok(ApplyResult {
                file: path,
                changes: edits.len(),
            });
        }

        let original = self
            .fs
            .read_to_string(&path)
            .map_err(ApplyError::filesystem(&path))?;
        let edited =
            lines::apply_edits(&original, edits).map_err(|e| ApplyError::from_line(&path, e))?;

        if edited == original {
            tracing::debug!(file = %path.display(), "content unchanged, skipping write");
        } else {
            self.fs
                .write(&path, &edited)
                .map_err(ApplyError::filesystem(&path))?;
        }

        Ok(ApplyResult {
            file: path,
            changes: edits.len(),
        })
    }

    /// Compute what `apply_text_edits` would write, without writing.
    ///
    /// Unlike preview mode this reads the file, so it can back a diff view.
    pub fn render_text_edits(
        &self,
        location: &str,
        edits: &[TextEdit],
    ) -> Result<RenderedEdit, ApplyError> {
        let path = self.resolve(location)?;
        self.check_overlaps(&path, edits)?;

        let original = self
            .fs
            .read_to_string(&path)
            .map_err(ApplyError::filesystem(&path))?;
        let edited =
            lines::apply_edits(&original, edits).map_err(|e| ApplyError::from_line(&path, e))?;

        Ok(RenderedEdit {
            file: path,
            original,
            edited,
        })
    }

    fn check_overlaps(&self, path: &Path, edits: &[TextEdit]) -> Result<(), ApplyError> {
        let Some((first, second)) = find_overlap(edits) else {
            return Ok(());
        };

        if self.config.reject_overlapping {
            return Err(ApplyError::OverlappingEdits {
                file: path.to_path_buf(),
                first: edits[first].range,
                second: edits[second].range,
            });
        }

        tracing::warn!(
            file = %path.display(),
            first = %edits[first].range,
            second = %edits[second].range,
            "applying overlapping edits in bottom-to-top order"
        );
        Ok(())
    }
}

/// One-line preview of an edit: 1-based lines, 0-based columns.
pub fn describe_edit(edit: &TextEdit) -> String {
    let range = edit.range;
    format!(
        "L{}:{}-L{}:{} -> {:?}",
        u64::from(range.start.line) + 1,
        range.start.character,
        u64::from(range.end.line) + 1,
        range.end.character,
        edit.new_text
    )
}

pub(crate) fn edit_count(count: usize) -> String {
    if count == 1 {
        "1 edit".to_string()
    } else {
        format!("{count} edits")
    }
}
