//! wsedit: apply LSP workspace edits to files on disk
//!
//! Takes the `WorkspaceEdit` a language server produces for a rename, code
//! action or refactoring and makes the files on disk match it, or reports
//! what would change without touching anything.
//!
//! # Architecture
//!
//! A [`WorkspaceEdit`] in either wire shape (`documentChanges` or the legacy
//! `changes` map) is normalized by [`plan::normalize`] into ordered
//! [`WorkItem`]s. [`EditApplier`] runs them one at a time: file operations
//! go straight to the [`FileSystem`], text batches are folded over the
//! file's lines from the bottom up by the pure functions in [`lines`] and
//! written back once.
//!
//! # Safety
//!
//! - Edits within a file are applied bottom-to-top, so coordinates never go
//!   stale
//! - Overlapping edits are rejected unless configured otherwise
//! - Atomic file writes (tempfile + fsync + rename)
//! - Optional workspace boundary enforcement
//! - Preview mode makes no filesystem calls
//!
//! # Example
//!
//! ```no_run
//! use wsedit::{ApplyConfig, ConsoleLog, DiskFs, EditApplier, WorkspaceEdit};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let edit = WorkspaceEdit::from_json(
//!     r#"{"changes": {"file:///tmp/a.rs": [
//!         {"range": {"start": {"line": 0, "character": 3},
//!                    "end": {"line": 0, "character": 6}},
//!          "newText": "bar"}
//!     ]}}"#,
//! )?;
//!
//! let applier = EditApplier::new(DiskFs, ConsoleLog, ApplyConfig::default())?;
//! for result in applier.apply(&edit)? {
//!     println!("{}: {} changes", result.file.display(), result.changes);
//! }
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod config;
pub mod format;
pub mod fs;
pub mod lines;
pub mod log;
pub mod plan;
pub mod report;
pub mod safety;
pub mod schema;
pub mod uri;

// Re-exports
pub use apply::{ApplyError, ApplyResult, EditApplier, RenderedEdit};
pub use config::{load_from_path, load_from_str, ApplyConfig, ConfigError};
pub use format::format_workspace_edit;
pub use fs::{DiskFs, FileSystem, MemoryFs};
pub use lines::{apply_edits, Line, LineEnding, LineError};
pub use log::{ActionLog, ConsoleLog, MemoryLog, NullLog};
pub use plan::{normalize, WorkItem};
pub use safety::{SafetyError, WorkspaceGuard};
pub use schema::{
    CreateFileOptions, DeleteFileOptions, DocumentChange, DocumentEditBatch, FileOperation,
    LegacyChanges, Position, Range, RenameFileOptions, TextEdit, VersionedDocument, WorkspaceEdit,
};
pub use uri::{location_to_path, path_to_location, UriError};
