use super::{ApplyError, ApplyResult, EditApplier};
use crate::fs::FileSystem;
use crate::log::ActionLog;
use crate::schema::FileOperation;
use std::io;
use std::path::{Path, PathBuf};

impl<F: FileSystem, L: ActionLog> EditApplier<F, L> {
    /// Perform (or, in preview mode, only announce) one create, rename or
    /// delete.
    ///
    /// Preview mode resolves the locations and logs the action but makes no
    /// filesystem call at all, so option checks such as `ignoreIfExists` are
    /// only evaluated on a real run.
    pub fn apply_file_operation(&self, op: &FileOperation) -> Result<ApplyResult, ApplyError> {
        match op {
            FileOperation::Create { uri, options } => {
                let location = uri
                    .as_deref()
                    .ok_or(ApplyError::MissingTarget {
                        operation: op.verb(),
                    })?;
                let path = self.resolve(location)?;
                self.announce(&format!("Create file {}", self.display(&path)));
                if self.is_preview() {
                    return Ok(performed(path));
                }

                let options = options.unwrap_or_default();
                if self.fs.exists(&path) && !options.overwrite {
                    if options.ignore_if_exists {
                        return Ok(self.skipped(path, "already exists"));
                    }
                    return Err(ApplyError::TargetExists { path });
                }

                self.ensure_parent(&path)?;
                self.fs
                    .create_empty(&path)
                    .map_err(ApplyError::filesystem(&path))?;
                Ok(performed(path))
            }

            FileOperation::Rename {
                old_uri,
                new_uri,
                options,
            } => {
                let (Some(old_location), Some(new_location)) = (old_uri, new_uri) else {
                    return Err(ApplyError::MissingRenameEndpoints);
                };
                let from = self.resolve(old_location)?;
                let to = self.resolve(new_location)?;
                self.announce(&format!(
                    "Rename {} -> {}",
                    self.display(&from),
                    self.display(&to)
                ));
                if self.is_preview() {
                    return Ok(performed(to));
                }

                let options = options.unwrap_or_default();
                if self.fs.exists(&to) && !options.overwrite {
                    if options.ignore_if_exists {
                        return Ok(self.skipped(to, "already exists"));
                    }
                    return Err(ApplyError::TargetExists { path: to });
                }

                self.ensure_parent(&to)?;
                self.fs
                    .rename(&from, &to)
                    .map_err(ApplyError::filesystem(&from))?;
                Ok(performed(to))
            }

            FileOperation::Delete { uri, options } => {
                let location = uri
                    .as_deref()
                    .ok_or(ApplyError::MissingTarget {
                        operation: op.verb(),
                    })?;
                let path = self.resolve(location)?;
                self.announce(&format!("Delete file {}", self.display(&path)));
                if self.is_preview() {
                    return Ok(performed(path));
                }

                let options = options.unwrap_or_default();
                if options.ignore_if_not_exists && !self.fs.exists(&path) {
                    return Ok(self.skipped(path, "does not exist"));
                }

                let removed = if self.fs.is_dir(&path) {
                    if !options.recursive {
                        return Err(ApplyError::Filesystem {
                            path,
                            source: io::Error::new(
                                io::ErrorKind::InvalidInput,
                                "deleting a directory requires the recursive option",
                            ),
                        });
                    }
                    self.fs.remove_dir_all(&path)
                } else {
                    self.fs.remove_file(&path)
                };
                removed.map_err(ApplyError::filesystem(&path))?;
                Ok(performed(path))
            }
        }
    }

    fn ensure_parent(&self, path: &Path) -> Result<(), ApplyError> {
        if !self.config.create_parent_dirs {
            return Ok(());
        }
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.fs.exists(parent) => {
                tracing::debug!(dir = %parent.display(), "creating parent directories");
                self.fs
                    .create_dir_all(parent)
                    .map_err(ApplyError::filesystem(parent))
            }
            _ => Ok(()),
        }
    }

    fn skipped(&self, path: PathBuf, reason: &str) -> ApplyResult {
        self.log
            .log(&format!("  skipped {}: {reason}", self.display(&path)));
        ApplyResult {
            file: path,
            changes: 0,
        }
    }
}

fn performed(path: PathBuf) -> ApplyResult {
    ApplyResult {
        file: path,
        changes: 1,
    }
}
