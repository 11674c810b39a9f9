use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Workspace boundary checks so that an edit cannot reach files outside the
/// project it was produced for.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical path to workspace root
    workspace_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to resolve path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WorkspaceGuard {
    /// Create a guard rooted at `workspace_root`.
    ///
    /// The root is canonicalized so that symlinked checkouts compare
    /// correctly.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = canonicalize(workspace_root.as_ref())?;

        let mut forbidden_paths = Vec::new();

        // Dependency sources and toolchains
        if let Some(home) = home::home_dir() {
            for dir in [".cargo/registry", ".cargo/git", ".rustup"] {
                if let Ok(path) = home.join(dir).canonicalize() {
                    forbidden_paths.push(path);
                }
            }
        }

        // VCS metadata and build output inside the workspace
        for dir in [".git", "target"] {
            if let Ok(path) = workspace_root.join(dir).canonicalize() {
                forbidden_paths.push(path);
            }
        }

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Create a guard with an explicit forbidden list.
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        Ok(Self {
            workspace_root: canonicalize(workspace_root.as_ref())?,
            forbidden_paths: forbidden
                .iter()
                .map(|path| canonicalize(path))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Check that `path` may be touched and return its resolved form.
    ///
    /// Relative paths are taken relative to the workspace root. The path does
    /// not need to exist: create and rename targets are resolved through
    /// their nearest existing ancestor, so a symlinked parent still cannot
    /// escape the workspace.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        let resolved = resolve_through_existing(&absolute)?;
        self.check_resolved(&resolved)?;

        Ok(resolved)
    }

    fn check_resolved(&self, resolved: &Path) -> Result<(), SafetyError> {
        if !resolved.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: resolved.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if resolved.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: resolved.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, SafetyError> {
    path.canonicalize().map_err(|source| SafetyError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Canonicalize the longest existing prefix of `path` and re-append the
/// missing tail.
///
/// A missing component named `..` cannot be resolved without the directory
/// it leaves, so such paths are rejected.
fn resolve_through_existing(path: &Path) -> Result<PathBuf, SafetyError> {
    let mut missing: Vec<OsString> = Vec::new();
    let mut cursor = path;

    loop {
        match cursor.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                let (Some(name), Some(parent)) = (cursor.file_name(), cursor.parent()) else {
                    return Err(SafetyError::Resolve {
                        path: path.to_path_buf(),
                        source,
                    });
                };
                missing.push(name.to_os_string());
                cursor = parent;
            }
            Err(source) => {
                return Err(SafetyError::Resolve {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_path_inside_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path();
        let guard = WorkspaceGuard::new(workspace).unwrap();

        let file = workspace.join("src/main.rs");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        let result = guard.validate_path(&file).unwrap();
        assert_eq!(result, file.canonicalize().unwrap());
    }

    #[test]
    fn test_validate_missing_target_inside_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("new/dir/file.rs").unwrap();
        assert_eq!(
            result,
            guard.workspace_root().join("new").join("dir").join("file.rs")
        );
    }

    #[test]
    fn test_validate_path_outside_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();
        let guard = WorkspaceGuard::new(&workspace).unwrap();

        let outside = temp_dir.path().join("outside.rs");
        fs::write(&outside, b"").unwrap();

        let result = guard.validate_path(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideWorkspace { .. })));

        let escaping = guard.validate_path("../elsewhere.rs");
        assert!(matches!(escaping, Err(SafetyError::OutsideWorkspace { .. })));
    }

    #[test]
    fn test_missing_parent_traversal_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("ghost/../../x.rs");
        assert!(matches!(result, Err(SafetyError::Resolve { .. })));
    }

    #[test]
    fn test_validate_path_forbidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path();
        let forbidden = workspace.join("target");
        fs::create_dir_all(&forbidden).unwrap();

        let guard = WorkspaceGuard::with_forbidden(workspace, vec![forbidden]).unwrap();

        let result = guard.validate_path("target/debug/binary");
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    fn test_default_guard_forbids_git_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        let guard = WorkspaceGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path(".git/config");
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();

        let outside_dir = temp_dir.path().join("outside");
        fs::create_dir_all(&outside_dir).unwrap();

        let link = workspace.join("escape");
        symlink(&outside_dir, &link).unwrap();

        let guard = WorkspaceGuard::new(&workspace).unwrap();

        // Not-yet-existing file below a symlinked directory
        let result = guard.validate_path("escape/new.rs");
        assert!(matches!(result, Err(SafetyError::OutsideWorkspace { .. })));
    }
}
