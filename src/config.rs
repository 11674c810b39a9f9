//! Apply configuration, loaded from TOML.
//!
//! ```toml
//! preview = false
//! reject_overlapping = true
//! create_parent_dirs = true
//! workspace_root = "/path/to/project"
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplyConfig {
    /// Report actions instead of performing them.
    pub preview: bool,
    /// Fail a batch whose edits overlap instead of applying them in order.
    pub reject_overlapping: bool,
    /// Create missing parent directories for create and rename targets.
    pub create_parent_dirs: bool,
    /// Resolve relative locations against this directory and refuse to
    /// touch anything outside it.
    pub workspace_root: Option<PathBuf>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            preview: false,
            reject_overlapping: true,
            create_parent_dirs: true,
            workspace_root: None,
        }
    }
}

impl ApplyConfig {
    pub fn preview() -> Self {
        Self {
            preview: true,
            ..Self::default()
        }
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check(None)
    }

    fn check(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        match &self.workspace_root {
            Some(root) if root.as_os_str().is_empty() => Err(ConfigError::Invalid {
                path: path.map(Path::to_path_buf),
                field: "workspace_root",
                reason: "must not be empty",
            }),
            _ => Ok(()),
        }
    }
}

/// Why a config could not be loaded. `path` is `None` for configs parsed
/// from a string.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Invalid {
        path: Option<PathBuf>,
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    /// Where the config came from, for messages.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path.as_path()),
            ConfigError::Parse { path, .. } | ConfigError::Invalid { path, .. } => {
                path.as_deref()
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = self
            .path()
            .map_or_else(|| "apply config".to_string(), |p| p.display().to_string());
        match self {
            ConfigError::Read { source, .. } => write!(f, "cannot read {origin}: {source}"),
            ConfigError::Parse { source, .. } => write!(f, "{origin} is not valid TOML: {source}"),
            ConfigError::Invalid { field, reason, .. } => {
                write!(f, "{origin}: `{field}` {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

fn parse(input: &str, path: Option<&Path>) -> Result<ApplyConfig, ConfigError> {
    let config: ApplyConfig = toml_edit::de::from_str(input).map_err(|source| ConfigError::Parse {
        path: path.map(Path::to_path_buf),
        source,
    })?;
    config.check(path)?;
    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<ApplyConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<ApplyConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(load_from_str("").unwrap(), ApplyConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = load_from_str(
            r#"
preview = true
reject_overlapping = false
create_parent_dirs = false
workspace_root = "/tmp/project"
"#,
        )
        .unwrap();

        assert!(config.preview);
        assert!(!config.reject_overlapping);
        assert!(!config.create_parent_dirs);
        assert_eq!(config.workspace_root, Some(PathBuf::from("/tmp/project")));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = load_from_str("dry_run = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
        assert!(err.to_string().starts_with("apply config is not valid TOML"));
    }

    #[test]
    fn test_empty_workspace_root_rejected() {
        let err = load_from_str(r#"workspace_root = """#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                path: None,
                field: "workspace_root",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "apply config: `workspace_root` must not be empty"
        );
    }

    #[test]
    fn test_load_from_path_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("wsedit.toml");
        fs::write(&path, "preview = 3").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));

        fs::write(&path, r#"workspace_root = """#).unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().starts_with(&path.display().to_string()));

        let missing = load_from_path(temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
        assert!(std::error::Error::source(&missing).is_some());
    }
}
