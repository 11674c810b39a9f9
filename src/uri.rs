//! Resolution of document locations to filesystem paths.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("invalid file URI {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URI scheme '{scheme}' in {location}")]
    UnsupportedScheme { location: String, scheme: String },

    #[error("URI does not name a local file: {0}")]
    NotAFilePath(String),

    #[error("empty document location")]
    Empty,
}

/// Turn a location from the wire into a path.
///
/// `file://` URIs are decoded (percent-escapes, host, drive letters). Anything
/// that does not parse as an absolute URL is taken as a plain path, so
/// callers can hand in `src/main.rs` directly. Other schemes such as
/// `untitled:` have no file behind them and are rejected.
pub fn location_to_path(location: &str) -> Result<PathBuf, UriError> {
    if location.is_empty() {
        return Err(UriError::Empty);
    }

    if location.starts_with("file:") {
        let url = Url::parse(location).map_err(|source| UriError::Parse {
            location: location.to_string(),
            source,
        })?;
        return url
            .to_file_path()
            .map_err(|()| UriError::NotAFilePath(location.to_string()));
    }

    match Url::parse(location) {
        // A single-letter scheme is a Windows drive (`C:\src`), not a URI
        Ok(url) if url.scheme().len() > 1 => Err(UriError::UnsupportedScheme {
            location: location.to_string(),
            scheme: url.scheme().to_string(),
        }),
        _ => Ok(PathBuf::from(location)),
    }
}

/// Inverse of [`location_to_path`] for absolute paths.
pub fn path_to_location(path: &std::path::Path) -> Option<String> {
    Url::from_file_path(path).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_file_uri_decodes() {
        assert_eq!(
            location_to_path("file:///ws/src/my%20file.rs").unwrap(),
            PathBuf::from("/ws/src/my file.rs")
        );
    }

    #[test]
    fn test_plain_paths_pass_through() {
        assert_eq!(
            location_to_path("src/main.rs").unwrap(),
            PathBuf::from("src/main.rs")
        );
        assert_eq!(location_to_path("/abs/x.rs").unwrap(), PathBuf::from("/abs/x.rs"));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            location_to_path("untitled:Untitled-1"),
            Err(UriError::UnsupportedScheme { scheme, .. }) if scheme == "untitled"
        ));
    }

    #[test]
    fn test_empty_location_rejected() {
        assert_eq!(location_to_path(""), Err(UriError::Empty));
    }

    #[test]
    #[cfg(unix)]
    fn test_path_roundtrip() {
        let path = std::path::Path::new("/ws/a b.rs");
        let location = path_to_location(path).unwrap();
        assert_eq!(location, "file:///ws/a%20b.rs");
        assert_eq!(location_to_path(&location).unwrap(), path);
    }
}
