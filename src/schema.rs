//! Wire model for LSP-shaped workspace edits.
//!
//! These types deserialize the JSON a language server sends in
//! `workspace/applyEdit` or a rename/code-action response. Locations are kept
//! as opaque strings; [`crate::uri::location_to_path`] turns them into paths.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Zero-based line and UTF-16 column.
///
/// Field order matters: the derived `Ord` compares `line` first, then
/// `character`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand for `Range::new(Position::new(..), Position::new(..))`.
    pub const fn from_coords(
        start_line: u32,
        start_character: u32,
        end_line: u32,
        end_character: u32,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Replace the text spanned by `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: Position, new_text: impl Into<String>) -> Self {
        Self::new(Range::new(at, at), new_text)
    }

    pub fn delete(range: Range) -> Self {
        Self::new(range, String::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileOptions {
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub ignore_if_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileOptions {
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub ignore_if_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileOptions {
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub ignore_if_not_exists: bool,
}

/// A resource operation inside `documentChanges`, discriminated by `kind`.
///
/// Locations are optional so that a payload missing them still parses and
/// the applier can report which endpoint was absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileOperation {
    Create {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<CreateFileOptions>,
    },
    Rename {
        #[serde(rename = "oldUri", default, skip_serializing_if = "Option::is_none")]
        old_uri: Option<String>,
        #[serde(rename = "newUri", default, skip_serializing_if = "Option::is_none")]
        new_uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<RenameFileOptions>,
    },
    Delete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<DeleteFileOptions>,
    },
}

impl FileOperation {
    pub fn create(uri: impl Into<String>) -> Self {
        FileOperation::Create {
            uri: Some(uri.into()),
            options: None,
        }
    }

    pub fn rename(old_uri: impl Into<String>, new_uri: impl Into<String>) -> Self {
        FileOperation::Rename {
            old_uri: Some(old_uri.into()),
            new_uri: Some(new_uri.into()),
            options: None,
        }
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        FileOperation::Delete {
            uri: Some(uri.into()),
            options: None,
        }
    }

    /// Lowercase verb used in log lines and reports.
    pub fn verb(&self) -> &'static str {
        match self {
            FileOperation::Create { .. } => "create",
            FileOperation::Rename { .. } => "rename",
            FileOperation::Delete { .. } => "delete",
        }
    }
}

/// `OptionalVersionedTextDocumentIdentifier`. The version is carried through
/// but never checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedDocument {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// `TextDocumentEdit`: every edit targets the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEditBatch {
    pub text_document: VersionedDocument,
    #[serde(default)]
    pub edits: Vec<TextEdit>,
}

impl DocumentEditBatch {
    pub fn new(uri: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        Self {
            text_document: VersionedDocument {
                uri: uri.into(),
                version: None,
            },
            edits,
        }
    }
}

/// One entry of `documentChanges`.
///
/// Resource operations carry a `kind` tag; text document edits do not, so the
/// operation variant is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentChange {
    Operation(FileOperation),
    Edit(DocumentEditBatch),
}

impl From<FileOperation> for DocumentChange {
    fn from(op: FileOperation) -> Self {
        DocumentChange::Operation(op)
    }
}

impl From<DocumentEditBatch> for DocumentChange {
    fn from(batch: DocumentEditBatch) -> Self {
        DocumentChange::Edit(batch)
    }
}

/// The legacy `changes` map, kept in the order the entries appeared on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyChanges(pub Vec<(String, Vec<TextEdit>)>);

impl LegacyChanges {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TextEdit])> {
        self.0
            .iter()
            .map(|(uri, edits)| (uri.as_str(), edits.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<TextEdit>)> for LegacyChanges {
    fn from_iter<I: IntoIterator<Item = (String, Vec<TextEdit>)>>(iter: I) -> Self {
        LegacyChanges(iter.into_iter().collect())
    }
}

impl Serialize for LegacyChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (uri, edits) in &self.0 {
            map.serialize_entry(uri, edits)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LegacyChanges {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChangesVisitor;

        impl<'de> Visitor<'de> for ChangesVisitor {
            type Value = LegacyChanges;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from document URI to text edits")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((uri, edits)) = access.next_entry::<String, Vec<TextEdit>>()? {
                    entries.push((uri, edits));
                }
                Ok(LegacyChanges(entries))
            }
        }

        deserializer.deserialize_map(ChangesVisitor)
    }
}

/// A change set in either the `documentChanges` or the legacy `changes`
/// shape. When both are present `documentChanges` wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_changes: Option<Vec<DocumentChange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<LegacyChanges>,
}

impl WorkspaceEdit {
    pub fn from_document_changes(changes: Vec<DocumentChange>) -> Self {
        Self {
            document_changes: Some(changes),
            changes: None,
        }
    }

    pub fn from_changes(changes: impl IntoIterator<Item = (String, Vec<TextEdit>)>) -> Self {
        Self {
            document_changes: None,
            changes: Some(changes.into_iter().collect()),
        }
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
