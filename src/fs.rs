//! Filesystem seam used by the applier.
//!
//! [`DiskFs`] is the real implementation: writes go through a tempfile in the
//! same directory, are fsynced, then renamed over the target. [`MemoryFs`]
//! keeps files in memory and records every call, which makes it useful for
//! computing results without touching disk and for asserting that preview
//! runs do no I/O.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the full contents of `path` in one step.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Create `path` as an empty file, truncating it if it exists.
    fn create_empty(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write(path, contents)
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        (**self).create_empty(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl FileSystem for DiskFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        atomic_write(path, contents.as_bytes())?;

        // Bump mtime so watchers and incremental builds notice the change
        filetime::set_file_mtime(path, filetime::FileTime::now())
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        fs::File::create(path).map(drop)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write lands or the original file is left as it was.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // Tempfile must live on the same filesystem for the rename to be atomic
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A filesystem call recorded by [`MemoryFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    Read(PathBuf),
    Write(PathBuf),
    CreateEmpty(PathBuf),
    RemoveFile(PathBuf),
    RemoveDirAll(PathBuf),
    Rename(PathBuf, PathBuf),
    CreateDirAll(PathBuf),
}

/// In-memory filesystem that records every mutating or reading call.
///
/// Directories are implicit: a path is a directory when some file lives
/// below it, or when it was created with `create_dir_all`.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<Vec<PathBuf>>,
    calls: RefCell<Vec<FsCall>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without recording a call.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.into());
        self
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: FsCall) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{}: no such file", path.display()),
        )
    }
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.record(FsCall::Read(path.to_path_buf()));
        self.contents(path).ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.record(FsCall::Write(path.to_path_buf()));
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        self.record(FsCall::CreateEmpty(path.to_path_buf()));
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), String::new());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.record(FsCall::RemoveFile(path.to_path_buf()));
        self.files
            .borrow_mut()
            .remove(path)
            .map(drop)
            .ok_or_else(|| Self::not_found(path))
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(FsCall::RemoveDirAll(path.to_path_buf()));
        self.files.borrow_mut().retain(|file, _| !file.starts_with(path));
        self.dirs.borrow_mut().retain(|dir| !dir.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(FsCall::Rename(from.to_path_buf(), to.to_path_buf()));
        let mut files = self.files.borrow_mut();
        let contents = files.remove(from).ok_or_else(|| Self::not_found(from))?;
        files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(FsCall::CreateDirAll(path.to_path_buf()));
        self.dirs.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().iter().any(|dir| dir.starts_with(path))
            || self
                .files
                .borrow()
                .keys()
                .any(|file| file != path && file.starts_with(path))
    }
}
