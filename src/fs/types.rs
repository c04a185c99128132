//! File System Types
//!
//! Core types for the virtual file tree.

use std::io;
use std::time::SystemTime;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

/// Default permission bits for directories created implicitly.
pub const DIR_MODE: u32 = 0o755;

/// Default permission bits for files written by tooling.
pub const FILE_MODE: u32 = 0o644;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("EINVAL: invalid entry name '{name}'")]
    InvalidName { name: String },

    #[error("EBADF: file already closed, {operation} '{path}'")]
    Closed { path: String, operation: String },

    #[error("EIO: cannot decompress '{path}': {message}")]
    Decompress { path: String, message: String },
}

impl FsError {
    pub(crate) fn not_found(path: &str, operation: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn already_exists(path: &str, operation: &str) -> Self {
        FsError::AlreadyExists {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn not_directory(path: &str, operation: &str) -> Self {
        FsError::NotDirectory {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn is_directory(path: &str, operation: &str) -> Self {
        FsError::IsDirectory {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn closed(path: &str, operation: &str) -> Self {
        FsError::Closed {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }
}

/// Stored bytes of a file entry.
#[derive(Debug, Clone)]
pub enum Content {
    /// Bytes handed out verbatim.
    Raw(Vec<u8>),
    /// A gzip stream, possibly of several members, inflated when the file
    /// is opened.
    Gzip { data: Vec<u8>, decoded_len: u64 },
}

impl Content {
    /// Wrap a gzip stream, measuring its inflated size once.
    ///
    /// An undecodable stream measures 0; the error is reported by `open`.
    pub fn gzip(data: Vec<u8>) -> Self {
        let decoded_len = io::copy(&mut MultiGzDecoder::new(data.as_slice()), &mut io::sink())
            .unwrap_or(0);
        Content::Gzip { data, decoded_len }
    }

    /// Exact size of the content once decoded.
    pub fn decoded_len(&self) -> u64 {
        match self {
            Content::Raw(bytes) => bytes.len() as u64,
            Content::Gzip { decoded_len, .. } => *decoded_len,
        }
    }
}

/// What an entry is. Fixed at creation.
#[derive(Debug, Clone)]
pub enum EntryKind {
    File(Content),
    /// Children in creation order.
    Directory(Vec<Entry>),
}

/// A node of the virtual file tree.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    mode: u32,
    mtime: SystemTime,
    kind: EntryKind,
}

impl Entry {
    /// The root directory. Its name is the separator itself.
    pub(crate) fn root() -> Self {
        Entry {
            name: "/".to_string(),
            mode: DIR_MODE,
            mtime: SystemTime::now(),
            kind: EntryKind::Directory(Vec::new()),
        }
    }

    pub(crate) fn directory(name: &str, mode: u32, mtime: SystemTime) -> Result<Self, FsError> {
        validate_name(name)?;
        Ok(Entry {
            name: name.to_string(),
            mode,
            mtime,
            kind: EntryKind::Directory(Vec::new()),
        })
    }

    pub(crate) fn file(
        name: &str,
        mode: u32,
        mtime: SystemTime,
        content: Content,
    ) -> Result<Self, FsError> {
        validate_name(name)?;
        Ok(Entry {
            name: name.to_string(),
            mode,
            mtime,
            kind: EntryKind::File(content),
        })
    }

    /// Single path component, or `/` for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission bits as given at creation. Not enforced.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Caller-supplied modification time.
    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Check if entry is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory(_))
    }

    /// Check if entry is a file
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File(_))
    }

    /// Decoded byte length for files, 0 for directories.
    pub fn size(&self) -> u64 {
        match &self.kind {
            EntryKind::File(content) => content.decoded_len(),
            EntryKind::Directory(_) => 0,
        }
    }

    /// Children in creation order; empty for files.
    pub fn children(&self) -> &[Entry] {
        match &self.kind {
            EntryKind::Directory(children) => children,
            EntryKind::File(_) => &[],
        }
    }

    pub(crate) fn child(&self, name: &str) -> Option<&Entry> {
        self.children().iter().find(|c| c.name == name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Entry> {
        match &mut self.kind {
            EntryKind::Directory(children) => children.iter_mut().find(|c| c.name == name),
            EntryKind::File(_) => None,
        }
    }

    /// Append a child. Callers check for duplicates and directory-ness first.
    pub(crate) fn push_child(&mut self, entry: Entry) {
        if let EntryKind::Directory(children) = &mut self.kind {
            children.push(entry);
        }
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            is_directory: self.is_directory(),
            mode: self.mode,
            size: self.size(),
            mtime: self.mtime,
        }
    }
}

/// A name must be exactly one non-empty path component.
fn validate_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(FsError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// File status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub is_directory: bool,
    pub mode: u32,
    pub size: u64,
    pub mtime: SystemTime,
}
