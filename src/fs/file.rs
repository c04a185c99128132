//! Open file handles
//!
//! A [`File`] is created per `open` call and borrows the tree it came from.
//! File contents are exposed through `Read` + `Seek`; directories are listed
//! page by page through [`File::read_dir`].

use std::borrow::Cow;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use flate2::read::MultiGzDecoder;

use super::types::{Content, Entry, EntryKind, FileInfo, FsError};

/// An opened entry of a virtual file tree.
///
/// Each handle owns its read position and, for directories, its own listing
/// cursor. The tree itself is never touched by reads, so any number of
/// handles to the same entry can coexist.
#[derive(Debug)]
pub struct File<'a> {
    path: String,
    entry: &'a Entry,
    reader: Cursor<Cow<'a, [u8]>>,
    /// Children not yet returned by `read_dir`.
    pending: &'a [Entry],
    closed: bool,
}

impl<'a> File<'a> {
    /// Open `entry`, found at `path`.
    ///
    /// Gzip content is inflated here in full: the decoder cannot seek, and
    /// handles must.
    pub(crate) fn open(entry: &'a Entry, path: String) -> Result<Self, FsError> {
        let bytes: Cow<'a, [u8]> = match entry.kind() {
            EntryKind::File(Content::Raw(raw)) => Cow::Borrowed(raw.as_slice()),
            EntryKind::File(Content::Gzip { data, .. }) => {
                let mut decoded = Vec::new();
                MultiGzDecoder::new(data.as_slice())
                    .read_to_end(&mut decoded)
                    .map_err(|e| FsError::Decompress {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                Cow::Owned(decoded)
            }
            EntryKind::Directory(_) => Cow::Borrowed(&[]),
        };
        Ok(File {
            path,
            entry,
            reader: Cursor::new(bytes),
            pending: entry.children(),
            closed: false,
        })
    }

    /// Clean absolute path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Metadata of the opened entry. `size` is the exact decoded length.
    pub fn stat(&self) -> Result<FileInfo, FsError> {
        self.ensure_open("stat")?;
        let mut info = self.entry.info();
        if self.entry.is_file() {
            info.size = self.reader.get_ref().len() as u64;
        }
        Ok(info)
    }

    /// Return up to `count` entries not yet listed by this handle, in creation
    /// order. `count <= 0` returns everything left.
    ///
    /// `Ok(None)` marks the end of the directory: once every child has been
    /// returned, further calls keep returning it.
    pub fn read_dir(&mut self, count: isize) -> Result<Option<Vec<FileInfo>>, FsError> {
        self.ensure_open("scandir")?;
        if !self.entry.is_directory() {
            return Err(FsError::not_directory(&self.path, "scandir"));
        }
        if self.pending.is_empty() {
            return Ok(None);
        }

        let take = if count <= 0 {
            self.pending.len()
        } else {
            (count as usize).min(self.pending.len())
        };
        let (batch, rest) = self.pending.split_at(take);
        self.pending = rest;
        Ok(Some(batch.iter().map(Entry::info).collect()))
    }

    /// Mark the handle unusable. Reads, seeks and listings fail afterwards.
    pub fn close(&mut self) -> Result<(), FsError> {
        self.ensure_open("close")?;
        self.closed = true;
        self.pending = &[];
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self, operation: &str) -> Result<(), FsError> {
        if self.closed {
            return Err(FsError::closed(&self.path, operation));
        }
        Ok(())
    }
}

impl Read for File<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open("read").map_err(io::Error::other)?;
        if self.entry.is_directory() {
            return Err(io::Error::other(FsError::is_directory(&self.path, "read")));
        }
        self.reader.read(buf)
    }
}

impl Seek for File<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.ensure_open("seek").map_err(io::Error::other)?;
        self.reader.seek(pos)
    }
}
