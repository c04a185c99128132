//! FileSet
//!
//! An in-memory virtual file tree bundled with a module name and the modules
//! it requires. Built once by tooling, then shared read-only.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use super::file::File;
use super::path::{clean_path, split_path};
use super::types::{Content, Entry, FileInfo, FsError};
use crate::module::{fmt_module, FileSystem, Module, ModuleRef};

/// A [`Module`] backed by an in-memory tree of files and directories.
///
/// Listings return entries in the order they were created. The chaining
/// builder methods panic on any invalid construction (missing parent, entry
/// already present, non-directory parent): a broken module definition is a
/// programming error. Use the `try_*` forms when the input is not trusted.
///
/// ```
/// use std::time::SystemTime;
/// use webresource::{FileSet, FileSystem};
///
/// let fs = FileSet::new("demo/pkg")
///     .mkdir("/files", 0o755)
///     .write_file("/files/demo.js", 0o644, SystemTime::now(), b"// demo".to_vec());
/// assert!(fs.open("/files/demo.js").is_ok());
/// ```
pub struct FileSet {
    name: String,
    requires: Vec<ModuleRef>,
    root: Entry,
}

impl FileSet {
    /// Create an empty tree for a module without requirements.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_requires(name, Vec::new())
    }

    /// Create an empty tree for a module requiring `requires`, in that order.
    pub fn with_requires(
        name: impl Into<String>,
        requires: impl IntoIterator<Item = ModuleRef>,
    ) -> Self {
        FileSet {
            name: name.into(),
            requires: requires.into_iter().collect(),
            root: Entry::root(),
        }
    }

    /// Wrap into a shareable module reference.
    pub fn into_module(self) -> ModuleRef {
        Arc::new(self)
    }

    /// The root directory entry.
    pub fn root(&self) -> &Entry {
        &self.root
    }

    // ------------------------------------------------------------------------
    // Chaining builder, panics on invalid construction
    // ------------------------------------------------------------------------

    /// Create a directory and all missing parents. Existing directories are
    /// left as they are.
    pub fn mkdir_all(mut self, path: &str, mode: u32) -> Self {
        let result = self.try_mkdir_all(path, mode).map(|_| ());
        self.check(result)
    }

    /// Create exactly one directory. The parent must exist, the path must not.
    pub fn mkdir(mut self, path: &str, mode: u32) -> Self {
        let result = self.try_mkdir(path, mode).map(|_| ());
        self.check(result)
    }

    /// Create a file holding `contents` verbatim.
    pub fn write_file(mut self, path: &str, mode: u32, mtime: SystemTime, contents: Vec<u8>) -> Self {
        let result = self.try_write_file(path, mode, mtime, contents).map(|_| ());
        self.check(result)
    }

    /// Create a file from gzip-compressed `contents`; reads see the inflated
    /// bytes. Invalid gzip is only reported when the file is opened.
    pub fn write_gzip_file(
        mut self,
        path: &str,
        mode: u32,
        mtime: SystemTime,
        contents: Vec<u8>,
    ) -> Self {
        let result = self.try_write_gzip_file(path, mode, mtime, contents).map(|_| ());
        self.check(result)
    }

    fn check(self, result: Result<(), FsError>) -> Self {
        if let Err(err) = result {
            panic!("invalid definition of module '{}': {}", self.name, err);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Fallible builder
    // ------------------------------------------------------------------------

    /// Fallible [`FileSet::mkdir_all`]. The whole path is checked before
    /// anything is created, so a failed call leaves the tree unchanged.
    pub fn try_mkdir_all(&mut self, path: &str, mode: u32) -> Result<&mut Self, FsError> {
        let parts = split_path(path);

        let mut existing = 0;
        let mut walked = String::new();
        let mut current = &self.root;
        for part in &parts {
            walked.push('/');
            walked.push_str(part);
            match current.child(part) {
                Some(child) if child.is_directory() => current = child,
                Some(_) => return Err(FsError::not_directory(&walked, "mkdir")),
                None => break,
            }
            existing += 1;
        }

        let (present, missing) = parts.split_at(existing);
        let parent_path = clean_path(&present.join("/"));
        let mut current = self.dir_mut(present, &parent_path, "mkdir")?;
        for part in missing {
            current.push_child(Entry::directory(part, mode, SystemTime::now())?);
            current = match current.child_mut(part) {
                Some(child) => child,
                None => return Err(FsError::not_found(&clean_path(path), "mkdir")),
            };
        }
        Ok(self)
    }

    pub fn try_mkdir(&mut self, path: &str, mode: u32) -> Result<&mut Self, FsError> {
        self.insert(path, "mkdir", |name| {
            Entry::directory(name, mode, SystemTime::now())
        })
    }

    pub fn try_write_file(
        &mut self,
        path: &str,
        mode: u32,
        mtime: SystemTime,
        contents: Vec<u8>,
    ) -> Result<&mut Self, FsError> {
        self.insert(path, "open", |name| {
            Entry::file(name, mode, mtime, Content::Raw(contents))
        })
    }

    pub fn try_write_gzip_file(
        &mut self,
        path: &str,
        mode: u32,
        mtime: SystemTime,
        contents: Vec<u8>,
    ) -> Result<&mut Self, FsError> {
        self.insert(path, "open", |name| {
            Entry::file(name, mode, mtime, Content::gzip(contents))
        })
    }

    /// Add a new entry named after the last component of `path` to its
    /// existing parent directory.
    fn insert(
        &mut self,
        path: &str,
        operation: &str,
        make: impl FnOnce(&str) -> Result<Entry, FsError>,
    ) -> Result<&mut Self, FsError> {
        let clean = clean_path(path);
        let mut parts = split_path(&clean);
        let Some(base) = parts.pop() else {
            return Err(FsError::already_exists(&clean, operation));
        };

        let parent_path = clean_path(&parts.join("/"));
        let parent = self.dir_mut(&parts, &parent_path, operation)?;
        if parent.child(base).is_some() {
            return Err(FsError::already_exists(&clean, operation));
        }
        parent.push_child(make(base)?);
        Ok(self)
    }

    fn dir_mut(
        &mut self,
        parts: &[&str],
        dir_path: &str,
        operation: &str,
    ) -> Result<&mut Entry, FsError> {
        let mut current = &mut self.root;
        for part in parts {
            current = match current.child_mut(part) {
                Some(child) => child,
                None => return Err(FsError::not_found(dir_path, operation)),
            };
        }
        if !current.is_directory() {
            return Err(FsError::not_directory(dir_path, operation));
        }
        Ok(current)
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Find the entry at `path`, if any.
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        split_path(path)
            .into_iter()
            .try_fold(&self.root, |entry, part| entry.child(part))
    }

    /// Metadata of the entry at `path` without opening it.
    pub fn stat(&self, path: &str) -> Result<FileInfo, FsError> {
        self.entry(path)
            .map(Entry::info)
            .ok_or_else(|| FsError::not_found(&clean_path(path), "stat"))
    }
}

impl FileSystem for FileSet {
    fn open(&self, path: &str) -> Result<File<'_>, FsError> {
        let clean = clean_path(path);
        match self.entry(&clean) {
            Some(entry) => File::open(entry, clean),
            None => Err(FsError::not_found(&clean, "open")),
        }
    }
}

impl Module for FileSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[ModuleRef] {
        &self.requires
    }
}

impl fmt::Display for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_module(self, f)
    }
}

impl fmt::Debug for FileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSet")
            .field("name", &self.name)
            .field("requires", &self.requires.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_all(fs: &FileSet, path: &str) -> String {
        let mut file = fs.open(path).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        file.close().unwrap();
        out
    }

    #[test]
    fn test_write_and_read_back() {
        let fs = FileSet::new("demo/pkg/import/path")
            .mkdir("/files", 0o755)
            .write_file("/files/demo.js", 0o755, SystemTime::now(), br#"console.log("demo.js was here");"#.to_vec());
        assert_eq!(read_all(&fs, "/files/demo.js"), r#"console.log("demo.js was here");"#);
        assert_eq!(read_all(&fs, "files/./demo.js"), r#"console.log("demo.js was here");"#);
    }

    #[test]
    fn test_open_missing() {
        let fs = FileSet::new("m");
        assert!(matches!(fs.open("/nope.js"), Err(FsError::NotFound { .. })));
        assert!(matches!(fs.open("/a/b/c"), Err(FsError::NotFound { .. })));
    }

    #[test]
    fn test_open_root() {
        let fs = FileSet::new("m").write_file("/a.js", 0o644, SystemTime::now(), vec![]);
        for path in ["/", "", "//", "../"] {
            let file = fs.open(path).unwrap();
            assert!(file.stat().unwrap().is_directory);
            assert_eq!(file.path(), "/");
        }
    }

    #[test]
    fn test_mkdir_all_is_idempotent() {
        let fs = FileSet::new("m")
            .mkdir("/files", 0o755)
            .mkdir_all("/files", 0o755)
            .mkdir_all("/files/test2", 0o755)
            .mkdir_all("/files/test2/", 0o755);
        assert_eq!(fs.root().children().len(), 1);
        assert_eq!(fs.entry("/files").unwrap().children().len(), 1);
        let dir = fs.open("/files/test2").unwrap();
        assert!(dir.stat().unwrap().is_directory);
    }

    #[test]
    fn test_mkdir_all_creates_parents() {
        let mut fs = FileSet::new("m");
        fs.try_mkdir_all("/a/b/c", 0o700).unwrap();
        assert!(fs.stat("/a").unwrap().is_directory);
        assert_eq!(fs.stat("/a/b/c").unwrap().mode, 0o700);
    }

    #[test]
    fn test_mkdir_all_through_file_fails() {
        let mut fs = FileSet::new("m");
        fs.try_write_file("/a", 0o644, SystemTime::now(), vec![]).unwrap();
        assert!(matches!(fs.try_mkdir_all("/a/b", 0o755), Err(FsError::NotDirectory { .. })));
    }

    #[test]
    fn test_failed_mkdir_all_leaves_tree_unchanged() {
        let mut fs = FileSet::new("m");
        fs.try_mkdir("/lib", 0o755).unwrap();
        fs.try_write_file("/lib/f", 0o644, SystemTime::now(), vec![]).unwrap();
        let err = fs.try_mkdir_all("/lib/f/g/h", 0o755).unwrap_err();
        assert_eq!(err, FsError::not_directory("/lib/f", "mkdir"));
        assert_eq!(fs.root().children().len(), 1);
        assert_eq!(fs.entry("/lib").unwrap().children().len(), 1);
        assert!(fs.entry("/lib/f").unwrap().is_file());
    }

    #[test]
    fn test_mkdir_exact_rules() {
        let mut fs = FileSet::new("m");
        fs.try_mkdir("/d", 0o755).unwrap();
        assert!(matches!(fs.try_mkdir("/d", 0o755), Err(FsError::AlreadyExists { .. })));
        assert!(matches!(fs.try_mkdir("/x/y", 0o755), Err(FsError::NotFound { .. })));
        assert!(matches!(fs.try_mkdir("/", 0o755), Err(FsError::AlreadyExists { .. })));
        fs.try_write_file("/f", 0o644, SystemTime::now(), vec![]).unwrap();
        assert!(matches!(fs.try_mkdir("/f", 0o755), Err(FsError::AlreadyExists { .. })));
        assert!(matches!(fs.try_mkdir("/f/g", 0o755), Err(FsError::NotDirectory { .. })));
    }

    #[test]
    fn test_write_file_rules() {
        let mut fs = FileSet::new("m");
        fs.try_write_file("/a.js", 0o644, SystemTime::now(), b"1".to_vec()).unwrap();
        assert!(matches!(
            fs.try_write_file("/a.js", 0o644, SystemTime::now(), b"2".to_vec()),
            Err(FsError::AlreadyExists { .. })
        ));
        assert!(matches!(
            fs.try_write_gzip_file("/missing/a.js", 0o644, SystemTime::now(), vec![]),
            Err(FsError::NotFound { .. })
        ));
        assert_eq!(read_all(&fs, "/a.js"), "1");
    }

    #[test]
    #[should_panic(expected = "EEXIST")]
    fn test_builder_panics_on_duplicate() {
        let _ = FileSet::new("m").mkdir("/d", 0o755).mkdir("/d", 0o755);
    }

    #[test]
    #[should_panic(expected = "ENOENT")]
    fn test_builder_panics_on_missing_parent() {
        let _ = FileSet::new("m").write_file("/no/such.js", 0o644, SystemTime::now(), vec![]);
    }

    #[test]
    fn test_stat_metadata() {
        let mtime = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_500_000_000);
        let fs = FileSet::new("m").write_file("/a.css", 0o600, mtime, b"body{}".to_vec());
        let info = fs.stat("/a.css").unwrap();
        assert_eq!(info.name, "a.css");
        assert_eq!(info.size, 6);
        assert_eq!(info.mode, 0o600);
        assert_eq!(info.mtime, mtime);
        assert!(!info.is_directory);
        assert_eq!(fs.stat("/").unwrap().name, "/");
    }

    #[test]
    fn test_display() {
        let a = FileSet::new("a").into_module();
        let b = FileSet::with_requires("b", vec![a.clone()]);
        assert_eq!(b.to_string(), "b -> (a)");
        assert_eq!(FileSet::new("solo").to_string(), "solo");
    }
}
