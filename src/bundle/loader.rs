//! Loading real directories into modules.

use std::fs;
use std::io::Write;
use std::path::{Component, Path};

use flate2::write::GzEncoder;
use flate2::Compression;
use regex_lite::Regex;
use tracing::{debug, warn};

use super::error::BundleError;
use crate::fs::path::split_path;
use crate::fs::{FileSet, DIR_MODE, FILE_MODE};
use crate::module::ModuleRef;

/// Default filter: scripts and stylesheets.
pub const DEFAULT_FILTER: &str = r"\.(js|css)$";

/// How a directory is turned into a module.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Matched against the module-relative path, e.g. `/sub/a.js`.
    pub filter: Regex,
    /// Descend into subdirectories, reproducing them in the tree.
    pub recursive: bool,
    /// Store contents gzip-compressed.
    pub compress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            filter: Regex::new(DEFAULT_FILTER).expect("default filter is a valid regex"),
            recursive: false,
            compress: true,
        }
    }
}

/// Build a module named `name` from the files under `dir`.
///
/// Files are added in sorted path order with mode 0644 and their on-disk
/// modification time.
pub fn load_dir(
    dir: &Path,
    name: &str,
    requires: Vec<ModuleRef>,
    options: &LoadOptions,
) -> Result<FileSet, BundleError> {
    let mut set = FileSet::with_requires(name, requires);
    let pattern = if options.recursive { "**/*" } else { "*" };
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut added = 0usize;
    for found in glob::glob(&pattern)? {
        let disk_path = found?;
        let metadata = fs::metadata(&disk_path)?;
        if !metadata.is_file() {
            continue;
        }
        let Some(rel) = relative_path(dir, &disk_path) else {
            continue;
        };
        if !options.filter.is_match(&rel) {
            continue;
        }

        let mut parts = split_path(&rel);
        parts.pop();
        if !parts.is_empty() {
            set.try_mkdir_all(&parts.join("/"), DIR_MODE)?;
        }

        let contents = fs::read(&disk_path)?;
        let mtime = metadata.modified()?;
        if options.compress {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&contents)?;
            let compressed = encoder.finish()?;
            debug!(module = name, path = %rel, raw = contents.len(), compressed = compressed.len(), "add file");
            set.try_write_gzip_file(&rel, FILE_MODE, mtime, compressed)?;
        } else {
            debug!(module = name, path = %rel, raw = contents.len(), "add file");
            set.try_write_file(&rel, FILE_MODE, mtime, contents)?;
        }
        added += 1;
    }

    if added == 0 {
        warn!(module = name, dir = %dir.display(), "no files matched");
    }
    Ok(set)
}

/// `/a/b.js` for `dir/a/b.js`.
fn relative_path(dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(dir).ok()?;
    let mut out = String::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                out.push('/');
                out.push_str(part.to_str()?);
            }
            _ => return None,
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
