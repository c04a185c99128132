//! Bundling
//!
//! Turns a configuration of on-disk directories into modules, resolves them
//! and concatenates their files into one payload, the way an asset server
//! would serve `/combined.js`.

pub mod config;
pub mod error;
pub mod loader;

use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tracing::info;

use crate::module::ModuleList;

pub use config::{BundleConfig, ModuleConfig};
pub use error::BundleError;
pub use loader::{load_dir, LoadOptions};

/// One file that went into a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundledFile {
    pub module: String,
    pub path: String,
    pub size: u64,
}

/// Concatenated contents of every walked file.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    content: Vec<u8>,
    files: Vec<BundledFile>,
    mtime: Option<SystemTime>,
}

impl Bundle {
    /// Walk `modules` in order, appending each file with extension `ext`
    /// followed by `separator`.
    pub fn collect(modules: &ModuleList, ext: &str, separator: &str) -> Result<Self, BundleError> {
        let mut bundle = Bundle::default();
        modules.walk(ext, |module, path, file| -> Result<(), BundleError> {
            let stat = file.stat()?;
            let start = bundle.content.len();
            file.read_to_end(&mut bundle.content)?;
            bundle.content.extend_from_slice(separator.as_bytes());

            if bundle.mtime.map_or(true, |newest| stat.mtime > newest) {
                bundle.mtime = Some(stat.mtime);
            }
            bundle.files.push(BundledFile {
                module: module.name().to_string(),
                path: path.to_string(),
                size: (bundle.content.len() - start - separator.len()) as u64,
            });
            Ok(())
        })?;

        info!(
            ext,
            files = bundle.files.len(),
            bytes = bundle.content.len(),
            "bundle collected"
        );
        Ok(bundle)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    pub fn files(&self) -> &[BundledFile] {
        &self.files
    }

    /// Newest modification time among the bundled files.
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    /// Unix seconds of [`Bundle::mtime`], `"0"` for an empty bundle. Changes
    /// whenever a newer file is bundled, so it works as a cache-busting
    /// query value.
    pub fn cache_key(&self) -> String {
        let secs = self
            .mtime
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        secs.to_string()
    }

    /// Gzip-compressed content.
    pub fn gzip(&self) -> Result<Vec<u8>, BundleError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.content)?;
        Ok(encoder.finish()?)
    }

    pub fn summary(&self, modules: &ModuleList) -> BundleSummary {
        BundleSummary {
            modules: modules.names().into_iter().map(str::to_string).collect(),
            files: self.files.clone(),
            bytes: self.content.len(),
            cache_key: self.cache_key(),
            mod_time: self.mtime.map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
        }
    }
}

/// Machine-readable description of a bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSummary {
    pub modules: Vec<String>,
    pub files: Vec<BundledFile>,
    pub bytes: usize,
    pub cache_key: String,
    pub mod_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSet;
    use crate::module::resolve;
    use flate2::read::GzDecoder;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn modules() -> ModuleList {
        let a = FileSet::new("a")
            .write_file("/a.js", 0o644, at(100), b"var a;".to_vec())
            .write_file("/a.css", 0o644, at(900), b"a{}".to_vec())
            .into_module();
        let b = FileSet::with_requires("b", vec![a])
            .mkdir("/lib", 0o755)
            .write_file("/lib/b.js", 0o644, at(300), b"var b;".to_vec())
            .into_module();
        resolve(vec![b])
    }

    #[test]
    fn test_collect_js() {
        let list = modules();
        let bundle = Bundle::collect(&list, ".js", "\n").unwrap();
        assert_eq!(bundle.content(), b"var a;\nvar b;\n");
        assert_eq!(bundle.cache_key(), "300");
        assert_eq!(
            bundle.files(),
            &[
                BundledFile { module: "a".into(), path: "/a.js".into(), size: 6 },
                BundledFile { module: "b".into(), path: "/lib/b.js".into(), size: 6 },
            ]
        );
    }

    #[test]
    fn test_collect_empty() {
        let bundle = Bundle::collect(&modules(), ".png", "\n").unwrap();
        assert!(bundle.content().is_empty());
        assert_eq!(bundle.cache_key(), "0");
        assert!(bundle.mtime().is_none());
    }

    #[test]
    fn test_gzip_round_trip() {
        let bundle = Bundle::collect(&modules(), ".css", "").unwrap();
        let mut out = Vec::new();
        GzDecoder::new(bundle.gzip().unwrap().as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"a{}");
    }

    #[test]
    fn test_summary_json() {
        let list = modules();
        let bundle = Bundle::collect(&list, ".js", "\n").unwrap();
        let json = serde_json::to_value(bundle.summary(&list)).unwrap();
        assert_eq!(json["modules"], serde_json::json!(["a", "b"]));
        assert_eq!(json["cacheKey"], "300");
        assert_eq!(json["bytes"], 14);
        assert_eq!(json["modTime"], "1970-01-01T00:05:00+00:00");
        assert_eq!(json["files"][1]["path"], "/lib/b.js");
    }
}
