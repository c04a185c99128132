//! File System Module
//!
//! The in-memory virtual file tree backing each module:
//! - FileSet: the tree, its builder and lookup
//! - File: an opened entry (reader or directory cursor)

pub mod file;
pub mod file_set;
pub mod path;
pub mod types;

pub use file::File;
pub use file_set::FileSet;
pub use types::*;
