//! webresource - dependency-aware static asset modules
//!
//! Scripts, stylesheets and similar files are packaged as modules: a name,
//! an in-memory file tree and the modules it requires. An application
//! collects the modules it uses, resolves them into one dependency-ordered
//! list and walks their files, e.g. to concatenate every `.js` file.
//!
//! ```
//! use std::time::SystemTime;
//! use std::io::Read;
//! use webresource::{resolve, FileSet, FsError};
//!
//! let jquery = FileSet::new("jquery")
//!     .write_file("/jquery.js", 0o644, SystemTime::now(), b"/* jquery */".to_vec())
//!     .into_module();
//! let app = FileSet::with_requires("app", vec![jquery])
//!     .write_file("/app.js", 0o644, SystemTime::now(), b"/* app */".to_vec())
//!     .into_module();
//!
//! let mut js = String::new();
//! resolve(vec![app])
//!     .walk(".js", |_, _, file| -> Result<(), FsError> {
//!         file.read_to_string(&mut js).unwrap();
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(js, "/* jquery *//* app */");
//! ```

pub mod bundle;
pub mod fs;
pub mod module;

pub use bundle::{Bundle, BundleConfig, BundleError};
pub use fs::{File, FileInfo, FileSet, FsError};
pub use module::{resolve, walk, FileSystem, Module, ModuleList, ModuleRef};
