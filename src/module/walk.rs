//! Walking the files of a module.

use tracing::{debug, trace};

use super::Module;
use crate::fs::path::{extension, join};
use crate::fs::{File, FsError};

/// Visit every file of `module` whose extension is exactly `ext` (`".js"`,
/// dot included, case-sensitive).
///
/// Traversal is depth-first from `/`, in listing order, i.e. creation order.
/// Each file is opened just before `visit` and closed right after it returns;
/// directories are descended into, never visited. The first error, from the
/// tree or from `visit`, stops the walk and is returned.
///
/// Requirements of `module` are not walked.
pub fn walk<E, F>(module: &dyn Module, ext: &str, mut visit: F) -> Result<(), E>
where
    E: From<FsError>,
    F: FnMut(&dyn Module, &str, &mut File<'_>) -> Result<(), E>,
{
    walk_dir(module, "/", ext, &mut visit)
}

fn walk_dir<E, F>(module: &dyn Module, dir: &str, ext: &str, visit: &mut F) -> Result<(), E>
where
    E: From<FsError>,
    F: FnMut(&dyn Module, &str, &mut File<'_>) -> Result<(), E>,
{
    trace!(module = module.name(), dir, "enter directory");

    // read the whole listing and close right away to keep few handles open
    let mut handle = module.open(dir)?;
    let listing = handle.read_dir(-1);
    handle.close()?;
    let entries = listing?.unwrap_or_default();

    for info in entries {
        let path = join(dir, &info.name);
        if info.is_directory {
            walk_dir(module, &path, ext, visit)?;
            continue;
        }
        if extension(&info.name) != ext {
            continue;
        }

        debug!(module = module.name(), path = %path, "visit file");
        let mut file = module.open(&path)?;
        let visited = visit(module, &path, &mut file);
        // the handle may already be closed by the visitor
        if !file.is_closed() {
            file.close()?;
        }
        visited?;
    }
    Ok(())
}
