//! Modules
//!
//! A module is a named, read-only file system plus the modules it requires.
//! [`resolve`] flattens a set of modules into a [`ModuleList`], and
//! [`walk`] visits the files of one module in tree order.

pub mod resolve;
pub mod walk;

use std::fmt;
use std::sync::Arc;

use crate::fs::{File, FsError};

pub use resolve::resolve;
pub use walk::walk;

/// Read access to a tree of files.
pub trait FileSystem {
    /// Open the entry at `path`. Paths are always taken as absolute.
    fn open(&self, path: &str) -> Result<File<'_>, FsError>;
}

/// A named bundle of assets and the modules it depends on.
///
/// The name is the module's identity: the resolver treats two modules with
/// the same name as the same module.
pub trait Module: FileSystem + Send + Sync {
    fn name(&self) -> &str;

    /// Direct requirements, in declaration order.
    fn requires(&self) -> &[ModuleRef];
}

/// Shared handle to a module.
pub type ModuleRef = Arc<dyn Module>;

/// Render `name` or `name -> (req, req)`, requirements rendered recursively.
pub(crate) fn fmt_module(module: &dyn Module, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", module.name())?;
    let requires = module.requires();
    if requires.is_empty() {
        return Ok(());
    }
    write!(f, " -> (")?;
    for (i, req) in requires.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_module(req.as_ref(), f)?;
    }
    write!(f, ")")
}

impl fmt::Display for dyn Module + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_module(self, f)
    }
}

impl fmt::Debug for dyn Module + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({:?})", self.name())
    }
}

/// Modules in dependency order, without duplicate names.
#[derive(Debug, Clone, Default)]
pub struct ModuleList {
    modules: Vec<ModuleRef>,
}

impl ModuleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first module with the given name.
    pub fn named(&self, name: &str) -> Option<&ModuleRef> {
        self.iter().find(|m| m.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleRef> {
        self.modules.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|m| m.name()).collect()
    }

    pub(crate) fn push(&mut self, module: ModuleRef) {
        self.modules.push(module);
    }

    /// Visit every file with extension `ext` in every module, in list order.
    ///
    /// Requirements are not followed; resolve the list first. Stops at the
    /// first error, from the tree or from `visit`.
    pub fn walk<E, F>(&self, ext: &str, mut visit: F) -> Result<(), E>
    where
        E: From<FsError>,
        F: FnMut(&dyn Module, &str, &mut File<'_>) -> Result<(), E>,
    {
        for module in &self.modules {
            walk(module.as_ref(), ext, &mut visit)?;
        }
        Ok(())
    }
}

impl FromIterator<ModuleRef> for ModuleList {
    fn from_iter<I: IntoIterator<Item = ModuleRef>>(iter: I) -> Self {
        ModuleList {
            modules: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ModuleRef>> for ModuleList {
    fn from(modules: Vec<ModuleRef>) -> Self {
        ModuleList { modules }
    }
}

impl IntoIterator for ModuleList {
    type Item = ModuleRef;
    type IntoIter = std::vec::IntoIter<ModuleRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModuleList {
    type Item = &'a ModuleRef;
    type IntoIter = std::slice::Iter<'a, ModuleRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One module per line.
impl fmt::Display for ModuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, module) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            fmt_module(module.as_ref(), f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSet;

    #[test]
    fn test_display_nested() {
        let a = FileSet::new("a").into_module();
        let b = FileSet::with_requires("b", vec![a.clone()]).into_module();
        let c = FileSet::with_requires("c", vec![a.clone()]).into_module();
        let d = FileSet::with_requires("d", vec![b.clone(), c.clone()]).into_module();
        assert_eq!(d.to_string(), "d -> (b -> (a), c -> (a))");

        let list: ModuleList = vec![a, b, c, d].into();
        assert_eq!(list.to_string(), "a\nb -> (a)\nc -> (a)\nd -> (b -> (a), c -> (a))");
    }

    #[test]
    fn test_named() {
        let list: ModuleList = vec![FileSet::new("x").into_module(), FileSet::new("y").into_module()]
            .into_iter()
            .collect();
        assert_eq!(list.named("y").map(|m| m.name()), Some("y"));
        assert!(list.named("z").is_none());
        assert!(list.contains("x"));
        assert_eq!(list.names(), vec!["x", "y"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_iter_keeps_list_order() {
        let a = FileSet::new("a").into_module();
        let b = FileSet::with_requires("b", vec![a.clone()]).into_module();
        let list: ModuleList = vec![a.clone(), b].into();
        let by_iter: Vec<&str> = list.iter().map(|m| m.name()).collect();
        let by_ref: Vec<&str> = (&list).into_iter().map(|m| m.name()).collect();
        assert_eq!(by_iter, vec!["a", "b"]);
        assert_eq!(by_iter, by_ref);
        assert!(std::sync::Arc::ptr_eq(list.iter().next().unwrap(), &a));
    }

    #[test]
    fn test_empty_list_display() {
        assert_eq!(ModuleList::new().to_string(), "");
        assert!(ModuleList::new().is_empty());
    }
}
