//! Module dependency resolution.

use tracing::{debug, trace};

use super::{ModuleList, ModuleRef};

/// Flatten `modules` and everything they require into one list where every
/// module comes after all of its requirements.
///
/// The input order does not matter: modules are visited sorted by name, so
/// the same set always resolves to the same list. A module shared by several
/// dependents appears once, at the position of its first use. Resolving a
/// resolved list returns it unchanged.
///
/// Requirements must form a DAG. A cycle recurses without bound.
pub fn resolve<I>(modules: I) -> ModuleList
where
    I: IntoIterator<Item = ModuleRef>,
{
    let resolved = resolve_all(modules.into_iter().collect());
    debug!(modules = ?resolved.names(), "resolved module list");
    resolved
}

fn resolve_all(mut modules: Vec<ModuleRef>) -> ModuleList {
    // stable sort; equal names keep caller order
    modules.sort_by(|a, b| a.name().cmp(b.name()));

    let mut resolved = ModuleList::new();
    for module in modules {
        let requires = resolve_all(module.requires().to_vec());
        for req in requires {
            push_unique(&mut resolved, req);
        }
        push_unique(&mut resolved, module);
    }
    resolved
}

fn push_unique(list: &mut ModuleList, module: ModuleRef) {
    if !list.contains(module.name()) {
        trace!(module = module.name(), position = list.len(), "append module");
        list.push(module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSet;
    use std::time::SystemTime;

    fn module(name: &str, requires: Vec<ModuleRef>) -> ModuleRef {
        let file = format!("/{}.js", name);
        let body = format!("/* {}.js */", name);
        FileSet::with_requires(name, requires)
            .write_file(&file, 0o644, SystemTime::now(), body.into_bytes())
            .into_module()
    }

    #[test]
    fn test_resolve_chain() {
        let a = module("a", vec![]);
        let b = module("b", vec![a.clone()]);
        let c = module("c", vec![b.clone()]);

        for input in [vec![c.clone()], vec![c.clone(), b.clone()], vec![c.clone(), b.clone(), a.clone()]] {
            let resolved = resolve(input);
            assert_eq!(resolved.names(), vec!["a", "b", "c"]);
        }
        assert_eq!(
            resolve(vec![c]).to_string(),
            "a\nb -> (a)\nc -> (b -> (a))"
        );
    }

    #[test]
    fn test_resolve_shared_dependency_ordered_by_name() {
        let a = module("a", vec![]);
        let b = module("b", vec![a.clone()]);
        let c = module("c", vec![a.clone()]);

        let resolved = resolve(vec![c.clone(), b.clone()]);
        assert_eq!(resolved.to_string(), "a\nb -> (a)\nc -> (a)");
        assert_eq!(resolve(vec![b, c]).names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resolve_diamond() {
        let a = module("a", vec![]);
        let b = module("b", vec![a.clone()]);
        let c = module("c", vec![a.clone()]);
        let d = module("d", vec![b, c]);

        let resolved = resolve(vec![d]);
        assert_eq!(
            resolved.to_string(),
            "a\nb -> (a)\nc -> (a)\nd -> (b -> (a), c -> (a))"
        );
    }

    #[test]
    fn test_resolve_requires_sorted_too() {
        let z = module("z", vec![]);
        let y = module("y", vec![]);
        let top = module("top", vec![z, y]);
        assert_eq!(resolve(vec![top]).names(), vec!["y", "z", "top"]);
    }

    #[test]
    fn test_resolve_empty_and_leaf() {
        assert!(resolve(Vec::new()).is_empty());
        let solo = module("solo", vec![]);
        assert_eq!(resolve(vec![solo]).names(), vec!["solo"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let a = module("a", vec![]);
        let b = module("b", vec![a.clone()]);
        let c = module("c", vec![a.clone()]);
        let d = module("d", vec![b, c]);

        let once = resolve(vec![d]);
        let twice = resolve(once.clone());
        assert_eq!(once.names(), twice.names());
    }

    #[test]
    fn test_resolve_dedups_by_name() {
        let first = module("a", vec![]);
        let second = module("a", vec![]);
        let resolved = resolve(vec![first.clone(), second]);
        assert_eq!(resolved.len(), 1);
        assert!(std::sync::Arc::ptr_eq(resolved.named("a").unwrap(), &first));
    }
}
