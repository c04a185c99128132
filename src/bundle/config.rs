//! Bundle configuration
//!
//! A TOML file declaring which directories become modules and how they
//! depend on each other:
//!
//! ```toml
//! ext = ".js"
//!
//! [[module]]
//! name = "jquery"
//! dir = "vendor/jquery"
//!
//! [[module]]
//! name = "bootstrap"
//! dir = "vendor/bootstrap"
//! requires = ["jquery"]
//! recursive = true
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use serde::Deserialize;

use super::error::BundleError;
use super::loader::{load_dir, LoadOptions, DEFAULT_FILTER};
use crate::module::ModuleRef;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Extension of the files to bundle, dot included.
    #[serde(default = "default_ext")]
    pub ext: String,
    /// Appended after every bundled file.
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleConfig>,
    /// Directory that relative module `dir`s are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One `[[module]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    pub dir: PathBuf,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_compress")]
    pub compress: bool,
}

fn default_ext() -> String {
    ".js".to_string()
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_compress() -> bool {
    true
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            ext: default_ext(),
            separator: default_separator(),
            modules: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl BundleConfig {
    /// Read a config file; module directories are relative to its location.
    pub fn from_file(path: &Path) -> Result<Self, BundleError> {
        let text = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&text, base_dir)
    }

    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, BundleError> {
        let mut config: BundleConfig = toml::from_str(text)?;
        config.base_dir = base_dir;
        config.validate()?;
        Ok(config)
    }

    /// Check names are unique, requirements exist and do not form a cycle.
    pub fn validate(&self) -> Result<(), BundleError> {
        let mut names = HashSet::new();
        for module in &self.modules {
            if !names.insert(module.name.as_str()) {
                return Err(BundleError::config(format!(
                    "duplicate module name '{}'",
                    module.name
                )));
            }
        }
        for module in &self.modules {
            for req in &module.requires {
                if !names.contains(req.as_str()) {
                    return Err(BundleError::config(format!(
                        "module '{}' requires unknown module '{}'",
                        module.name, req
                    )));
                }
            }
        }
        self.build_order().map(|_| ())
    }

    /// Module indices, every module after its requirements.
    fn build_order(&self) -> Result<Vec<usize>, BundleError> {
        let index: HashMap<&str, usize> = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();

        let mut order = Vec::with_capacity(self.modules.len());
        let mut done = vec![false; self.modules.len()];
        let mut visiting = vec![false; self.modules.len()];
        for start in 0..self.modules.len() {
            self.visit(start, &index, &mut done, &mut visiting, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        i: usize,
        index: &HashMap<&str, usize>,
        done: &mut [bool],
        visiting: &mut [bool],
        order: &mut Vec<usize>,
    ) -> Result<(), BundleError> {
        if done[i] {
            return Ok(());
        }
        if visiting[i] {
            return Err(BundleError::config(format!(
                "dependency cycle through module '{}'",
                self.modules[i].name
            )));
        }
        visiting[i] = true;
        for req in &self.modules[i].requires {
            let Some(&r) = index.get(req.as_str()) else {
                return Err(BundleError::config(format!("unknown module '{}'", req)));
            };
            self.visit(r, index, done, visiting, order)?;
        }
        visiting[i] = false;
        done[i] = true;
        order.push(i);
        Ok(())
    }

    /// Load every configured directory, requirements first, and return the
    /// modules in declaration order.
    pub fn build_modules(&self) -> Result<Vec<ModuleRef>, BundleError> {
        let mut built: HashMap<&str, ModuleRef> = HashMap::new();
        for i in self.build_order()? {
            let config = &self.modules[i];
            let requires = config
                .requires
                .iter()
                .filter_map(|name| built.get(name.as_str()).cloned())
                .collect();
            let options = LoadOptions {
                filter: Regex::new(&config.filter)?,
                recursive: config.recursive,
                compress: config.compress,
            };
            let dir = self.base_dir.join(&config.dir);
            let set = load_dir(&dir, &config.name, requires, &options)?;
            built.insert(config.name.as_str(), set.into_module());
        }

        Ok(self
            .modules
            .iter()
            .filter_map(|m| built.get(m.name.as_str()).cloned())
            .collect())
    }
}
