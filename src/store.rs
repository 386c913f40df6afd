//! Rule persistence
//!
//! The rewriter itself never touches storage; the administrative layer
//! consumes this seam. Rule lists are versioned by whole-collection
//! replace-on-save.

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use crate::config::Config;
use crate::rule::Rule;

/// Rule storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read rules: {0}")]
    Read(String),

    #[error("failed to save rules: {0}")]
    Save(String),
}

/// Whole-collection rule storage.
pub trait Store {
    fn get_rules(&self) -> Vec<Rule>;
    fn save_rules(&self, rules: Vec<Rule>) -> Result<(), StoreError>;
}

/// Insert or update a rule, keyed by name or pattern.
///
/// Returns whether the stored list changed; an identical rule is not
/// re-saved.
pub fn set_rule(store: &dyn Store, new_rule: Rule) -> Result<bool, StoreError> {
    let mut rules = store.get_rules();
    let mut found = false;
    let mut changed = false;

    for existing in rules.iter_mut() {
        if existing.name == new_rule.name || existing.pattern == new_rule.pattern {
            if *existing != new_rule {
                *existing = new_rule.clone();
                changed = true;
            }
            found = true;
            break;
        }
    }
    if !found {
        rules.push(new_rule);
        changed = true;
    }
    if changed {
        store.save_rules(rules)?;
    }
    Ok(changed)
}

/// Store backed by the TOML configuration file.
///
/// Saving rewrites the whole file, preserving the non-rule sections.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Config, StoreError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        Config::load_from(&self.path).map_err(|err| StoreError::Read(err.to_string()))
    }
}

impl Store for FileStore {
    fn get_rules(&self) -> Vec<Rule> {
        match self.load() {
            Ok(config) => config.links,
            Err(err) => {
                log::error!("{}", err);
                Vec::new()
            }
        }
    }

    fn save_rules(&self, rules: Vec<Rule>) -> Result<(), StoreError> {
        let mut config = self.load()?;
        config.links = rules;
        let rendered =
            toml::to_string(&config).map_err(|err| StoreError::Save(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::Save(err.to_string()))?;
        }
        std::fs::write(&self.path, rendered).map_err(|err| StoreError::Save(err.to_string()))
    }
}

/// In-memory store for tests and embedding hosts.
#[derive(Default)]
pub struct MemoryStore {
    rules: Mutex<Vec<Rule>>,
}

impl MemoryStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }
}

impl Store for MemoryStore {
    fn get_rules(&self) -> Vec<Rule> {
        match self.rules.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save_rules(&self, rules: Vec<Rule>) -> Result<(), StoreError> {
        match self.rules.lock() {
            Ok(mut guard) => {
                *guard = rules;
                Ok(())
            }
            Err(poisoned) => {
                *poisoned.into_inner() = rules;
                Ok(())
            }
        }
    }
}
