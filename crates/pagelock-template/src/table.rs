//! Immutable template table and its JSON form.

use std::collections::HashMap;
use std::{fs, path::Path};

use crate::{builtin_templates, PageTemplate, TemplateError};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum TemplateIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Exact-key lookup table of page templates.
///
/// Built once and never mutated afterwards. On disk it is a JSON array of
/// templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateTable {
    templates: HashMap<String, PageTemplate>,
}

impl TemplateTable {
    /// Validate every template and index it by key.
    pub fn new(templates: impl IntoIterator<Item = PageTemplate>) -> Result<Self, TemplateError> {
        let mut map = HashMap::new();
        for t in templates {
            t.validate()?;
            if map.contains_key(&t.key) {
                return Err(TemplateError::DuplicateKey(t.key));
            }
            map.insert(t.key.clone(), t);
        }
        log::debug!("template table: {} layouts", map.len());
        Ok(Self { templates: map })
    }

    /// Table with the built-in layouts.
    pub fn builtin() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|t| (t.key.clone(), t))
            .collect();
        Self { templates }
    }

    pub fn get(&self, key: &str) -> Option<&PageTemplate> {
        self.templates.get(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Templates sorted by key.
    pub fn templates(&self) -> Vec<&PageTemplate> {
        self.keys()
            .into_iter()
            .filter_map(|k| self.templates.get(k))
            .collect()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TemplateIoError> {
        let templates: Vec<PageTemplate> = serde_json::from_str(raw)?;
        Ok(Self::new(templates)?)
    }

    /// Load a JSON array of templates from disk.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(path), fields(path = %path.as_ref().display())))]
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TemplateIoError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write the table as pretty JSON, sorted by key.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TemplateIoError> {
        let json = serde_json::to_string_pretty(&self.templates())?;
        fs::write(path, json)?;
        Ok(())
    }
}
