//! Payload -> template lookup.

use std::sync::Arc;

use crate::{PageTemplate, TemplateTable};

/// Resolves decoded marker payloads against a shared template table.
///
/// Matching is exact: no trimming, no case folding. A missing or empty
/// payload never matches.
#[derive(Clone, Debug)]
pub struct TemplateMatcher {
    table: Arc<TemplateTable>,
}

impl TemplateMatcher {
    pub fn new(table: Arc<TemplateTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TemplateTable {
        &self.table
    }

    pub fn try_match(&self, payload: Option<&str>) -> Option<&PageTemplate> {
        match payload {
            Some(key) if !key.is_empty() => self.table.get(key),
            _ => None,
        }
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(Arc::new(TemplateTable::builtin()))
    }
}
