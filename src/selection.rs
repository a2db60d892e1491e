use std::collections::HashMap;

use crate::catalog::{ResolutionKey, ResolutionSpec};
use crate::registry::FileId;

/// Per-file, per-resolution export flags.
///
/// A missing file or key reads as unselected. "All selected" is derived from
/// the catalog rather than stored.
#[derive(Debug)]
pub struct SelectionStore {
    catalog: &'static [ResolutionSpec],
    flags: HashMap<FileId, HashMap<ResolutionKey, bool>>,
}

impl SelectionStore {
    pub fn new(catalog: &'static [ResolutionSpec]) -> Self {
        Self {
            catalog,
            flags: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &'static [ResolutionSpec] {
        self.catalog
    }

    pub fn set_all(&mut self, file: &FileId, selected: bool) {
        let flags = self
            .catalog
            .iter()
            .map(|spec| (spec.key(), selected))
            .collect();
        self.flags.insert(file.clone(), flags);
    }

    pub fn set_one(&mut self, file: &FileId, key: ResolutionKey, selected: bool) {
        self.flags
            .entry(file.clone())
            .or_default()
            .insert(key, selected);
    }

    pub fn is_selected(&self, file: &FileId, key: &ResolutionKey) -> bool {
        self.flags
            .get(file)
            .and_then(|flags| flags.get(key))
            .copied()
            .unwrap_or(false)
    }

    /// True when every catalog entry is selected. False for an empty catalog.
    pub fn is_all_selected(&self, file: &FileId) -> bool {
        !self.catalog.is_empty()
            && self
                .catalog
                .iter()
                .all(|spec| self.is_selected(file, &spec.key()))
    }

    pub fn has_any_selected(&self, file: &FileId) -> bool {
        self.flags
            .get(file)
            .is_some_and(|flags| flags.values().any(|selected| *selected))
    }

    /// Selected resolutions in catalog order.
    pub fn selected_specs(&self, file: &FileId) -> Vec<ResolutionSpec> {
        self.catalog
            .iter()
            .filter(|spec| self.is_selected(file, &spec.key()))
            .copied()
            .collect()
    }

    pub fn forget(&mut self, file: &FileId) {
        self.flags.remove(file);
    }
}
