//! Host-side registry of source types.

use super::{SourceInfo, SourceType};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Central registry of source types, keyed by type id.
pub struct SourceTypeRegistry {
    types: RwLock<BTreeMap<String, Box<dyn SourceType>>>,
}

impl SourceTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a source type. Returns `false` if the id is already taken.
    pub fn register(&self, source_type: Box<dyn SourceType>) -> bool {
        let id = source_type.id().to_string();
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        if types.contains_key(&id) {
            log::warn!("source type '{}' is already registered", id);
            return false;
        }
        log::info!("registered source type '{}' ({})", id, source_type.name());
        types.insert(id, source_type);
        true
    }

    pub fn unregister(&self, id: &str) -> bool {
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        types.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<SourceInfo> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.get(id).map(|t| info(t.as_ref()))
    }

    /// Information about every registered type, ordered by id.
    pub fn get_types(&self) -> Vec<SourceInfo> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.values().map(|t| info(t.as_ref())).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.keys().cloned().collect()
    }
}

impl Default for SourceTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn info(source_type: &dyn SourceType) -> SourceInfo {
    SourceInfo {
        id: source_type.id().to_string(),
        name: source_type.name().to_string(),
        kind: source_type.kind(),
        version: source_type.version().to_string(),
    }
}
