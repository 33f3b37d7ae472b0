//! Source type registration.
//!
//! The host keeps a registry of source types keyed by id. A plugin module
//! exposes its types by registering a `SourceType` implementation at load.

pub mod registry;
pub mod types;

pub use registry::SourceTypeRegistry;
pub use types::{SourceInfo, SourceKind};

use crate::source::{SOURCE_ID, SOURCE_NAME};

/// Trait implemented by every source type the module provides.
pub trait SourceType: Send + Sync {
    /// Unique type id (e.g., "ptz_action_source")
    fn id(&self) -> &'static str;

    /// Human-readable name for the host UI
    fn name(&self) -> &'static str;

    fn kind(&self) -> SourceKind;

    /// Type version string (default: crate version)
    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

/// The PTZ Action source type.
pub struct PtzActionSourceType;

impl SourceType for PtzActionSourceType {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Input
    }
}

/// Expose the PTZ Action source type to the host.
///
/// Returns `false` if a type with the same id is already registered.
pub fn ptz_action_source_load(registry: &SourceTypeRegistry) -> bool {
    registry.register(Box::new(PtzActionSourceType))
}
