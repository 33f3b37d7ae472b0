//! Source type metadata exposed to the host.

/// Kind of source as the host classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Produces (or, for PTZ Action, stands in for) content inside a scene
    Input,
    /// Applied to another source
    Filter,
    /// Scene transition
    Transition,
    /// A scene itself
    Scene,
}

/// Information about a registered source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Unique type id (e.g., "ptz_action_source")
    pub id: String,
    /// Display name shown in the host's "add source" menu
    pub name: String,
    pub kind: SourceKind,
    pub version: String,
}
