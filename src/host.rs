//! Capabilities the host application provides to the plugin.
//!
//! Scenes and sources belong to the host. The plugin only ever sees opaque
//! handles for them, valid for the duration of the callback that received them.

/// Opaque identity of a host source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub u64);

/// Opaque identity of a host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

/// Frontend queries used when reacting to scene changes.
pub trait Frontend: Send + Sync {
    /// Scene currently staged in the preview, if the host has one.
    fn current_preview_scene(&self) -> Option<SceneHandle>;

    /// Whether `source` appears as an item in `scene`.
    fn scene_contains(&self, scene: SceneHandle, source: SourceHandle) -> bool;

    /// Scene currently live on the program output.
    fn current_program_scene(&self) -> Option<SceneHandle> {
        None
    }

    fn scene_name(&self, _scene: SceneHandle) -> Option<String> {
        None
    }
}
