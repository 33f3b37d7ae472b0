//! Current camera selection that follows scene changes.
//!
//! In preview mode, previewing a scene whose name matches a camera's name
//! selects that camera; in program mode the live scene does the same. Manual
//! mode leaves the selection alone.

use crate::config::TargetMode;
use crate::device::DeviceRegistry;
use crate::events::FrontendEvent;
use crate::host::Frontend;
use std::sync::Mutex;

pub struct CameraTarget {
    mode: Mutex<TargetMode>,
    current: Mutex<Option<usize>>,
}

impl CameraTarget {
    pub fn new(mode: TargetMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            current: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> TargetMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Index of the selected camera, if any.
    pub fn current(&self) -> Option<usize> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_current(&self, index: Option<usize>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = index;
    }

    /// Update the selection for a frontend event. Returns the newly selected
    /// camera when the event changed it.
    pub fn handle_frontend_event(
        &self,
        event: FrontendEvent,
        frontend: &dyn Frontend,
        devices: &DeviceRegistry,
    ) -> Option<usize> {
        let scene = match (event, self.mode()) {
            (FrontendEvent::SceneChanged, TargetMode::Program) => frontend.current_program_scene(),
            (FrontendEvent::PreviewSceneChanged, TargetMode::Preview) => {
                frontend.current_preview_scene()
            }
            _ => None,
        }?;

        let name = frontend.scene_name(scene)?;
        let index = devices.index_of(&name)?;
        crate::ptz_debug!("scene '{}' selects camera {}", name, index);
        self.set_current(Some(index));
        Some(index)
    }
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self::new(TargetMode::default())
    }
}
