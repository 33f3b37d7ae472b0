//! The PTZ Action source.
//!
//! Dropped into a scene, the source recalls a camera preset whenever that
//! scene becomes the preview scene. It draws nothing; it only carries three
//! settings (camera, action, preset) and reacts to frontend events.

use crate::device::PtzControl;
use crate::events::{
    CallbackId, EventDispatcher, FrontendEvent, SignalHandler, SIGNAL_ACTIVATE, SIGNAL_DEACTIVATE,
    SIGNAL_HIDE,
};
use crate::host::{Frontend, SourceHandle};
use crate::properties::Properties;
use crate::settings::{Settings, KEY_ACTION, KEY_CAMERA, KEY_PRESET};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Type id the source registers under
pub const SOURCE_ID: &str = "ptz_action_source";
/// Display name of the source type
pub const SOURCE_NAME: &str = "PTZ Action";

/// What the source does when its scene is previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtzAction {
    PresetRecall,
}

impl PtzAction {
    pub const ALL: [PtzAction; 1] = [PtzAction::PresetRecall];

    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(PtzAction::PresetRecall),
            _ => None,
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            PtzAction::PresetRecall => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PtzAction::PresetRecall => "Preset Recall",
        }
    }
}

/// The three cached setting values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSettings {
    pub camera: u32,
    pub action: u32,
    pub preset: u32,
}

impl ActionSettings {
    /// Missing keys read as 0. Values are narrowed like an unsigned cast.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            camera: settings.get_int(KEY_CAMERA) as u32,
            action: settings.get_int(KEY_ACTION) as u32,
            preset: settings.get_int(KEY_PRESET) as u32,
        }
    }
}

/// Host services a source instance is wired to.
#[derive(Clone)]
pub struct HostContext {
    pub frontend: Arc<dyn Frontend>,
    pub events: Arc<EventDispatcher>,
    pub ptz: Arc<dyn PtzControl>,
}

/// State shared between the instance and its registered callbacks.
struct ActionContext {
    source: SourceHandle,
    settings: Mutex<ActionSettings>,
    frontend: Arc<dyn Frontend>,
    ptz: Arc<dyn PtzControl>,
}

impl ActionContext {
    fn settings(&self) -> MutexGuard<'_, ActionSettings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handle_frontend_event(&self, event: FrontendEvent) {
        match event {
            FrontendEvent::SceneChanged => {}
            FrontendEvent::PreviewSceneChanged => self.on_preview_scene_changed(),
            _ => {}
        }
    }

    fn on_preview_scene_changed(&self) {
        let Some(preview) = self.frontend.current_preview_scene() else {
            return;
        };
        if !self.frontend.scene_contains(preview, self.source) {
            return;
        }

        let settings = *self.settings();
        // Preset recall is the only action so far; the selector is not consulted.
        crate::ptz_debug!(
            "{:?} previewed: recalling preset {} on camera {} (action {})",
            self.source,
            settings.preset,
            settings.camera,
            settings.action
        );
        self.ptz.preset_recall(settings.camera, settings.preset);
    }

    fn handle_signal(&self, signal: &str) {
        log::trace!("{:?} signal '{}'", self.source, signal);
    }
}

/// One PTZ Action source instance.
///
/// Dropping the instance disconnects every callback it registered.
pub struct PtzActionSource {
    context: Arc<ActionContext>,
    ptz: Arc<dyn PtzControl>,
    events: Arc<EventDispatcher>,
    signals: Arc<SignalHandler>,
    event_callback: Option<CallbackId>,
    signal_callbacks: Vec<CallbackId>,
}

impl PtzActionSource {
    /// Create an instance for `source` and connect its callbacks.
    pub fn create(
        settings: &Settings,
        source: SourceHandle,
        signals: Arc<SignalHandler>,
        host: &HostContext,
    ) -> Self {
        let context = Arc::new(ActionContext {
            source,
            settings: Mutex::new(ActionSettings::from_settings(settings)),
            frontend: Arc::clone(&host.frontend),
            ptz: Arc::clone(&host.ptz),
        });

        let signal_callbacks = [SIGNAL_HIDE, SIGNAL_ACTIVATE, SIGNAL_DEACTIVATE]
            .into_iter()
            .map(|signal| {
                let weak: Weak<ActionContext> = Arc::downgrade(&context);
                signals.connect(
                    signal,
                    Arc::new(move |name: &str| {
                        if let Some(context) = weak.upgrade() {
                            context.handle_signal(name);
                        }
                    }),
                )
            })
            .collect();

        let weak = Arc::downgrade(&context);
        let event_callback = host.events.add_event_callback(Arc::new(move |event| {
            if let Some(context) = weak.upgrade() {
                context.handle_frontend_event(event);
            }
        }));

        Self {
            context,
            ptz: Arc::clone(&host.ptz),
            events: Arc::clone(&host.events),
            signals,
            event_callback: Some(event_callback),
            signal_callbacks,
        }
    }

    /// Replace all three cached values from `settings`.
    pub fn update(&self, settings: &Settings) {
        *self.context.settings() = ActionSettings::from_settings(settings);
    }

    pub fn settings(&self) -> ActionSettings {
        *self.context.settings()
    }

    pub fn camera(&self) -> u32 {
        self.settings().camera
    }

    pub fn action(&self) -> u32 {
        self.settings().action
    }

    pub fn preset(&self) -> u32 {
        self.settings().preset
    }

    pub fn source(&self) -> SourceHandle {
        self.context.source
    }

    /// Deliver a frontend event directly, bypassing the dispatcher.
    pub fn handle_frontend_event(&self, event: FrontendEvent) {
        self.context.handle_frontend_event(event);
    }

    pub fn get_properties(&self) -> Properties {
        build_properties(&self.ptz)
    }

    /// Tear the instance down. Equivalent to dropping it.
    pub fn destroy(self) {}
}

impl Drop for PtzActionSource {
    fn drop(&mut self) {
        if let Some(id) = self.event_callback.take() {
            self.events.remove_event_callback(id);
        }
        for id in self.signal_callbacks.drain(..) {
            self.signals.disconnect(id);
        }
    }
}

/// Settings UI for the source: camera, action and preset selectors.
///
/// The preset list depends on the selected camera and is rebuilt whenever
/// the camera selector changes.
pub fn build_properties(ptz: &Arc<dyn PtzControl>) -> Properties {
    let mut props = Properties::new();

    let cameras = ptz.device_configs();
    let camera_list = props.add_list(KEY_CAMERA, "Camera");
    for (i, config) in cameras.iter().enumerate() {
        camera_list.add_int(&config.name, i as i64);
    }

    let action_list = props.add_list(KEY_ACTION, "Action");
    for action in PtzAction::ALL {
        action_list.add_int(action.label(), action.raw() as i64);
    }

    props.add_list(KEY_PRESET, "Preset");

    let ptz = Arc::clone(ptz);
    props.set_modified_callback(
        KEY_CAMERA,
        Arc::new(move |props: &mut Properties, settings: &Settings| {
            refresh_presets(props, settings, ptz.as_ref())
        }),
    );

    props
}

/// Repopulate the preset list from the camera selected in `settings`.
fn refresh_presets(props: &mut Properties, settings: &Settings, ptz: &dyn PtzControl) -> bool {
    let Some(preset_list) = props.get_mut(KEY_PRESET) else {
        return false;
    };
    preset_list.clear();

    let configs = ptz.device_configs();
    let camera = usize::try_from(settings.get_int(KEY_CAMERA))
        .ok()
        .and_then(|i| configs.get(i));
    if let Some(config) = camera {
        for preset in &config.presets {
            preset_list.add_int(&preset.name, preset.id);
        }
    }
    true
}
