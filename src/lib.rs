//! PTZ Action source for a live-production host.
//!
//! A PTZ Action source placed in a scene recalls a camera preset when that
//! scene becomes the preview scene. `PtzModule` is the module entry point: it
//! loads the camera list, registers the source type and wires the host's
//! event table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config;
pub mod device;
pub mod events;
pub mod host;
pub mod logging;
pub mod plugin;
pub mod properties;
pub mod settings;
pub mod source;
pub mod target;

use config::PluginConfig;
use device::{DeviceConfig, DeviceRegistry, PtzControl, PtzDevice};
use events::{CallbackId, EventDispatcher, SignalHandler};
use host::{Frontend, SourceHandle};
use plugin::SourceTypeRegistry;
use settings::Settings;
use source::{HostContext, PtzActionSource};
use target::CameraTarget;

/// Loaded plugin module.
pub struct PtzModule {
    config_path: PathBuf,
    debug_log_level: i64,
    devices: Arc<DeviceRegistry>,
    target: Arc<CameraTarget>,
    frontend: Arc<dyn Frontend>,
    events: Arc<EventDispatcher>,
    event_callback: Option<CallbackId>,
}

impl PtzModule {
    /// Load the module: read `config_path`, build devices through `factory`,
    /// and register the PTZ Action source type with `types`.
    pub fn load<F>(
        config_path: &Path,
        frontend: Arc<dyn Frontend>,
        events: Arc<EventDispatcher>,
        types: &SourceTypeRegistry,
        factory: F,
    ) -> Self
    where
        F: Fn(&DeviceConfig) -> Option<Box<dyn PtzDevice>>,
    {
        log::info!("PTZ Controls plugin {}", env!("CARGO_PKG_VERSION"));

        let config = config::load_config(config_path).unwrap_or_else(|e| {
            log::warn!("Failed to load PTZ configuration: {:#}", e);
            PluginConfig::default()
        });
        config.apply_debug_level();

        let devices = Arc::new(DeviceRegistry::new());
        let loaded = devices.load_devices(&config.devices, factory);
        log::info!("loaded {} of {} PTZ devices", loaded, config.devices.len());

        let target = Arc::new(CameraTarget::new(config.target_mode));
        let event_callback = {
            let target = Arc::clone(&target);
            let frontend = Arc::clone(&frontend);
            let devices = Arc::clone(&devices);
            events.add_event_callback(Arc::new(move |event| {
                target.handle_frontend_event(event, frontend.as_ref(), &devices);
            }))
        };

        if !plugin::ptz_action_source_load(types) {
            log::warn!("PTZ Action source type could not be registered");
        }

        Self {
            config_path: config_path.to_path_buf(),
            debug_log_level: config.debug_log_level,
            devices,
            target,
            frontend,
            events,
            event_callback: Some(event_callback),
        }
    }

    /// Load using the default config location.
    pub fn load_default<F>(
        frontend: Arc<dyn Frontend>,
        events: Arc<EventDispatcher>,
        types: &SourceTypeRegistry,
        factory: F,
    ) -> anyhow::Result<Self>
    where
        F: Fn(&DeviceConfig) -> Option<Box<dyn PtzDevice>>,
    {
        let Some(path) = config::config_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        Ok(Self::load(&path, frontend, events, types, factory))
    }

    pub fn devices(&self) -> &Arc<DeviceRegistry> {
        &self.devices
    }

    pub fn target(&self) -> &CameraTarget {
        &self.target
    }

    /// Services handed to each PTZ Action source instance.
    pub fn host_context(&self) -> HostContext {
        let ptz: Arc<dyn PtzControl> = self.devices.clone();
        HostContext {
            frontend: Arc::clone(&self.frontend),
            events: Arc::clone(&self.events),
            ptz,
        }
    }

    /// Instantiate a PTZ Action source for a host source object.
    pub fn create_source(
        &self,
        settings: &Settings,
        source: SourceHandle,
        signals: Arc<SignalHandler>,
    ) -> PtzActionSource {
        PtzActionSource::create(settings, source, signals, &self.host_context())
    }

    /// Snapshot of the current configuration, as it would be saved.
    pub fn config(&self) -> PluginConfig {
        PluginConfig {
            debug_log_level: self.debug_log_level,
            target_mode: self.target.mode(),
            devices: self.devices.device_configs(),
        }
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        config::save_config(&self.config_path, &self.config())
    }

    /// Save the configuration and drop every device.
    pub fn unload(mut self) -> anyhow::Result<()> {
        if let Some(id) = self.event_callback.take() {
            self.events.remove_event_callback(id);
        }
        let result = self.save_config();
        self.devices.clear();
        result
    }
}

impl Drop for PtzModule {
    fn drop(&mut self) {
        if let Some(id) = self.event_callback.take() {
            self.events.remove_event_callback(id);
        }
    }
}
