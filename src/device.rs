//! PTZ device registry.
//!
//! Holds the configured cameras in display order. The camera index stored in
//! a PTZ Action source's settings is an index into this list. Talking to the
//! camera itself (VISCA, Pelco, ...) is the job of a `PtzDevice` driver
//! supplied by the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of preset slots every device exposes by default
pub const DEFAULT_PRESET_COUNT: usize = 16;

/// Name given to a device configured with an empty name
const UNNAMED_DEVICE: &str = "Unnamed Device";

/// Entry points into the PTZ control subsystem used by action sources.
pub trait PtzControl: Send + Sync {
    /// Ordered snapshot of every configured camera.
    fn device_configs(&self) -> Vec<DeviceConfig>;

    /// Fire-and-forget preset recall. Unknown cameras are ignored.
    fn preset_recall(&self, camera: u32, preset: u32);
}

/// A named preset slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub id: i64,
    pub name: String,
}

/// Persisted description of one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub presets: Vec<PresetConfig>,
    /// Driver specific settings (port, address, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceConfig {
    pub fn new(name: &str, device_type: &str) -> Self {
        Self {
            name: name.to_string(),
            device_type: device_type.to_string(),
            presets: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Camera driver. Only preset memory is needed by this crate.
pub trait PtzDevice: Send + Sync {
    fn memory_recall(&self, preset: u32);

    fn memory_set(&self, _preset: u32) {}

    fn memory_reset(&self, _preset: u32) {}
}

/// "Preset 1" ... "Preset 16"
pub fn default_preset_names() -> Vec<String> {
    (1..=DEFAULT_PRESET_COUNT).map(|i| format!("Preset {}", i)).collect()
}

/// Apply a config's preset list on top of the default names.
///
/// Ids outside the default slot range are dropped.
fn preset_names_from(presets: &[PresetConfig]) -> Vec<String> {
    let mut names = default_preset_names();
    for preset in presets {
        if let Ok(id) = usize::try_from(preset.id) {
            if let Some(slot) = names.get_mut(id) {
                *slot = preset.name.clone();
            }
        }
    }
    names
}

/// Collapse whitespace runs and trim, the way names typed in a UI field are cleaned.
fn simplify_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Device {
    name: String,
    device_type: String,
    preset_names: Vec<String>,
    extra: Map<String, Value>,
    driver: Arc<dyn PtzDevice>,
}

impl Device {
    fn config(&self) -> DeviceConfig {
        DeviceConfig {
            name: self.name.clone(),
            device_type: self.device_type.clone(),
            presets: self
                .preset_names
                .iter()
                .enumerate()
                .map(|(i, name)| PresetConfig {
                    id: i as i64,
                    name: name.clone(),
                })
                .collect(),
            extra: self.extra.clone(),
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Ordered list of configured cameras.
pub struct DeviceRegistry {
    devices: RwLock<Vec<Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
        }
    }

    /// Append a device built from `config`, returning its index.
    ///
    /// The display name is made unique among the registered devices.
    pub fn add(&self, config: &DeviceConfig, driver: Box<dyn PtzDevice>) -> usize {
        let mut devices = write(&self.devices);
        let name = unique_name(&devices, &config.name, None);
        crate::ptz_debug!("adding {} device '{}'", config.device_type, name);
        devices.push(Device {
            name,
            device_type: config.device_type.clone(),
            preset_names: preset_names_from(&config.presets),
            extra: config.extra.clone(),
            driver: Arc::from(driver),
        });
        devices.len() - 1
    }

    /// Build and register a device for each config.
    ///
    /// `factory` returns `None` for device types it does not know; those
    /// configs are skipped.
    pub fn load_devices<F>(&self, configs: &[DeviceConfig], factory: F) -> usize
    where
        F: Fn(&DeviceConfig) -> Option<Box<dyn PtzDevice>>,
    {
        let mut loaded = 0;
        for config in configs {
            match factory(config) {
                Some(driver) => {
                    self.add(config, driver);
                    loaded += 1;
                }
                None => log::warn!(
                    "skipping PTZ device '{}': unsupported type '{}'",
                    config.name,
                    config.device_type
                ),
            }
        }
        loaded
    }

    pub fn remove(&self, index: usize) -> bool {
        let mut devices = write(&self.devices);
        if index >= devices.len() {
            return false;
        }
        devices.remove(index);
        true
    }

    pub fn clear(&self) {
        write(&self.devices).clear();
    }

    pub fn len(&self) -> usize {
        read(&self.devices).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        read(&self.devices).iter().position(|d| d.name == name)
    }

    pub fn name(&self, index: usize) -> Option<String> {
        read(&self.devices).get(index).map(|d| d.name.clone())
    }

    /// Rename a device, keeping names unique. Returns the name actually used.
    pub fn rename(&self, index: usize, name: &str) -> Option<String> {
        let mut devices = write(&self.devices);
        if index >= devices.len() {
            return None;
        }
        let simplified = simplify_name(name);
        if simplified == devices[index].name {
            return Some(simplified);
        }
        let new_name = unique_name(&devices, &simplified, Some(index));
        devices[index].name = new_name.clone();
        Some(new_name)
    }

    pub fn preset_names(&self, index: usize) -> Option<Vec<String>> {
        read(&self.devices).get(index).map(|d| d.preset_names.clone())
    }

    pub fn set_preset_name(&self, index: usize, preset: usize, name: &str) -> bool {
        let mut devices = write(&self.devices);
        match devices.get_mut(index).and_then(|d| d.preset_names.get_mut(preset)) {
            Some(slot) => {
                *slot = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Store the camera's current position in preset slot `preset`.
    pub fn preset_set(&self, camera: u32, preset: u32) -> bool {
        let Some((name, driver)) = self.driver(camera) else {
            crate::ptz_debug!("preset save ignored: no camera at index {}", camera);
            return false;
        };
        crate::ptz_debug!("saving preset {} on '{}'", preset, name);
        driver.memory_set(preset);
        true
    }

    /// Clear preset slot `preset` and give it back its default name.
    pub fn preset_reset(&self, camera: u32, preset: u32) -> bool {
        let Some((name, driver)) = self.driver(camera) else {
            crate::ptz_debug!("preset reset ignored: no camera at index {}", camera);
            return false;
        };
        crate::ptz_debug!("clearing preset {} on '{}'", preset, name);
        driver.memory_reset(preset);
        let default_name = format!("Preset {}", u64::from(preset) + 1);
        self.set_preset_name(camera as usize, preset as usize, &default_name);
        true
    }

    /// Name and driver of a camera. Drivers are called after the lock is released
    /// so a driver may call back into the registry.
    fn driver(&self, camera: u32) -> Option<(String, Arc<dyn PtzDevice>)> {
        read(&self.devices)
            .get(camera as usize)
            .map(|d| (d.name.clone(), Arc::clone(&d.driver)))
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PtzControl for DeviceRegistry {
    fn device_configs(&self) -> Vec<DeviceConfig> {
        read(&self.devices).iter().map(Device::config).collect()
    }

    fn preset_recall(&self, camera: u32, preset: u32) {
        let Some((name, driver)) = self.driver(camera) else {
            crate::ptz_debug!("preset recall ignored: no camera at index {}", camera);
            return;
        };
        crate::ptz_debug!("recalling preset {} on '{}'", preset, name);
        driver.memory_recall(preset);
    }
}

/// Pick a name not used by any device other than `skip`.
fn unique_name(devices: &[Device], name: &str, skip: Option<usize>) -> String {
    let mut base = simplify_name(name);
    if base.is_empty() {
        base = UNNAMED_DEVICE.to_string();
    }
    let taken = |candidate: &str| {
        devices
            .iter()
            .enumerate()
            .any(|(i, d)| Some(i) != skip && d.name == candidate)
    };

    let mut candidate = base.clone();
    let mut n = 1;
    while taken(&candidate) {
        candidate = format!("{} {}", base, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingDevice {
        recalls: Arc<Mutex<Vec<u32>>>,
        memory: Arc<Mutex<Vec<String>>>,
    }

    impl PtzDevice for RecordingDevice {
        fn memory_recall(&self, preset: u32) {
            self.recalls.lock().unwrap().push(preset);
        }

        fn memory_set(&self, preset: u32) {
            self.memory.lock().unwrap().push(format!("set {}", preset));
        }

        fn memory_reset(&self, preset: u32) {
            self.memory.lock().unwrap().push(format!("reset {}", preset));
        }
    }

    /// Renames its own camera from inside a recall.
    struct SelfRenamingDevice {
        registry: Arc<DeviceRegistry>,
    }

    impl PtzDevice for SelfRenamingDevice {
        fn memory_recall(&self, preset: u32) {
            self.registry.rename(0, &format!("At {}", preset));
            self.registry.set_preset_name(0, preset as usize, "Visited");
        }
    }

    fn visca(name: &str) -> DeviceConfig {
        DeviceConfig::new(name, "visca")
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = DeviceRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.device_configs().is_empty());
    }

    #[test]
    fn default_presets_are_numbered() {
        let names = default_preset_names();
        assert_eq!(names.len(), DEFAULT_PRESET_COUNT);
        assert_eq!(names[0], "Preset 1");
        assert_eq!(names[15], "Preset 16");
    }

    #[test]
    fn config_presets_override_defaults() {
        let mut config = visca("Stage");
        config.presets = vec![
            PresetConfig { id: 0, name: "Wide".into() },
            PresetConfig { id: 3, name: "Pulpit".into() },
            PresetConfig { id: 40, name: "Ignored".into() },
            PresetConfig { id: -1, name: "Ignored".into() },
        ];
        let registry = DeviceRegistry::new();
        registry.add(&config, Box::new(RecordingDevice::default()));

        let names = registry.preset_names(0).expect("device");
        assert_eq!(names.len(), DEFAULT_PRESET_COUNT);
        assert_eq!(names[0], "Wide");
        assert_eq!(names[1], "Preset 2");
        assert_eq!(names[3], "Pulpit");
    }

    #[test]
    fn duplicate_names_are_numbered() {
        let registry = DeviceRegistry::new();
        registry.add(&visca("Cam"), Box::new(RecordingDevice::default()));
        registry.add(&visca("Cam"), Box::new(RecordingDevice::default()));
        registry.add(&visca("  Cam  "), Box::new(RecordingDevice::default()));

        assert_eq!(registry.name(0).as_deref(), Some("Cam"));
        assert_eq!(registry.name(1).as_deref(), Some("Cam 1"));
        assert_eq!(registry.name(2).as_deref(), Some("Cam 2"));
    }

    #[test]
    fn empty_name_becomes_unnamed() {
        let registry = DeviceRegistry::new();
        registry.add(&visca(""), Box::new(RecordingDevice::default()));
        assert_eq!(registry.name(0).as_deref(), Some("Unnamed Device"));
    }

    #[test]
    fn rename_keeps_own_name_available() {
        let registry = DeviceRegistry::new();
        registry.add(&visca("A"), Box::new(RecordingDevice::default()));
        registry.add(&visca("B"), Box::new(RecordingDevice::default()));

        assert_eq!(registry.rename(0, "A").as_deref(), Some("A"));
        assert_eq!(registry.rename(0, "B").as_deref(), Some("B 1"));
        assert_eq!(registry.rename(1, "Side   Cam").as_deref(), Some("Side Cam"));
        assert_eq!(registry.rename(5, "X"), None);
    }

    #[test]
    fn device_configs_list_all_presets() {
        let registry = DeviceRegistry::new();
        let mut config = visca("Stage");
        config.extra.insert("port".into(), Value::from("/dev/ttyUSB0"));
        registry.add(&config, Box::new(RecordingDevice::default()));

        let configs = registry.device_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "Stage");
        assert_eq!(configs[0].device_type, "visca");
        assert_eq!(configs[0].presets.len(), DEFAULT_PRESET_COUNT);
        assert_eq!(configs[0].presets[4], PresetConfig { id: 4, name: "Preset 5".into() });
        assert_eq!(configs[0].extra.get("port"), Some(&Value::from("/dev/ttyUSB0")));
    }

    #[test]
    fn preset_recall_reaches_device() {
        let registry = DeviceRegistry::new();
        let first = RecordingDevice::default();
        let second = RecordingDevice::default();
        let second_recalls = Arc::clone(&second.recalls);
        registry.add(&visca("A"), Box::new(first));
        registry.add(&visca("B"), Box::new(second));

        registry.preset_recall(1, 5);

        assert_eq!(*second_recalls.lock().unwrap(), vec![5]);
    }

    #[test]
    fn preset_recall_out_of_range_is_ignored() {
        let registry = DeviceRegistry::new();
        let device = RecordingDevice::default();
        let recalls = Arc::clone(&device.recalls);
        registry.add(&visca("A"), Box::new(device));

        registry.preset_recall(3, 1);

        assert!(recalls.lock().unwrap().is_empty());
    }

    #[test]
    fn preset_set_and_reset_reach_device() {
        let registry = DeviceRegistry::new();
        let device = RecordingDevice::default();
        let memory = Arc::clone(&device.memory);
        let mut config = visca("A");
        config.presets = vec![PresetConfig { id: 4, name: "Lectern".into() }];
        registry.add(&config, Box::new(device));

        assert!(registry.preset_set(0, 4));
        assert_eq!(registry.preset_names(0).unwrap()[4], "Lectern");
        assert!(registry.preset_reset(0, 4));

        assert_eq!(*memory.lock().unwrap(), vec!["set 4", "reset 4"]);
        assert_eq!(registry.preset_names(0).unwrap()[4], "Preset 5");
    }

    #[test]
    fn preset_set_and_reset_out_of_range() {
        let registry = DeviceRegistry::new();
        let device = RecordingDevice::default();
        let memory = Arc::clone(&device.memory);
        registry.add(&visca("A"), Box::new(device));

        assert!(!registry.preset_set(1, 0));
        assert!(!registry.preset_reset(u32::MAX, 0));
        assert!(memory.lock().unwrap().is_empty());

        // Slot past the named presets: the device is still told, names are untouched
        assert!(registry.preset_reset(0, 40));
        assert_eq!(*memory.lock().unwrap(), vec!["reset 40"]);
        assert_eq!(registry.preset_names(0).unwrap(), default_preset_names());
    }

    #[test]
    fn driver_can_update_registry_during_recall() {
        let registry = Arc::new(DeviceRegistry::new());
        let device = SelfRenamingDevice {
            registry: Arc::clone(&registry),
        };
        registry.add(&visca("Stage"), Box::new(device));

        registry.preset_recall(0, 2);

        assert_eq!(registry.name(0).as_deref(), Some("At 2"));
        assert_eq!(registry.preset_names(0).unwrap()[2], "Visited");
    }

    #[test]
    fn load_devices_skips_unknown_types() {
        let registry = DeviceRegistry::new();
        let configs = vec![visca("A"), DeviceConfig::new("B", "mystery"), visca("C")];

        let loaded = registry.load_devices(&configs, |config| match config.device_type.as_str() {
            "visca" => Some(Box::new(RecordingDevice::default()) as Box<dyn PtzDevice>),
            _ => None,
        });

        assert_eq!(loaded, 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of("C"), Some(1));
    }

    #[test]
    fn remove_and_set_preset_name() {
        let registry = DeviceRegistry::new();
        registry.add(&visca("A"), Box::new(RecordingDevice::default()));
        assert!(registry.set_preset_name(0, 2, "Choir"));
        assert!(!registry.set_preset_name(0, 99, "Nope"));
        assert_eq!(registry.preset_names(0).unwrap()[2], "Choir");

        assert!(registry.remove(0));
        assert!(!registry.remove(0));
        assert!(registry.is_empty());
    }

    #[test]
    fn device_config_parses_with_extra_keys() {
        let json = r#"{"name": "Stage", "type": "visca-over-ip", "address": "10.0.0.5",
                       "presets": [{"id": 1, "name": "Close"}]}"#;
        let config: DeviceConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.device_type, "visca-over-ip");
        assert_eq!(config.presets, vec![PresetConfig { id: 1, name: "Close".into() }]);
        assert_eq!(config.extra.get("address"), Some(&Value::from("10.0.0.5")));
    }
}
