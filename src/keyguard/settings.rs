//! Lock screen settings and change tracking
//!
//! Settings live in an external key-value store (Android `Settings.System`
//! style). The bridge re-derives the whole snapshot on every change
//! notification instead of applying deltas, so any number of queued
//! notifications collapse into one refresh.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::dispatch::TargetSetId;
use super::layout::LayoutStyle;
use crate::error::{Error, Result};

pub const COLOR_WHITE: u32 = 0xFFFF_FFFF;

/// Keys the lock screen reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Targets,
    Layout,
    CustomTextColor,
    CustomUpperLeftIntent,
    CustomUpperRightIntent,
    CustomLowerLeftIntent,
    CustomLowerRightIntent,
    CustomSmsIntent,
    VibrateInSilent,
    MenuUnlockScreen,
    DisableCamera,
}

impl SettingKey {
    /// Keys whose change requires a full refresh of the lock screen
    pub const OBSERVED: [SettingKey; 3] = [
        SettingKey::Targets,
        SettingKey::Layout,
        SettingKey::CustomTextColor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Targets => "lockscreen_targets",
            SettingKey::Layout => "lockscreen_layout",
            SettingKey::CustomTextColor => "lockscreen_custom_text_color",
            SettingKey::CustomUpperLeftIntent => "lockscreen_custom_upper_left_intent",
            SettingKey::CustomUpperRightIntent => "lockscreen_custom_upper_right_intent",
            SettingKey::CustomLowerLeftIntent => "lockscreen_custom_lower_left_intent",
            SettingKey::CustomLowerRightIntent => "lockscreen_custom_lower_right_intent",
            SettingKey::CustomSmsIntent => "lockscreen_custom_sms_intent",
            SettingKey::VibrateInSilent => "vibrate_in_silent",
            SettingKey::MenuUnlockScreen => "menu_unlock_screen",
            SettingKey::DisableCamera => "lockscreen_disable_camera",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [SettingKey; 11] = [
            SettingKey::Targets,
            SettingKey::Layout,
            SettingKey::CustomTextColor,
            SettingKey::CustomUpperLeftIntent,
            SettingKey::CustomUpperRightIntent,
            SettingKey::CustomLowerLeftIntent,
            SettingKey::CustomLowerRightIntent,
            SettingKey::CustomSmsIntent,
            SettingKey::VibrateInSilent,
            SettingKey::MenuUnlockScreen,
            SettingKey::DisableCamera,
        ];
        ALL.into_iter().find(|key| key.name() == name)
    }

    pub fn is_observed(self) -> bool {
        Self::OBSERVED.contains(&self)
    }

    /// Keys whose change makes the shown widget art stale. The camera
    /// policy is not observed but still picks the target art.
    pub fn affects_presentation(self) -> bool {
        self.is_observed() || self == SettingKey::DisableCamera
    }
}

/// Read access to the external settings store
pub trait SettingsStore {
    fn get_int(&self, key: SettingKey) -> Option<i64>;
    fn get_string(&self, key: SettingKey) -> Option<String>;

    fn get_int_or(&self, key: SettingKey, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    fn get_flag(&self, key: SettingKey, default: bool) -> bool {
        self.get_int_or(key, default as i64) == 1
    }
}

/// Snapshot of the settings that shape the lock screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    pub targets: TargetSetId,
    pub layout: LayoutStyle,
    /// ARGB colour for clock and status text
    pub text_color: u32,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            targets: TargetSetId::Stock,
            layout: LayoutStyle::Stock,
            text_color: COLOR_WHITE,
        }
    }
}

impl LockSettings {
    pub fn load(store: &dyn SettingsStore) -> Self {
        let targets = match store.get_int(SettingKey::Targets) {
            None => TargetSetId::default(),
            Some(raw) => TargetSetId::from_setting(raw).unwrap_or_else(|| {
                warn!("Unknown lockscreen target set {}, using stock", raw);
                TargetSetId::default()
            }),
        };
        let layout = match store.get_int(SettingKey::Layout) {
            None => LayoutStyle::default(),
            Some(raw) => LayoutStyle::from_setting(raw).unwrap_or_else(|| {
                warn!("Unknown lockscreen layout {}, using stock", raw);
                LayoutStyle::default()
            }),
        };
        // Stored as a signed 32-bit int, so white may arrive as -1
        let text_color = store
            .get_int(SettingKey::CustomTextColor)
            .map(|raw| raw as u32)
            .unwrap_or(COLOR_WHITE);

        Self {
            targets,
            layout,
            text_color,
        }
    }
}

/// Coalesces change notifications into full re-derivations
#[derive(Debug, Default)]
pub struct SettingsBridge {
    current: LockSettings,
    pending: bool,
    refreshes: u64,
}

impl SettingsBridge {
    pub fn new(store: &dyn SettingsStore) -> Self {
        Self {
            current: LockSettings::load(store),
            pending: false,
            refreshes: 1,
        }
    }

    pub fn current(&self) -> LockSettings {
        self.current
    }

    /// Record a change notification; nothing is read until `flush`
    pub fn notify(&mut self) {
        self.pending = true;
    }

    /// Re-derive if any notification arrived since the last flush
    pub fn flush(&mut self, store: &dyn SettingsStore) -> Option<LockSettings> {
        if !self.pending {
            return None;
        }
        Some(self.refresh(store))
    }

    /// Unconditionally re-derive from the store
    pub fn refresh(&mut self, store: &dyn SettingsStore) -> LockSettings {
        self.pending = false;
        self.refreshes += 1;
        let settings = LockSettings::load(store);
        if settings != self.current {
            debug!(?settings, "Lock screen settings changed");
        }
        self.current = settings;
        settings
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }
}

/// In-memory store, used by tests and as a fallback when no file is present
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<HashMap<SettingKey, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_int(&self, key: SettingKey, value: i64) {
        self.values.borrow_mut().insert(key, Value::from(value));
    }

    pub fn put_string(&self, key: SettingKey, value: &str) {
        self.values.borrow_mut().insert(key, Value::from(value));
    }

    pub fn remove(&self, key: SettingKey) {
        self.values.borrow_mut().remove(&key);
    }
}

impl SettingsStore for MemorySettings {
    fn get_int(&self, key: SettingKey) -> Option<i64> {
        self.values.borrow().get(&key).and_then(value_as_int)
    }

    fn get_string(&self, key: SettingKey) -> Option<String> {
        self.values.borrow().get(&key).and_then(value_as_string)
    }
}

/// JSON file backed store (`~/.local/state/flick/lockscreen.json`)
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: RefCell<serde_json::Map<String, Value>>,
    modified: RefCell<Option<SystemTime>>,
}

impl FileSettings {
    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".local/state/flick/lockscreen.json"))
    }

    /// Open the store; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            values: RefCell::new(serde_json::Map::new()),
            modified: RefCell::new(None),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file from disk
    pub fn reload(&self) -> Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No lock screen settings at {:?}, using defaults", self.path);
                self.values.borrow_mut().clear();
                *self.modified.borrow_mut() = None;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let parsed: Value = serde_json::from_str(&contents)?;
        let Value::Object(map) = parsed else {
            return Err(Error::Settings(format!(
                "{:?} must contain a JSON object",
                self.path
            )));
        };

        *self.values.borrow_mut() = map;
        *self.modified.borrow_mut() = self.disk_modified();
        info!("Loaded lock screen settings from {:?}", self.path);
        Ok(())
    }

    /// True if the file changed on disk since the last reload
    pub fn changed_on_disk(&self) -> bool {
        self.disk_modified() != *self.modified.borrow()
    }

    fn disk_modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    pub fn put(&self, key: SettingKey, value: Value) {
        self.values.borrow_mut().insert(key.name().to_string(), value);
    }

    pub fn remove(&self, key: SettingKey) {
        self.values.borrow_mut().remove(key.name());
    }

    /// Write the current values back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.values.borrow())?;
        fs::write(&self.path, json)?;
        *self.modified.borrow_mut() = self.disk_modified();
        info!("Saved lock screen settings to {:?}", self.path);
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_int(&self, key: SettingKey) -> Option<i64> {
        self.values.borrow().get(key.name()).and_then(value_as_int)
    }

    fn get_string(&self, key: SettingKey) -> Option<String> {
        self.values.borrow().get(key.name()).and_then(value_as_string)
    }
}

fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Bool(b) => Some(*b as i64),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
