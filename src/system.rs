//! System integration - the collaborators the lock screen drives
//!
//! Provides:
//! - Ringer mode control (pactl-backed on real hardware)
//! - Application launching (shell commands mapped from intent targets)
//! - Device environment queries (camera policy, menu-key overrides, bypass)
//! - Deferred one-shot task scheduling

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::keyguard::intent::IntentDescriptor;
use crate::keyguard::settings::{SettingKey, SettingsStore};

/// Presence of this file re-enables menu-key unlock on devices that disable it
pub const ENABLE_MENU_KEY_FILE: &str = "/data/local/enable_menu_key";

/// Audio ringer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingerMode {
    Normal,
    Vibrate,
    Silent,
}

impl RingerMode {
    pub fn is_silent(self) -> bool {
        self != RingerMode::Normal
    }
}

/// Read/write access to the audio ringer
pub trait Ringer {
    fn ringer_mode(&self) -> RingerMode;
    fn set_ringer_mode(&mut self, mode: RingerMode);
}

/// Starts external applications
pub trait AppLauncher {
    fn launch(&mut self, target: &IntentDescriptor) -> Result<()>;
}

/// Device state the lock screen queries but never owns
pub trait DeviceEnvironment {
    /// Camera disabled by device policy; read on every dispatch
    fn camera_disabled(&self) -> bool;
    fn menu_key_disabled_by_config(&self) -> bool;
    fn running_in_test_harness(&self) -> bool;
    fn menu_key_override_present(&self) -> bool;
    fn keyguard_bypass_enabled(&self) -> bool;
}

/// Work the lock screen defers to a one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Ask the host for the unlock screen once the trigger animation is done
    RequestUnlock,
    /// Play the idle hint animation after the screen comes up
    IdlePing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// One-shot, cancellable timers on the lock screen's event loop
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, task: DeferredTask) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Scheduler backed by calloop timer sources.
///
/// `fire` is called with the loop data when a timer expires; cancelled
/// timers are removed from the loop before they can fire.
pub struct LoopScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    tokens: Rc<RefCell<HashMap<TimerId, RegistrationToken>>>,
    next_id: u64,
    fire: fn(&mut D, TimerId, DeferredTask),
}

impl<D: 'static> LoopScheduler<D> {
    pub fn new(handle: LoopHandle<'static, D>, fire: fn(&mut D, TimerId, DeferredTask)) -> Self {
        Self {
            handle,
            tokens: Rc::new(RefCell::new(HashMap::new())),
            next_id: 0,
            fire,
        }
    }

    pub fn pending(&self) -> usize {
        self.tokens.borrow().len()
    }
}

impl<D: 'static> Scheduler for LoopScheduler<D> {
    fn schedule(&mut self, delay: Duration, task: DeferredTask) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tokens = self.tokens.clone();
        let fire = self.fire;

        let inserted = self
            .handle
            .insert_source(Timer::from_duration(delay), move |_, _, data| {
                tokens.borrow_mut().remove(&id);
                fire(data, id, task);
                TimeoutAction::Drop
            });
        match inserted {
            Ok(token) => {
                debug!(?id, ?task, ?delay, "Scheduled timer");
                self.tokens.borrow_mut().insert(id, token);
            }
            Err(e) => warn!("Failed to schedule {:?}: {}", task, e.error),
        }
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let token = self.tokens.borrow_mut().remove(&id);
        if let Some(token) = token {
            debug!(?id, "Cancelled timer");
            self.handle.remove(token);
        }
    }
}

/// Ringer backed by the default PulseAudio/PipeWire sink mute state.
/// Vibrate and silent both mute; the distinction is kept in memory.
pub struct PactlRinger {
    mode: RingerMode,
}

impl PactlRinger {
    pub fn new() -> Self {
        let mode = if Self::is_muted() {
            RingerMode::Silent
        } else {
            RingerMode::Normal
        };
        info!(?mode, "Initial ringer mode");
        Self { mode }
    }

    fn is_muted() -> bool {
        Command::new("pactl")
            .args(["get-sink-mute", "@DEFAULT_SINK@"])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("yes"))
            .unwrap_or(false)
    }

    fn set_mute(muted: bool) {
        let state = if muted { "1" } else { "0" };
        if let Err(e) = Command::new("pactl")
            .args(["set-sink-mute", "@DEFAULT_SINK@", state])
            .spawn()
        {
            warn!("Failed to run pactl: {:?}", e);
        }
    }
}

impl Default for PactlRinger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ringer for PactlRinger {
    fn ringer_mode(&self) -> RingerMode {
        self.mode
    }

    fn set_ringer_mode(&mut self, mode: RingerMode) {
        info!(from = ?self.mode, to = ?mode, "Setting ringer mode");
        if mode.is_silent() != self.mode.is_silent() {
            Self::set_mute(mode.is_silent());
        }
        self.mode = mode;
    }
}

/// Launcher configuration - which shell command handles which target
///
/// Keys are a flattened component (`pkg/cls`), an action name, or a URI
/// scheme followed by `:` (e.g. `https:`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub commands: HashMap<String, String>,
    /// Command used for data URIs without a specific mapping; gets the URI appended
    #[serde(default = "default_opener")]
    pub opener: String,
}

fn default_opener() -> String {
    "xdg-open".to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            opener: default_opener(),
        }
    }
}

impl LauncherConfig {
    fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home).join(".local/state/flick/lockscreen_launchers.json")
        })
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(contents) = fs::read_to_string(&path) {
                match serde_json::from_str::<Self>(&contents) {
                    Ok(config) => {
                        info!("Loaded {} launcher commands from {:?}", config.commands.len(), path);
                        return config;
                    }
                    Err(e) => warn!("Failed to parse {:?}: {:?}", path, e),
                }
            }
        }
        info!("No launcher config found, using defaults");
        Self::default()
    }

    /// Shell command for a target, if one is configured
    pub fn command_for(&self, target: &IntentDescriptor) -> Option<String> {
        if let Some(ref component) = target.component {
            if let Some(cmd) = self.commands.get(&component.flatten()) {
                return Some(cmd.clone());
            }
        }
        if let Some(ref data) = target.data {
            if let Some((scheme, _)) = data.split_once(':') {
                if let Some(cmd) = self.commands.get(&format!("{}:", scheme)) {
                    return Some(format!("{} '{}'", cmd, data.replace('\'', "'\\''")));
                }
            }
        }
        if let Some(ref action) = target.action {
            if let Some(cmd) = self.commands.get(action) {
                return Some(cmd.clone());
            }
        }
        target
            .data
            .as_ref()
            .map(|data| format!("{} '{}'", self.opener, data.replace('\'', "'\\''")))
    }
}

/// Launches targets by spawning `sh -c <command>`
pub struct CommandLauncher {
    config: LauncherConfig,
}

impl CommandLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }
}

impl AppLauncher for CommandLauncher {
    fn launch(&mut self, target: &IntentDescriptor) -> Result<()> {
        let exec = self
            .config
            .command_for(target)
            .ok_or_else(|| Error::Launch(format!("no command for {}", target.summary())))?;

        info!("Launching {}: {}", target.summary(), exec);
        Command::new("sh")
            .arg("-c")
            .arg(&exec)
            .spawn()
            .map(|_| ())
            .map_err(|e| Error::Launch(format!("{}: {}", exec, e)))
    }
}

/// Device environment for a Linux phone session
pub struct HostEnvironment {
    settings: Rc<dyn SettingsStore>,
    menu_key_disabled: bool,
    menu_key_file: PathBuf,
    bypass_enabled: bool,
}

impl HostEnvironment {
    pub fn new(settings: Rc<dyn SettingsStore>, menu_key_disabled: bool, bypass_enabled: bool) -> Self {
        Self {
            settings,
            menu_key_disabled,
            menu_key_file: PathBuf::from(ENABLE_MENU_KEY_FILE),
            bypass_enabled,
        }
    }

    pub fn with_menu_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.menu_key_file = path.into();
        self
    }
}

impl DeviceEnvironment for HostEnvironment {
    fn camera_disabled(&self) -> bool {
        self.settings.get_flag(SettingKey::DisableCamera, false)
    }

    fn menu_key_disabled_by_config(&self) -> bool {
        self.menu_key_disabled
    }

    fn running_in_test_harness(&self) -> bool {
        std::env::var("FLICK_TEST_HARNESS").map(|v| v == "1").unwrap_or(false)
    }

    fn menu_key_override_present(&self) -> bool {
        let present = self.menu_key_file.exists();
        if present {
            debug!("Menu key override file present at {:?}", self.menu_key_file);
        }
        present
    }

    fn keyguard_bypass_enabled(&self) -> bool {
        self.bypass_enabled
    }
}
