//! Collaborators and shared state the unlock widgets act on

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::actions::{CustomOverrides, Dispatch, TargetAction};
use super::intent::IntentDescriptor;
use super::layout::{Orientation, ScreenSizeClass};
use super::settings::{LockSettings, SettingKey, SettingsStore};
use super::WAIT_FOR_ANIMATION_TIMEOUT;
use crate::system::{AppLauncher, DeferredTask, DeviceEnvironment, RingerMode, Ringer, Scheduler, TimerId};

/// Device configuration as reported by the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceConfiguration {
    pub orientation: Orientation,
    /// Hardware keyboard slid closed (or absent)
    pub keyboard_hidden: bool,
}

/// Requests from the lock screen back to the keyguard host
pub trait KeyguardCallback {
    fn go_to_unlock_screen(&mut self);
    /// Keep the screen on; `None` uses the host's default timeout
    fn poke_wakelock(&mut self, timeout_ms: Option<u32>);
    /// Tear down and rebuild the lock screen for a new configuration
    fn recreate_me(&mut self, config: DeviceConfiguration);
}

/// Everything the lock screen talks to
pub struct Services {
    pub settings: Rc<dyn SettingsStore>,
    pub ringer: Box<dyn Ringer>,
    pub launcher: Box<dyn AppLauncher>,
    pub device: Box<dyn DeviceEnvironment>,
    pub scheduler: Box<dyn Scheduler>,
    pub callback: Box<dyn KeyguardCallback>,
}

/// State shared between the lock screen and its unlock widget
pub struct LockContext {
    services: Services,
    settings: LockSettings,
    size: ScreenSizeClass,
    silent_mode: bool,
    transition_pending: bool,
    pending_unlock: Option<TimerId>,
}

impl LockContext {
    pub fn new(services: Services, settings: LockSettings, size: ScreenSizeClass) -> Self {
        let silent_mode = services.ringer.ringer_mode().is_silent();
        Self {
            services,
            settings,
            size,
            silent_mode,
            transition_pending: false,
            pending_unlock: None,
        }
    }

    pub fn settings(&self) -> LockSettings {
        self.settings
    }

    pub(crate) fn set_settings(&mut self, settings: LockSettings) {
        self.settings = settings;
    }

    pub fn store(&self) -> &dyn SettingsStore {
        &*self.services.settings
    }

    pub fn size(&self) -> ScreenSizeClass {
        self.size
    }

    pub fn device(&self) -> &dyn DeviceEnvironment {
        &*self.services.device
    }

    /// Current device policy; never cached
    pub fn camera_disabled(&self) -> bool {
        self.services.device.camera_disabled()
    }

    /// Current custom target overrides, read from the store
    pub fn custom_overrides(&self) -> CustomOverrides {
        CustomOverrides::load(self.store())
    }

    pub fn silent_mode(&self) -> bool {
        self.silent_mode
    }

    pub fn ringer_mode(&self) -> RingerMode {
        self.services.ringer.ringer_mode()
    }

    /// Re-read silent mode from the ringer
    pub fn sync_silent_mode(&mut self) -> bool {
        self.silent_mode = self.ringer_mode().is_silent();
        self.silent_mode
    }

    /// Record a ringer change; returns true if silent mode flipped
    pub(crate) fn set_silent_mode(&mut self, silent: bool) -> bool {
        let changed = self.silent_mode != silent;
        self.silent_mode = silent;
        changed
    }

    pub fn transition_pending(&self) -> bool {
        self.transition_pending
    }

    pub(crate) fn clear_transition(&mut self) {
        self.transition_pending = false;
    }

    pub fn poke_wakelock(&mut self, timeout_ms: Option<u32>) {
        self.services.callback.poke_wakelock(timeout_ms);
    }

    pub fn recreate_me(&mut self, config: DeviceConfiguration) {
        info!(?config, "Requesting lock screen recreation");
        self.services.callback.recreate_me(config);
    }

    /// Hand over to the unlock screen now. Repeated requests while one is
    /// outstanding are dropped.
    pub fn go_to_unlock_screen(&mut self) {
        if self.transition_pending {
            debug!("Unlock already in progress");
            return;
        }
        self.transition_pending = true;
        info!("Going to unlock screen");
        self.services.callback.go_to_unlock_screen();
    }

    /// Hand over to the unlock screen once the trigger animation has finished
    pub fn request_unlock_screen(&mut self) {
        if self.transition_pending {
            debug!("Unlock already in progress");
            return;
        }
        self.transition_pending = true;
        let id = self.services.scheduler.schedule(
            Duration::from_millis(WAIT_FOR_ANIMATION_TIMEOUT),
            DeferredTask::RequestUnlock,
        );
        self.pending_unlock = Some(id);
    }

    /// Fire a deferred unlock request; stale timers are ignored
    pub(crate) fn complete_unlock_request(&mut self, id: TimerId) {
        if self.pending_unlock != Some(id) {
            debug!(?id, "Ignoring stale unlock timer");
            return;
        }
        self.pending_unlock = None;
        info!("Going to unlock screen");
        self.services.callback.go_to_unlock_screen();
    }

    pub fn schedule(&mut self, delay: Duration, task: DeferredTask) -> TimerId {
        self.services.scheduler.schedule(delay, task)
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.services.scheduler.cancel(id);
    }

    pub(crate) fn cancel_unlock_request(&mut self) {
        if let Some(id) = self.pending_unlock.take() {
            self.services.scheduler.cancel(id);
        }
    }

    /// Flip between normal and silent. Silent becomes vibrate unless the
    /// user turned off vibrate-in-silent.
    pub fn toggle_ring_mode(&mut self) {
        self.silent_mode = !self.silent_mode;
        let mode = if self.silent_mode {
            if self.store().get_flag(SettingKey::VibrateInSilent, true) {
                RingerMode::Vibrate
            } else {
                RingerMode::Silent
            }
        } else {
            RingerMode::Normal
        };
        self.services.ringer.set_ringer_mode(mode);
    }

    /// Launch failures never block the lock screen
    pub fn launch(&mut self, target: &IntentDescriptor) {
        if let Err(e) = self.services.launcher.launch(target) {
            warn!("Failed to launch {}: {}", target.summary(), e);
        }
    }

    /// Carry out a resolved dispatch. Returns true when the widget's
    /// presentation no longer matches the ringer state.
    pub fn execute(&mut self, dispatch: &Dispatch) -> bool {
        let mut stale = false;
        match &dispatch.action {
            TargetAction::Unlock | TargetAction::NoOp => {}
            TargetAction::ToggleRing => {
                self.toggle_ring_mode();
                self.poke_wakelock(None);
                stale = true;
            }
            action => {
                if let Some(target) = action.launch_target(self.size) {
                    self.launch(&target);
                }
            }
        }
        if dispatch.dismiss {
            self.go_to_unlock_screen();
        }
        stale
    }
}
