//! Lock screen controller
//!
//! `LockScreen` owns the unlock widget adapter and the collaborators it acts
//! through. It routes surface events to the adapter, handles keys and
//! configuration changes, and keeps the presentation in step with settings
//! and ringer state across the pause/resume lifecycle.

pub mod actions;
pub mod context;
pub mod dispatch;
pub mod intent;
pub mod layout;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tracing::{debug, info};

pub use context::{DeviceConfiguration, KeyguardCallback, LockContext, Services};

use self::layout::{select_layout, Orientation, ScreenLayout, ScreenSizeClass};
use self::settings::{LockSettings, SettingKey, SettingsBridge, SettingsStore};
use crate::error::Result;
use crate::input::{
    build_widget, translate, GestureState, InflatedWidget, NativeEvent, SurfaceEvent, UnlockWidget,
    ViewHandle, WidgetKind,
};
use crate::system::{DeferredTask, DeviceEnvironment, RingerMode, TimerId};

/// Delay before the idle hint animation after the screen resumes
pub const ON_RESUME_PING_DELAY: u64 = 500;
/// Delay between a wave trigger and the unlock request
pub const WAIT_FOR_ANIMATION_TIMEOUT: u64 = 0;
/// Screen-on time while the wave handle is held (ms)
pub const STAY_ON_WHILE_GRABBED_TIMEOUT: u32 = 30000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Menu,
    Back,
    Other(u32),
}

/// Clock or status text view; optional in every layout
pub trait StatusView {
    fn update_time(&mut self);
    fn set_text_color(&mut self, argb: u32);
}

/// Views found after inflating a screen layout
pub struct InflatedViews {
    pub widget: InflatedWidget,
    pub clock: Option<Box<dyn StatusView>>,
    pub status: Option<Box<dyn StatusView>>,
}

/// Host side of view inflation
pub trait LayoutInflater {
    fn inflate(&mut self, layout: ScreenLayout) -> Result<InflatedViews>;
}

/// Menu-key unlock is on unless the device config turns it off, and a test
/// harness, the override file or the user setting can turn it back on.
pub fn should_enable_menu_key(device: &dyn DeviceEnvironment, store: &dyn SettingsStore) -> bool {
    !device.menu_key_disabled_by_config()
        || device.running_in_test_harness()
        || device.menu_key_override_present()
        || store.get_flag(SettingKey::MenuUnlockScreen, false)
}

pub struct LockScreen {
    ctx: LockContext,
    widget: Box<dyn UnlockWidget>,
    clock: Option<Box<dyn StatusView>>,
    status: Option<Box<dyn StatusView>>,
    bridge: SettingsBridge,
    layout: ScreenLayout,
    creation_orientation: Orientation,
    configuration: DeviceConfiguration,
    menu_key_enabled: bool,
    pending_ping: Option<TimerId>,
    cleaned_up: bool,
}

impl LockScreen {
    /// Build the lock screen for the given configuration.
    ///
    /// Fails if inflation fails or the layout's unlock widget is not one of
    /// the three known surfaces.
    pub fn new(
        configuration: DeviceConfiguration,
        size: ScreenSizeClass,
        services: Services,
        inflater: &mut dyn LayoutInflater,
    ) -> Result<Self> {
        let menu_key_enabled = should_enable_menu_key(&*services.device, &*services.settings);
        let bridge = SettingsBridge::new(&*services.settings);
        let settings = bridge.current();
        let selection = select_layout(
            settings.targets,
            size,
            configuration.orientation,
            settings.layout,
            services.device.camera_disabled(),
            services.ringer.ringer_mode().is_silent(),
        );
        let layout = selection.screen;
        info!(
            layout = layout.resource_name(),
            art = selection.targets.name(),
            ?size,
            ?configuration,
            menu_key_enabled,
            "Creating lock screen"
        );

        let views = inflater.inflate(layout)?;
        let ctx = LockContext::new(services, settings, size);
        let widget = build_widget(views.widget, &ctx)?;

        let mut screen = Self {
            ctx,
            widget,
            clock: views.clock,
            status: views.status,
            bridge,
            layout,
            creation_orientation: configuration.orientation,
            configuration,
            menu_key_enabled,
            pending_ping: None,
            cleaned_up: false,
        };
        screen.update_status_views();
        Ok(screen)
    }

    pub fn context(&self) -> &LockContext {
        &self.ctx
    }

    pub fn layout(&self) -> ScreenLayout {
        self.layout
    }

    pub fn settings(&self) -> LockSettings {
        self.ctx.settings()
    }

    pub fn view_handle(&self) -> ViewHandle {
        self.widget.view_handle()
    }

    pub fn widget_kind(&self) -> WidgetKind {
        self.widget.kind()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.widget.gesture_state()
    }

    pub fn menu_key_enabled(&self) -> bool {
        self.menu_key_enabled
    }

    /// The lock screen never takes text input
    pub fn needs_input(&self) -> bool {
        false
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        if self.cleaned_up {
            return;
        }
        if self.ctx.transition_pending() {
            if let SurfaceEvent::Triggered(target) = event {
                debug!(target, "Ignoring trigger during unlock transition");
                return;
            }
        }
        self.widget.handle_event(event, &mut self.ctx);
    }

    /// Raw listener callback from the surface
    pub fn handle_native_event(&mut self, event: NativeEvent) {
        match translate(event) {
            Some(event) => self.handle_surface_event(event),
            None => debug!(?event, "Dropping invalid surface event"),
        }
    }

    /// Returns true if the key unlocked the screen
    pub fn on_key_down(&mut self, key: Key) -> bool {
        if self.cleaned_up || key != Key::Menu || !self.menu_key_enabled {
            return false;
        }
        self.ctx.go_to_unlock_screen();
        true
    }

    pub fn update_configuration(&mut self, new: DeviceConfiguration) {
        if self.cleaned_up {
            return;
        }
        if new.orientation != self.creation_orientation {
            self.ctx.recreate_me(new);
            return;
        }
        if new.keyboard_hidden != self.configuration.keyboard_hidden {
            self.configuration.keyboard_hidden = new.keyboard_hidden;
            let keyboard_open = !new.keyboard_hidden;
            if keyboard_open && self.ctx.device().keyguard_bypass_enabled() {
                info!("Keyboard opened with bypass enabled");
                self.ctx.go_to_unlock_screen();
            }
        }
    }

    /// Window attached: catch up on anything that changed while detached
    pub fn on_attached(&mut self, configuration: DeviceConfiguration) {
        self.update_configuration(configuration);
        self.update_settings();
    }

    pub fn on_pause(&mut self) {
        if self.cleaned_up {
            return;
        }
        debug!("Lock screen paused");
        self.widget.reset(false);
        self.cancel_ping();
    }

    pub fn on_resume(&mut self) {
        if self.cleaned_up {
            return;
        }
        debug!("Lock screen resumed");
        self.ctx.clear_transition();
        self.cancel_ping();
        self.pending_ping = Some(self.ctx.schedule(
            Duration::from_millis(ON_RESUME_PING_DELAY),
            DeferredTask::IdlePing,
        ));
        self.update_settings();
    }

    pub fn on_ringer_mode_changed(&mut self, mode: RingerMode) {
        if self.cleaned_up {
            return;
        }
        if self.ctx.set_silent_mode(mode.is_silent()) {
            debug!(?mode, "Silent mode changed");
            self.widget.refresh_presentation(&self.ctx);
        }
    }

    /// Queue a settings change; applied on the next `flush_settings`
    pub fn notify_settings_changed(&mut self) {
        self.bridge.notify();
    }

    /// Apply queued settings changes, if any, as one refresh
    pub fn flush_settings(&mut self) -> bool {
        match self.bridge.flush(self.ctx.store()) {
            Some(settings) => {
                self.apply_settings(settings);
                true
            }
            None => false,
        }
    }

    pub fn on_settings_changed(&mut self) {
        self.notify_settings_changed();
        self.flush_settings();
    }

    /// Re-derive settings from the store and refresh everything shown
    pub fn update_settings(&mut self) {
        let settings = self.bridge.refresh(self.ctx.store());
        self.apply_settings(settings);
    }

    fn apply_settings(&mut self, settings: LockSettings) {
        if self.cleaned_up {
            return;
        }
        self.ctx.set_settings(settings);
        self.ctx.sync_silent_mode();

        let selection = select_layout(
            settings.targets,
            self.ctx.size(),
            self.creation_orientation,
            settings.layout,
            self.ctx.camera_disabled(),
            self.ctx.silent_mode(),
        );
        let layout = selection.screen;
        if layout != self.layout {
            info!(from = self.layout.resource_name(), to = layout.resource_name(), "Layout changed");
            self.ctx.recreate_me(self.configuration);
            return;
        }

        debug!(art = selection.targets.name(), "Refreshing presentation");
        self.widget.refresh_presentation(&self.ctx);
        self.update_status_views();
    }

    fn update_status_views(&mut self) {
        let color = self.ctx.settings().text_color;
        match self.clock.as_mut() {
            Some(clock) => {
                clock.update_time();
                clock.set_text_color(color);
            }
            None => debug!("Layout has no clock view"),
        }
        match self.status.as_mut() {
            Some(status) => status.set_text_color(color),
            None => debug!("Layout has no status view"),
        }
    }

    /// A one-shot timer registered through the scheduler fired
    pub fn run_deferred(&mut self, id: TimerId, task: DeferredTask) {
        if self.cleaned_up {
            return;
        }
        match task {
            DeferredTask::RequestUnlock => self.ctx.complete_unlock_request(id),
            DeferredTask::IdlePing => {
                if self.pending_ping != Some(id) {
                    debug!(?id, "Ignoring stale ping timer");
                    return;
                }
                self.pending_ping = None;
                self.widget.idle_ping();
            }
        }
    }

    fn cancel_ping(&mut self) {
        if let Some(id) = self.pending_ping.take() {
            self.ctx.cancel(id);
        }
    }

    /// Drop pending work; the lock screen ignores everything afterwards
    pub fn clean_up(&mut self) {
        if self.cleaned_up {
            return;
        }
        info!("Cleaning up lock screen");
        self.cancel_ping();
        self.ctx.cancel_unlock_request();
        self.cleaned_up = true;
    }
}
