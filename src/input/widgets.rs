//! Unlock widget adapters
//!
//! Each adapter owns one native surface and a gesture tracker, and knows what
//! its surface's handles mean. Only the multi-wave ring goes through the
//! dispatch table; the sliding tab and wave have fixed handle meanings.

use tracing::{debug, info};

use super::gesture::{GestureState, GestureTracker, SurfaceEvent};
use super::surfaces::{
    InflatedWidget, MultiWaveSurface, SlidingTabSurface, ViewHandle, WaveSurface, CENTER_HANDLE,
    LEFT_HANDLE, RIGHT_HANDLE,
};
use crate::error::{Error, Result};
use crate::keyguard::context::LockContext;
use crate::keyguard::dispatch::resolve_action;
use crate::keyguard::layout::{right_hint, right_tab_resources, target_art, LEFT_HINT, LEFT_TAB};
use crate::keyguard::STAY_ON_WHILE_GRABBED_TIMEOUT;
use crate::system::RingerMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    SlidingTab,
    Wave,
    MultiWave,
}

/// Uniform view of whichever unlock widget the layout contains
pub trait UnlockWidget {
    fn kind(&self) -> WidgetKind;
    fn view_handle(&self) -> ViewHandle;
    /// Bring the widget's art in line with settings, policy and ringer state
    fn refresh_presentation(&mut self, ctx: &LockContext);
    fn reset(&mut self, animate: bool);
    fn idle_ping(&mut self);
    fn handle_event(&mut self, event: SurfaceEvent, ctx: &mut LockContext);
    fn gesture_state(&self) -> GestureState;
}

/// Adapt an inflated widget view, configuring it for first display
pub fn build_widget(view: InflatedWidget, ctx: &LockContext) -> Result<Box<dyn UnlockWidget>> {
    debug!(view = view.kind_name(), "Adapting unlock widget");
    let mut widget: Box<dyn UnlockWidget> = match view {
        InflatedWidget::SlidingTab(surface) => Box::new(SlidingTabWidget::new(surface)),
        InflatedWidget::Wave(surface) => Box::new(WaveWidget::new(surface)),
        InflatedWidget::MultiWave(surface) => Box::new(MultiWaveWidget::new(surface)),
        InflatedWidget::Other(name) => return Err(Error::UnrecognizedWidget(name)),
    };
    info!(kind = ?widget.kind(), "Unlock widget ready");
    widget.refresh_presentation(ctx);
    Ok(widget)
}

/// Route the gesture bookkeeping shared by every adapter. Returns the
/// target to act on when the event is a first trigger.
fn track(tracker: &mut GestureTracker, event: SurfaceEvent) -> Option<usize> {
    match event {
        SurfaceEvent::GrabChanged(handle) => {
            tracker.grab(handle);
            None
        }
        SurfaceEvent::Triggered(target) => tracker.trigger(target).then_some(target),
        SurfaceEvent::Released(_) => {
            tracker.release();
            None
        }
        SurfaceEvent::Cancelled => {
            tracker.cancel();
            None
        }
    }
}

pub struct SlidingTabWidget {
    surface: Box<dyn SlidingTabSurface>,
    tracker: GestureTracker,
}

impl SlidingTabWidget {
    pub fn new(mut surface: Box<dyn SlidingTabSurface>) -> Self {
        surface.set_hold_after_trigger(true, false);
        surface.set_left_hint(LEFT_HINT);
        surface.set_left_tab(LEFT_TAB);
        Self {
            surface,
            tracker: GestureTracker::new(),
        }
    }

    fn update_right_tab(&mut self, ctx: &LockContext) {
        let vibrate = ctx.ringer_mode() == RingerMode::Vibrate;
        self.surface
            .set_right_tab(right_tab_resources(ctx.silent_mode(), vibrate));
    }
}

impl UnlockWidget for SlidingTabWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::SlidingTab
    }

    fn view_handle(&self) -> ViewHandle {
        self.surface.view_handle()
    }

    fn refresh_presentation(&mut self, ctx: &LockContext) {
        self.update_right_tab(ctx);
    }

    fn reset(&mut self, animate: bool) {
        self.tracker.reset();
        self.surface.reset(animate);
    }

    fn idle_ping(&mut self) {}

    fn handle_event(&mut self, event: SurfaceEvent, ctx: &mut LockContext) {
        if let SurfaceEvent::GrabChanged(Some(handle)) = event {
            if handle == RIGHT_HANDLE {
                let silent = ctx.sync_silent_mode();
                self.surface.set_right_hint(right_hint(silent));
            }
            // Only user grabs keep the screen on; the system releasing a grab does not
            ctx.poke_wakelock(None);
        }

        match track(&mut self.tracker, event) {
            Some(LEFT_HANDLE) => ctx.go_to_unlock_screen(),
            Some(RIGHT_HANDLE) => {
                ctx.toggle_ring_mode();
                self.update_right_tab(ctx);
                ctx.poke_wakelock(None);
            }
            Some(other) => debug!(handle = other, "Trigger on unknown sliding tab handle"),
            None => {}
        }
    }

    fn gesture_state(&self) -> GestureState {
        self.tracker.state()
    }
}

pub struct WaveWidget {
    surface: Box<dyn WaveSurface>,
    tracker: GestureTracker,
}

impl WaveWidget {
    pub fn new(surface: Box<dyn WaveSurface>) -> Self {
        Self {
            surface,
            tracker: GestureTracker::new(),
        }
    }
}

impl UnlockWidget for WaveWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Wave
    }

    fn view_handle(&self) -> ViewHandle {
        self.surface.view_handle()
    }

    fn refresh_presentation(&mut self, _ctx: &LockContext) {}

    fn reset(&mut self, animate: bool) {
        self.tracker.reset();
        self.surface.reset(animate);
    }

    fn idle_ping(&mut self) {}

    fn handle_event(&mut self, event: SurfaceEvent, ctx: &mut LockContext) {
        if event == SurfaceEvent::GrabChanged(Some(CENTER_HANDLE)) {
            ctx.poke_wakelock(Some(STAY_ON_WHILE_GRABBED_TIMEOUT));
        }

        match track(&mut self.tracker, event) {
            Some(CENTER_HANDLE) => ctx.request_unlock_screen(),
            Some(other) => debug!(handle = other, "Trigger on unknown wave handle"),
            None => {}
        }
    }

    fn gesture_state(&self) -> GestureState {
        self.tracker.state()
    }
}

pub struct MultiWaveWidget {
    surface: Box<dyn MultiWaveSurface>,
    tracker: GestureTracker,
}

impl MultiWaveWidget {
    pub fn new(surface: Box<dyn MultiWaveSurface>) -> Self {
        Self {
            surface,
            tracker: GestureTracker::new(),
        }
    }
}

impl UnlockWidget for MultiWaveWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::MultiWave
    }

    fn view_handle(&self) -> ViewHandle {
        self.surface.view_handle()
    }

    fn refresh_presentation(&mut self, ctx: &LockContext) {
        let art = target_art(
            ctx.settings().targets,
            ctx.size(),
            ctx.camera_disabled(),
            ctx.silent_mode(),
        );
        debug!(art = art.name(), "Setting target art");
        self.surface.set_target_art(&art);
    }

    fn reset(&mut self, animate: bool) {
        self.tracker.reset();
        self.surface.reset(animate);
    }

    fn idle_ping(&mut self) {
        self.surface.ping();
    }

    fn handle_event(&mut self, event: SurfaceEvent, ctx: &mut LockContext) {
        if let SurfaceEvent::GrabChanged(Some(_)) = event {
            ctx.poke_wakelock(None);
        }

        if let Some(target) = track(&mut self.tracker, event) {
            let dispatch = resolve_action(
                ctx.settings().targets,
                target,
                ctx.camera_disabled(),
                &ctx.custom_overrides(),
            );
            if ctx.execute(&dispatch) {
                self.refresh_presentation(ctx);
            }
        }
    }

    fn gesture_state(&self) -> GestureState {
        self.tracker.state()
    }
}
