//! Recording fakes for lock screen tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::context::{DeviceConfiguration, KeyguardCallback, LockContext, Services};
use super::intent::IntentDescriptor;
use super::layout::{ScreenLayout, ScreenSizeClass, TabResources, TargetArt};
use super::settings::{LockSettings, MemorySettings};
use super::{InflatedViews, LayoutInflater, StatusView};
use crate::error::{Error, Result};
use crate::input::{InflatedWidget, MultiWaveSurface, SlidingTabSurface, ViewHandle, WaveSurface};
use crate::system::{AppLauncher, DeferredTask, DeviceEnvironment, Ringer, RingerMode, Scheduler, TimerId};

pub const VIEW_ID: ViewHandle = ViewHandle(7);

/// Everything the fakes saw, plus the device state they report
#[derive(Debug)]
pub struct Recorder {
    pub unlocks: u32,
    pub pokes: Vec<Option<u32>>,
    pub recreated: Vec<DeviceConfiguration>,
    pub launched: Vec<IntentDescriptor>,
    pub fail_launches: bool,
    pub ringer_mode: RingerMode,
    pub ringer_changes: Vec<RingerMode>,
    pub next_timer: u64,
    pub scheduled: Vec<(TimerId, Duration, DeferredTask)>,
    pub cancelled: Vec<TimerId>,
    pub camera_disabled: bool,
    pub menu_key_disabled: bool,
    pub test_harness: bool,
    pub menu_key_override: bool,
    pub bypass_enabled: bool,
    pub surface_calls: Vec<String>,
    pub inflated: Vec<ScreenLayout>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            unlocks: 0,
            pokes: Vec::new(),
            recreated: Vec::new(),
            launched: Vec::new(),
            fail_launches: false,
            ringer_mode: RingerMode::Normal,
            ringer_changes: Vec::new(),
            next_timer: 0,
            scheduled: Vec::new(),
            cancelled: Vec::new(),
            camera_disabled: false,
            menu_key_disabled: false,
            test_harness: false,
            menu_key_override: false,
            bypass_enabled: false,
            surface_calls: Vec::new(),
            inflated: Vec::new(),
        }
    }
}

impl Recorder {
    pub fn has_surface_call(&self, call: &str) -> bool {
        self.surface_calls.iter().any(|c| c == call)
    }

    pub fn last_surface_call(&self) -> Option<&str> {
        self.surface_calls.last().map(|c| c.as_str())
    }

    fn record(&mut self, call: String) {
        self.surface_calls.push(call);
    }
}

pub type Log = Rc<RefCell<Recorder>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Recorder::default()))
}

struct FakeRinger(Log);

impl Ringer for FakeRinger {
    fn ringer_mode(&self) -> RingerMode {
        self.0.borrow().ringer_mode
    }

    fn set_ringer_mode(&mut self, mode: RingerMode) {
        let mut log = self.0.borrow_mut();
        log.ringer_mode = mode;
        log.ringer_changes.push(mode);
    }
}

struct FakeLauncher(Log);

impl AppLauncher for FakeLauncher {
    fn launch(&mut self, target: &IntentDescriptor) -> Result<()> {
        let mut log = self.0.borrow_mut();
        if log.fail_launches {
            return Err(Error::Launch(format!("refused {}", target.summary())));
        }
        log.launched.push(target.clone());
        Ok(())
    }
}

struct FakeDevice(Log);

impl DeviceEnvironment for FakeDevice {
    fn camera_disabled(&self) -> bool {
        self.0.borrow().camera_disabled
    }

    fn menu_key_disabled_by_config(&self) -> bool {
        self.0.borrow().menu_key_disabled
    }

    fn running_in_test_harness(&self) -> bool {
        self.0.borrow().test_harness
    }

    fn menu_key_override_present(&self) -> bool {
        self.0.borrow().menu_key_override
    }

    fn keyguard_bypass_enabled(&self) -> bool {
        self.0.borrow().bypass_enabled
    }
}

struct FakeScheduler(Log);

impl Scheduler for FakeScheduler {
    fn schedule(&mut self, delay: Duration, task: DeferredTask) -> TimerId {
        let mut log = self.0.borrow_mut();
        log.next_timer += 1;
        let id = TimerId(log.next_timer);
        log.scheduled.push((id, delay, task));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.0.borrow_mut().cancelled.push(id);
    }
}

struct FakeCallback(Log);

impl KeyguardCallback for FakeCallback {
    fn go_to_unlock_screen(&mut self) {
        self.0.borrow_mut().unlocks += 1;
    }

    fn poke_wakelock(&mut self, timeout_ms: Option<u32>) {
        self.0.borrow_mut().pokes.push(timeout_ms);
    }

    fn recreate_me(&mut self, config: DeviceConfiguration) {
        self.0.borrow_mut().recreated.push(config);
    }
}

pub fn services(log: &Log, settings: Rc<MemorySettings>) -> Services {
    Services {
        settings,
        ringer: Box::new(FakeRinger(log.clone())),
        launcher: Box::new(FakeLauncher(log.clone())),
        device: Box::new(FakeDevice(log.clone())),
        scheduler: Box::new(FakeScheduler(log.clone())),
        callback: Box::new(FakeCallback(log.clone())),
    }
}

/// A bare context for driving adapters directly
pub struct Harness {
    pub log: Log,
    pub settings: Rc<MemorySettings>,
    pub ctx: LockContext,
}

impl Harness {
    pub fn new(settings: MemorySettings) -> Self {
        let log = new_log();
        let settings = Rc::new(settings);
        let snapshot = LockSettings::load(&*settings);
        let ctx = LockContext::new(services(&log, settings.clone()), snapshot, ScreenSizeClass::Normal);
        Self { log, settings, ctx }
    }
}

pub struct FakeSlidingTab(Log);

impl FakeSlidingTab {
    pub fn new(log: &Log) -> Self {
        Self(log.clone())
    }
}

impl SlidingTabSurface for FakeSlidingTab {
    fn view_handle(&self) -> ViewHandle {
        VIEW_ID
    }

    fn set_hold_after_trigger(&mut self, left: bool, right: bool) {
        self.0.borrow_mut().record(format!("hold:{},{}", left, right));
    }

    fn set_left_tab(&mut self, art: TabResources) {
        self.0.borrow_mut().record(format!("left_tab:{}", art.icon));
    }

    fn set_left_hint(&mut self, hint: &str) {
        self.0.borrow_mut().record(format!("left_hint:{}", hint));
    }

    fn set_right_tab(&mut self, art: TabResources) {
        self.0.borrow_mut().record(format!("right_tab:{}", art.icon));
    }

    fn set_right_hint(&mut self, hint: &str) {
        self.0.borrow_mut().record(format!("right_hint:{}", hint));
    }

    fn reset(&mut self, animate: bool) {
        self.0.borrow_mut().record(format!("reset:{}", animate));
    }
}

pub struct FakeWave(Log);

impl FakeWave {
    pub fn new(log: &Log) -> Self {
        Self(log.clone())
    }
}

impl WaveSurface for FakeWave {
    fn view_handle(&self) -> ViewHandle {
        VIEW_ID
    }

    fn reset(&mut self, animate: bool) {
        self.0.borrow_mut().record(format!("reset:{}", animate));
    }
}

pub struct FakeMultiWave(Log);

impl FakeMultiWave {
    pub fn new(log: &Log) -> Self {
        Self(log.clone())
    }
}

impl MultiWaveSurface for FakeMultiWave {
    fn view_handle(&self) -> ViewHandle {
        VIEW_ID
    }

    fn set_target_art(&mut self, art: &TargetArt) {
        self.0.borrow_mut().record(format!("art:{}", art.name()));
    }

    fn reset(&mut self, animate: bool) {
        self.0.borrow_mut().record(format!("reset:{}", animate));
    }

    fn ping(&mut self) {
        self.0.borrow_mut().record("ping".to_string());
    }
}

struct FakeStatus {
    log: Log,
    name: &'static str,
}

impl StatusView for FakeStatus {
    fn update_time(&mut self) {
        self.log.borrow_mut().record(format!("{}:time", self.name));
    }

    fn set_text_color(&mut self, argb: u32) {
        self.log
            .borrow_mut()
            .record(format!("{}:color:{:08x}", self.name, argb));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeKind {
    SlidingTab,
    Wave,
    MultiWave,
    Other,
}

pub struct FakeInflater {
    pub log: Log,
    pub kind: FakeKind,
    pub clock: bool,
    pub status: bool,
}

impl FakeInflater {
    pub fn new(log: &Log, kind: FakeKind) -> Self {
        Self {
            log: log.clone(),
            kind,
            clock: true,
            status: true,
        }
    }
}

impl LayoutInflater for FakeInflater {
    fn inflate(&mut self, layout: ScreenLayout) -> Result<InflatedViews> {
        self.log.borrow_mut().inflated.push(layout);
        let widget = match self.kind {
            FakeKind::SlidingTab => InflatedWidget::SlidingTab(Box::new(FakeSlidingTab::new(&self.log))),
            FakeKind::Wave => InflatedWidget::Wave(Box::new(FakeWave::new(&self.log))),
            FakeKind::MultiWave => InflatedWidget::MultiWave(Box::new(FakeMultiWave::new(&self.log))),
            FakeKind::Other => InflatedWidget::Other("ImageView".to_string()),
        };
        let status_view = |name: &'static str| -> Box<dyn StatusView> {
            Box::new(FakeStatus {
                log: self.log.clone(),
                name,
            })
        };
        Ok(InflatedViews {
            widget,
            clock: self.clock.then(|| status_view("clock")),
            status: self.status.then(|| status_view("status")),
        })
    }
}
