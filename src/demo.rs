//! Headless host for running the lock screen without a compositor
//!
//! Surfaces and status views only log what they are asked to draw. Gestures
//! come from a line-oriented script (usually stdin), one command per line:
//!
//! ```text
//! grab 2 | grab none | trigger 2 | release 2 | cancel
//! key menu | key back | key 82
//! ringer normal|vibrate|silent
//! rotate portrait|landscape
//! keyboard open|closed
//! set lockscreen_targets 5
//! pause | resume | quit
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use clap::ValueEnum;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::input::{
    InflatedWidget, MultiWaveSurface, SlidingTabSurface, SurfaceEvent, ViewHandle, WaveSurface,
};
use crate::keyguard::layout::{Orientation, ScreenLayout, TabResources, TargetArt};
use crate::keyguard::settings::SettingKey;
use crate::keyguard::{
    DeviceConfiguration, InflatedViews, Key, KeyguardCallback, LayoutInflater, StatusView,
};
use crate::system::RingerMode;

/// Which surface the demo inflater puts in every layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WidgetChoice {
    /// Whatever the layout carries; every shipped layout uses the multi-wave ring
    Auto,
    SlidingTab,
    Wave,
    MultiWave,
}

impl Default for WidgetChoice {
    fn default() -> Self {
        WidgetChoice::Auto
    }
}

struct LoggedSlidingTab(ViewHandle);

impl SlidingTabSurface for LoggedSlidingTab {
    fn view_handle(&self) -> ViewHandle {
        self.0
    }

    fn set_hold_after_trigger(&mut self, left: bool, right: bool) {
        debug!(left, right, "sliding tab: hold after trigger");
    }

    fn set_left_tab(&mut self, art: TabResources) {
        info!(icon = art.icon, tab = art.tab, "sliding tab: left tab");
    }

    fn set_left_hint(&mut self, hint: &str) {
        debug!(hint, "sliding tab: left hint");
    }

    fn set_right_tab(&mut self, art: TabResources) {
        info!(icon = art.icon, tab = art.tab, "sliding tab: right tab");
    }

    fn set_right_hint(&mut self, hint: &str) {
        info!(hint, "sliding tab: right hint");
    }

    fn reset(&mut self, animate: bool) {
        debug!(animate, "sliding tab: reset");
    }
}

struct LoggedWave(ViewHandle);

impl WaveSurface for LoggedWave {
    fn view_handle(&self) -> ViewHandle {
        self.0
    }

    fn reset(&mut self, animate: bool) {
        debug!(animate, "wave: reset");
    }
}

struct LoggedMultiWave(ViewHandle);

impl MultiWaveSurface for LoggedMultiWave {
    fn view_handle(&self) -> ViewHandle {
        self.0
    }

    fn set_target_art(&mut self, art: &TargetArt) {
        info!(art = art.name(), "multi-wave: targets");
    }

    fn reset(&mut self, animate: bool) {
        debug!(animate, "multi-wave: reset");
    }

    fn ping(&mut self) {
        info!("multi-wave: ping");
    }
}

struct LoggedClock;

impl StatusView for LoggedClock {
    fn update_time(&mut self) {
        info!(time = %chrono::Local::now().format("%H:%M"), "clock: time");
    }

    fn set_text_color(&mut self, argb: u32) {
        debug!("clock: colour #{:08x}", argb);
    }
}

struct LoggedStatus;

impl StatusView for LoggedStatus {
    fn update_time(&mut self) {}

    fn set_text_color(&mut self, argb: u32) {
        debug!("status: colour #{:08x}", argb);
    }
}

/// Inflates every layout with logging views
pub struct DemoInflater {
    choice: WidgetChoice,
    next_id: u64,
}

impl DemoInflater {
    pub fn new(choice: WidgetChoice) -> Self {
        Self { choice, next_id: 0 }
    }

    fn widget(&self) -> WidgetChoice {
        match self.choice {
            WidgetChoice::Auto => WidgetChoice::MultiWave,
            choice => choice,
        }
    }
}

impl LayoutInflater for DemoInflater {
    fn inflate(&mut self, layout: ScreenLayout) -> Result<InflatedViews> {
        self.next_id += 1;
        let handle = ViewHandle(self.next_id);
        let choice = self.widget();
        info!(layout = layout.resource_name(), widget = ?choice, "Inflating");

        let widget = match choice {
            WidgetChoice::SlidingTab => InflatedWidget::SlidingTab(Box::new(LoggedSlidingTab(handle))),
            WidgetChoice::Wave => InflatedWidget::Wave(Box::new(LoggedWave(handle))),
            WidgetChoice::MultiWave | WidgetChoice::Auto => {
                InflatedWidget::MultiWave(Box::new(LoggedMultiWave(handle)))
            }
        };
        Ok(InflatedViews {
            widget,
            clock: Some(Box::new(LoggedClock)),
            status: Some(Box::new(LoggedStatus)),
        })
    }
}

/// What the lock screen asked of its host, drained by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Unlock,
    Recreate(DeviceConfiguration),
}

pub type HostRequests = Rc<RefCell<VecDeque<HostRequest>>>;

/// Queues unlock and recreate requests for the host loop
pub struct QueuedCallback {
    requests: HostRequests,
}

impl QueuedCallback {
    pub fn new(requests: HostRequests) -> Self {
        Self { requests }
    }
}

impl KeyguardCallback for QueuedCallback {
    fn go_to_unlock_screen(&mut self) {
        self.requests.borrow_mut().push_back(HostRequest::Unlock);
    }

    fn poke_wakelock(&mut self, timeout_ms: Option<u32>) {
        debug!(?timeout_ms, "Wake lock poked");
    }

    fn recreate_me(&mut self, config: DeviceConfiguration) {
        self.requests.borrow_mut().push_back(HostRequest::Recreate(config));
    }
}

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Surface(SurfaceEvent),
    Key(Key),
    Ringer(RingerMode),
    Rotate(Orientation),
    Keyboard { hidden: bool },
    Set(SettingKey, Value),
    Pause,
    Resume,
    Quit,
}

impl ScriptCommand {
    /// Parse a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let mut arg = || {
            words
                .next()
                .ok_or_else(|| Error::Script(format!("{}: missing argument", verb)))
        };

        let command = match verb {
            "grab" => match arg()? {
                "none" => ScriptCommand::Surface(SurfaceEvent::GrabChanged(None)),
                n => ScriptCommand::Surface(SurfaceEvent::GrabChanged(Some(index(n)?))),
            },
            "trigger" => ScriptCommand::Surface(SurfaceEvent::Triggered(index(arg()?)?)),
            "release" => ScriptCommand::Surface(SurfaceEvent::Released(index(arg()?)?)),
            "cancel" => ScriptCommand::Surface(SurfaceEvent::Cancelled),
            "key" => ScriptCommand::Key(match arg()? {
                "menu" => Key::Menu,
                "back" => Key::Back,
                code => Key::Other(
                    code.parse()
                        .map_err(|_| Error::Script(format!("bad key code {:?}", code)))?,
                ),
            }),
            "ringer" => ScriptCommand::Ringer(match arg()? {
                "normal" => RingerMode::Normal,
                "vibrate" => RingerMode::Vibrate,
                "silent" => RingerMode::Silent,
                other => return Err(Error::Script(format!("unknown ringer mode {:?}", other))),
            }),
            "rotate" => ScriptCommand::Rotate(match arg()? {
                "portrait" => Orientation::Portrait,
                "landscape" => Orientation::Landscape,
                other => return Err(Error::Script(format!("unknown orientation {:?}", other))),
            }),
            "keyboard" => ScriptCommand::Keyboard {
                hidden: match arg()? {
                    "open" => false,
                    "closed" | "hidden" => true,
                    other => return Err(Error::Script(format!("unknown keyboard state {:?}", other))),
                },
            },
            "set" => {
                let name = arg()?;
                let key = SettingKey::from_name(name)
                    .ok_or_else(|| Error::Script(format!("unknown setting {:?}", name)))?;
                let raw = line
                    .splitn(3, char::is_whitespace)
                    .nth(2)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| Error::Script(format!("set {}: missing value", name)))?;
                ScriptCommand::Set(key, setting_value(raw))
            }
            "pause" => ScriptCommand::Pause,
            "resume" => ScriptCommand::Resume,
            "quit" | "exit" => ScriptCommand::Quit,
            other => return Err(Error::Script(format!("unknown command {:?}", other))),
        };
        Ok(Some(command))
    }
}

fn index(word: &str) -> Result<usize> {
    word.parse()
        .map_err(|_| Error::Script(format!("bad target index {:?}", word)))
}

/// Integers are stored as numbers, `null` clears, anything else is a string
fn setting_value(raw: &str) -> Value {
    if raw == "null" {
        return Value::Null;
    }
    match raw.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gestures() {
        assert_eq!(
            ScriptCommand::parse("grab 3").unwrap(),
            Some(ScriptCommand::Surface(SurfaceEvent::GrabChanged(Some(3))))
        );
        assert_eq!(
            ScriptCommand::parse("  grab none ").unwrap(),
            Some(ScriptCommand::Surface(SurfaceEvent::GrabChanged(None)))
        );
        assert_eq!(
            ScriptCommand::parse("trigger 6").unwrap(),
            Some(ScriptCommand::Surface(SurfaceEvent::Triggered(6)))
        );
        assert_eq!(ScriptCommand::parse("# comment").unwrap(), None);
        assert_eq!(ScriptCommand::parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_host_events() {
        assert_eq!(
            ScriptCommand::parse("key menu").unwrap(),
            Some(ScriptCommand::Key(Key::Menu))
        );
        assert_eq!(
            ScriptCommand::parse("key 24").unwrap(),
            Some(ScriptCommand::Key(Key::Other(24)))
        );
        assert_eq!(
            ScriptCommand::parse("keyboard open").unwrap(),
            Some(ScriptCommand::Keyboard { hidden: false })
        );
        assert_eq!(
            ScriptCommand::parse("ringer vibrate").unwrap(),
            Some(ScriptCommand::Ringer(RingerMode::Vibrate))
        );
    }

    #[test]
    fn test_parse_set_keeps_descriptor_intact() {
        let line = "set lockscreen_custom_sms_intent #Intent;component=org.example.sms/.Inbox;end";
        assert_eq!(
            ScriptCommand::parse(line).unwrap(),
            Some(ScriptCommand::Set(
                SettingKey::CustomSmsIntent,
                Value::from("#Intent;component=org.example.sms/.Inbox;end")
            ))
        );
        assert_eq!(
            ScriptCommand::parse("set lockscreen_targets 5").unwrap(),
            Some(ScriptCommand::Set(SettingKey::Targets, Value::from(5)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(ScriptCommand::parse("trigger"), Err(Error::Script(_))));
        assert!(matches!(ScriptCommand::parse("trigger x"), Err(Error::Script(_))));
        assert!(matches!(ScriptCommand::parse("fly away"), Err(Error::Script(_))));
        assert!(matches!(ScriptCommand::parse("set no_such_key 1"), Err(Error::Script(_))));
    }

    #[test]
    fn test_widget_choice() {
        let inflater = DemoInflater::new(WidgetChoice::Auto);
        assert_eq!(inflater.widget(), WidgetChoice::MultiWave);
        let forced = DemoInflater::new(WidgetChoice::Wave);
        assert_eq!(forced.widget(), WidgetChoice::Wave);
    }

    #[test]
    fn test_callback_queues_requests() {
        let requests = HostRequests::default();
        let mut callback = QueuedCallback::new(requests.clone());
        callback.go_to_unlock_screen();
        callback.poke_wakelock(None);
        callback.recreate_me(DeviceConfiguration::default());
        let queued: Vec<_> = requests.borrow().iter().copied().collect();
        assert_eq!(
            queued,
            vec![HostRequest::Unlock, HostRequest::Recreate(DeviceConfiguration::default())]
        );
    }
}
