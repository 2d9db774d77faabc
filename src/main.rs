//! Flick keyguard - headless lock screen driven by a gesture script
//!
//! Reads gesture, key and configuration commands from stdin (see
//! `flick_keyguard::demo`) and runs them through the lock screen on a
//! calloop event loop. Ringer changes go to pactl and launches to the
//! commands in `~/.local/state/flick/lockscreen_launchers.json`.

use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use calloop::channel::{self, Event};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flick_keyguard::demo::{DemoInflater, HostRequest, HostRequests, QueuedCallback, ScriptCommand, WidgetChoice};
use flick_keyguard::keyguard::layout::{Orientation, ScreenSizeClass};
use flick_keyguard::keyguard::settings::{FileSettings, SettingsStore};
use flick_keyguard::system::{
    CommandLauncher, DeferredTask, HostEnvironment, LauncherConfig, LoopScheduler, PactlRinger, TimerId,
};
use flick_keyguard::{DeviceConfiguration, LockScreen, Services};

/// How often the settings file is checked for outside edits
const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "flick-keyguard")]
#[command(about = "Flick lock screen unlock widget, driven by a gesture script on stdin", long_about = None)]
struct Args {
    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,

    /// Settings file (default: ~/.local/state/flick/lockscreen.json)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Use the large-screen layouts
    #[arg(long)]
    large: bool,

    /// Start in landscape orientation
    #[arg(long)]
    landscape: bool,

    /// Unlock widget to put in the layout
    #[arg(short, long, value_enum, default_value_t = WidgetChoice::Auto)]
    widget: WidgetChoice,

    /// Device configuration disables menu-key unlock
    #[arg(long)]
    no_menu_key: bool,

    /// Opening the hardware keyboard skips the lock screen
    #[arg(long)]
    keyboard_bypass: bool,
}

struct App {
    handle: LoopHandle<'static, App>,
    args: Args,
    settings: Rc<FileSettings>,
    launchers: LauncherConfig,
    requests: HostRequests,
    configuration: DeviceConfiguration,
    lock: Option<LockScreen>,
    running: bool,
}

impl App {
    fn size(&self) -> ScreenSizeClass {
        if self.args.large {
            ScreenSizeClass::Large
        } else {
            ScreenSizeClass::Normal
        }
    }

    fn build_lock(&mut self) -> flick_keyguard::Result<()> {
        let store: Rc<dyn SettingsStore> = self.settings.clone();
        let services = Services {
            settings: store.clone(),
            ringer: Box::new(PactlRinger::new()),
            launcher: Box::new(CommandLauncher::new(self.launchers.clone())),
            device: Box::new(HostEnvironment::new(
                store,
                self.args.no_menu_key,
                self.args.keyboard_bypass,
            )),
            scheduler: Box::new(LoopScheduler::new(self.handle.clone(), fire_deferred)),
            callback: Box::new(QueuedCallback::new(self.requests.clone())),
        };

        let mut inflater = DemoInflater::new(self.args.widget);
        let mut lock = LockScreen::new(self.configuration, self.size(), services, &mut inflater)?;
        lock.on_attached(self.configuration);
        lock.on_resume();
        self.lock = Some(lock);
        Ok(())
    }

    /// Act on unlock and recreate requests the lock screen queued
    fn drain_requests(&mut self) {
        loop {
            let request = self.requests.borrow_mut().pop_front();
            let Some(request) = request else { break };
            match request {
                HostRequest::Unlock => {
                    info!("Unlock screen requested; lock screen paused until `resume`");
                    if let Some(lock) = self.lock.as_mut() {
                        lock.on_pause();
                    }
                }
                HostRequest::Recreate(configuration) => {
                    info!(?configuration, "Recreating lock screen");
                    if let Some(mut old) = self.lock.take() {
                        old.clean_up();
                    }
                    self.configuration = configuration;
                    if let Err(e) = self.build_lock() {
                        error!("Failed to recreate lock screen: {}", e);
                        self.running = false;
                    }
                }
            }
        }
    }

    fn run_line(&mut self, line: &str) {
        let command = match ScriptCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        debug!(?command, "Script command");

        if command == ScriptCommand::Quit {
            self.running = false;
            return;
        }
        let Some(lock) = self.lock.as_mut() else {
            return;
        };

        match command {
            ScriptCommand::Surface(event) => lock.handle_surface_event(event),
            ScriptCommand::Key(key) => {
                lock.on_key_down(key);
            }
            ScriptCommand::Ringer(mode) => lock.on_ringer_mode_changed(mode),
            ScriptCommand::Rotate(orientation) => {
                let configuration = DeviceConfiguration {
                    orientation,
                    ..self.configuration
                };
                lock.update_configuration(configuration);
            }
            ScriptCommand::Keyboard { hidden } => {
                self.configuration.keyboard_hidden = hidden;
                lock.update_configuration(self.configuration);
            }
            ScriptCommand::Set(key, value) => {
                if value.is_null() {
                    self.settings.remove(key);
                } else {
                    self.settings.put(key, value);
                }
                if let Err(e) = self.settings.save() {
                    warn!("Failed to save settings: {}", e);
                }
                // Other keys are read when they are used
                if key.affects_presentation() {
                    lock.notify_settings_changed();
                    lock.flush_settings();
                }
            }
            ScriptCommand::Pause => lock.on_pause(),
            ScriptCommand::Resume => lock.on_resume(),
            ScriptCommand::Quit => {}
        }
        self.drain_requests();
    }

    fn poll_settings(&mut self) {
        if !self.settings.changed_on_disk() {
            return;
        }
        if let Err(e) = self.settings.reload() {
            warn!("Failed to reload settings: {}", e);
            return;
        }
        if let Some(lock) = self.lock.as_mut() {
            lock.notify_settings_changed();
            lock.flush_settings();
        }
        self.drain_requests();
    }
}

fn fire_deferred(app: &mut App, id: TimerId, task: DeferredTask) {
    if let Some(lock) = app.lock.as_mut() {
        lock.run_deferred(id, task);
    }
    app.drain_requests();
}

fn main() -> Result<()> {
    // Set up panic hook to log panics before crashing
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Ok(home) = std::env::var("HOME") {
            let crash_log = format!("{}/.local/state/flick/crash.log", home);
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                use std::io::Write;
                let _ = writeln!(f, "[{}] PANIC (keyguard): {}", chrono::Local::now(), panic_info);
            }
        }
    }));

    let log_dir = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("flick");

    std::fs::create_dir_all(&log_dir).ok();

    let args = Args::parse();

    let file_appender = rolling::daily(&log_dir, "keyguard.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if args.debug {
        "debug,flick_keyguard=debug"
    } else {
        "warn,flick_keyguard=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!(log_path = %log_dir.display(), "Flick keyguard starting");

    let settings_path = args
        .settings
        .clone()
        .or_else(FileSettings::default_path)
        .unwrap_or_else(|| PathBuf::from("/tmp/flick/lockscreen.json"));
    let settings = Rc::new(FileSettings::open(settings_path)?);
    info!(path = %settings.path().display(), "Lock screen settings");

    let mut event_loop: EventLoop<'static, App> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let configuration = DeviceConfiguration {
        orientation: if args.landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        },
        keyboard_hidden: true,
    };

    let mut app = App {
        handle: handle.clone(),
        args,
        settings,
        launchers: LauncherConfig::load(),
        requests: HostRequests::default(),
        configuration,
        lock: None,
        running: true,
    };
    app.build_lock()?;

    // Script lines arrive from a reader thread
    let (sender, script) = channel::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    handle
        .insert_source(script, |event, _, app| match event {
            Event::Msg(line) => app.run_line(&line),
            Event::Closed => {
                info!("Script finished");
                app.running = false;
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert script source: {}", e.error))?;

    handle
        .insert_source(Timer::from_duration(SETTINGS_POLL_INTERVAL), |_, _, app| {
            app.poll_settings();
            TimeoutAction::ToDuration(SETTINGS_POLL_INTERVAL)
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert settings timer: {}", e.error))?;

    info!("Entering event loop");
    while app.running {
        if let Err(e) = event_loop.dispatch(Some(Duration::from_millis(100)), &mut app) {
            error!("Event loop error: {:?}", e);
        }
    }

    if let Some(mut lock) = app.lock.take() {
        lock.clean_up();
    }
    info!("Flick keyguard exiting");
    Ok(())
}
