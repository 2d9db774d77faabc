//! Flick keyguard - unlock widget dispatch for the Flick lock screen
//!
//! Routes gestures on the lock screen's unlock widget to actions: unlock,
//! ring mode toggle, camera, phone/browser, messaging, or a user-configured
//! application. Which action sits on which target depends on the configured
//! target set, the screen size, the camera policy and per-position overrides
//! stored in settings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   Host (compositor / demo binary on a calloop loop)       │
//! └──────────────────────────────────────────────────────────┘
//!        │ surface events, keys, config, lifecycle
//! ┌──────────────────────────────────────────────────────────┐
//! │   keyguard::LockScreen                                    │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ input        │  │ dispatch     │  │ settings bridge │  │
//! │  │ (adapters)   │  │ + layout     │  │                 │  │
//! │  └──────────────┘  └──────────────┘  └─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!        │ ringer, launcher, device policy, timers
//! ┌──────────────────────────────────────────────────────────┐
//! │   system (pactl, sh -c launchers, settings file)          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use flick_keyguard::keyguard::dispatch::{resolve_action, TargetSetId};
//! use flick_keyguard::keyguard::actions::CustomOverrides;
//!
//! let dispatch = resolve_action(TargetSetId::Eight, 6, false, &CustomOverrides::new());
//! assert!(dispatch.dismiss);
//! ```

pub mod demo;
pub mod error;
pub mod input;
pub mod keyguard;
pub mod system;

pub use error::{Error, Result};
pub use keyguard::{DeviceConfiguration, Key, LockScreen, Services};
