//! Unlock widget input - gesture surfaces and their adapters
//!
//! This module provides:
//! - The per-gesture state machine shared by every surface
//! - Capability traits for the three physical surfaces (sliding tab, wave, multi-wave)
//! - Adapters that turn surface events into lock screen actions

mod gesture;
mod surfaces;
mod widgets;

pub use gesture::*;
pub use surfaces::*;
pub use widgets::*;
