//! Native gesture surfaces
//!
//! The three physical unlock widgets are drawn and animated by the host. The
//! lock screen only sees them through these traits, plus the raw listener
//! callbacks each one reports, which `translate` turns into `SurfaceEvent`s.

use super::gesture::SurfaceEvent;
use crate::keyguard::layout::{TabResources, TargetArt};

/// Listener code for "no handle grabbed", shared by every surface
pub const NO_HANDLE: i32 = 0;

/// Sliding tab handle codes
pub const LEFT_HANDLE: usize = 1;
pub const RIGHT_HANDLE: usize = 2;

/// Wave handle code
pub const CENTER_HANDLE: usize = 10;

/// Opaque identity of an inflated view, used by the host to attach it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Two-handle slider: unlock on the left, ring toggle on the right
pub trait SlidingTabSurface {
    fn view_handle(&self) -> ViewHandle;
    fn set_hold_after_trigger(&mut self, left: bool, right: bool);
    fn set_left_tab(&mut self, art: TabResources);
    fn set_left_hint(&mut self, hint: &str);
    fn set_right_tab(&mut self, art: TabResources);
    fn set_right_hint(&mut self, hint: &str);
    fn reset(&mut self, animate: bool);
}

/// Single centre handle dragged outwards
pub trait WaveSurface {
    fn view_handle(&self) -> ViewHandle;
    fn reset(&mut self, animate: bool);
}

/// Radial ring of 4, 6 or 8 targets
pub trait MultiWaveSurface {
    fn view_handle(&self) -> ViewHandle;
    fn set_target_art(&mut self, art: &TargetArt);
    fn reset(&mut self, animate: bool);
    /// Play the idle hint animation
    fn ping(&mut self);
}

/// The unlock widget view found in an inflated layout
pub enum InflatedWidget {
    SlidingTab(Box<dyn SlidingTabSurface>),
    Wave(Box<dyn WaveSurface>),
    MultiWave(Box<dyn MultiWaveSurface>),
    /// Any other view; carries its class name for the error report
    Other(String),
}

impl InflatedWidget {
    pub fn kind_name(&self) -> &str {
        match self {
            InflatedWidget::SlidingTab(_) => "SlidingTab",
            InflatedWidget::Wave(_) => "WaveView",
            InflatedWidget::MultiWave(_) => "MultiWaveView",
            InflatedWidget::Other(name) => name,
        }
    }
}

/// Raw listener callback as a surface reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    GrabbedStateChange(i32),
    Trigger(i32),
    /// Finger lifted from `handle` without triggering
    Released(i32),
    /// The host took the gesture away
    Cancel,
}

/// Convert a listener callback into a surface event. Negative codes are
/// not valid handles or targets and are dropped.
pub fn translate(event: NativeEvent) -> Option<SurfaceEvent> {
    match event {
        NativeEvent::GrabbedStateChange(NO_HANDLE) => Some(SurfaceEvent::GrabChanged(None)),
        NativeEvent::GrabbedStateChange(code) => {
            usize::try_from(code).ok().map(|h| SurfaceEvent::GrabChanged(Some(h)))
        }
        NativeEvent::Trigger(code) => usize::try_from(code).ok().map(SurfaceEvent::Triggered),
        NativeEvent::Released(code) => usize::try_from(code).ok().map(SurfaceEvent::Released),
        NativeEvent::Cancel => Some(SurfaceEvent::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_grab_codes() {
        assert_eq!(
            translate(NativeEvent::GrabbedStateChange(NO_HANDLE)),
            Some(SurfaceEvent::GrabChanged(None))
        );
        assert_eq!(
            translate(NativeEvent::GrabbedStateChange(RIGHT_HANDLE as i32)),
            Some(SurfaceEvent::GrabChanged(Some(RIGHT_HANDLE)))
        );
        assert_eq!(translate(NativeEvent::GrabbedStateChange(-1)), None);
    }

    #[test]
    fn test_translate_trigger() {
        assert_eq!(
            translate(NativeEvent::Trigger(CENTER_HANDLE as i32)),
            Some(SurfaceEvent::Triggered(CENTER_HANDLE))
        );
        assert_eq!(translate(NativeEvent::Trigger(-3)), None);
        assert_eq!(translate(NativeEvent::Cancel), Some(SurfaceEvent::Cancelled));
    }

    #[test]
    fn test_other_widget_keeps_class_name() {
        let other = InflatedWidget::Other("android.widget.Button".into());
        assert_eq!(other.kind_name(), "android.widget.Button");
    }
}
