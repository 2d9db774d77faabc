//! Per-surface gesture tracking
//!
//! Every surface runs the same small state machine:
//! `Idle -> Grabbed -> {Triggered -> Idle, Released/Cancelled -> Idle}`.
//! A gesture dispatches at most once; a cancelled gesture never dispatches.

/// Event delivered by a gesture surface, already resolved to handle/target indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A handle was grabbed, or `None` when the surface returned to no handle
    GrabChanged(Option<usize>),
    /// The gesture reached a target
    Triggered(usize),
    /// The finger lifted without reaching a target
    Released(usize),
    /// The system took the gesture away (e.g. screen off)
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Grabbed(usize),
    Triggered(usize),
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle
    }
}

#[derive(Debug, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Handle grab changes. Surfaces hold after a trigger, so a grab while
    /// triggered does not start a new gesture; only `None` ends it.
    pub fn grab(&mut self, handle: Option<usize>) {
        self.state = match (self.state, handle) {
            (_, None) => GestureState::Idle,
            (GestureState::Triggered(target), Some(_)) => GestureState::Triggered(target),
            (_, Some(handle)) => GestureState::Grabbed(handle),
        };
    }

    /// Returns true if this trigger should dispatch.
    ///
    /// A trigger straight from `Idle` counts as a full gesture: some surfaces
    /// report only the trigger, never the grab that led to it.
    pub fn trigger(&mut self, target: usize) -> bool {
        match self.state {
            GestureState::Triggered(previous) => {
                tracing::debug!(previous, target, "Ignoring repeated trigger in one gesture");
                false
            }
            GestureState::Idle | GestureState::Grabbed(_) => {
                self.state = GestureState::Triggered(target);
                true
            }
        }
    }

    pub fn release(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}
