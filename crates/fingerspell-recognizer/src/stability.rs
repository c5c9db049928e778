//! Temporal debounce of per-frame labels.

use fingerspell_core::Label;
use serde::{Deserialize, Serialize};

/// Consecutive identical frames needed before a label is displayed
pub const DEFAULT_STABLE_REQUIRED: u32 = 5;

/// Filter state between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityState {
    /// No hand in view
    Idle,
    /// `label` has been seen on the last `count` frames
    Holding { label: Label, count: u32 },
}

/// Shows a label only after it has held for `stable_required` frames.
///
/// The displayed label stays put while a new candidate is building up,
/// and is cleared as soon as the hand leaves the frame.
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    stable_required: u32,
    state: StabilityState,
    displayed: Option<Label>,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_REQUIRED)
    }
}

impl StabilityFilter {
    pub fn new(stable_required: u32) -> Self {
        Self {
            stable_required: stable_required.max(1),
            state: StabilityState::Idle,
            displayed: None,
        }
    }

    /// Feed one frame; `None` means no hand was detected.
    ///
    /// Returns the label to display after this frame.
    pub fn update(&mut self, label: Option<Label>) -> Option<Label> {
        let Some(label) = label else {
            self.reset();
            return None;
        };

        let count = match self.state {
            StabilityState::Holding { label: held, count } if held == label => {
                count.saturating_add(1)
            }
            _ => 1,
        };
        self.state = StabilityState::Holding { label, count };

        if count >= self.stable_required && self.displayed != Some(label) {
            tracing::debug!("Displaying {} after {} stable frames", label, count);
            self.displayed = Some(label);
        }
        self.displayed
    }

    pub fn reset(&mut self) {
        self.state = StabilityState::Idle;
        self.displayed = None;
    }

    pub fn state(&self) -> StabilityState {
        self.state
    }

    pub fn displayed(&self) -> Option<Label> {
        self.displayed
    }

    pub fn stable_required(&self) -> u32 {
        self.stable_required
    }
}
