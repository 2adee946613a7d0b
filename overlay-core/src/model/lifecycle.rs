//! Open/close state machine for a single dialog.
//!
//! `Idle -> Open -> Closing -> Idle`. This type only decides transitions; the
//! controller in `controller::dialog` applies the side effects (registry,
//! surface commands, callback drain) around it.

use std::mem;

use crate::model::callbacks::{CallbackQueue, CloseCallback};

/// Where a dialog is in its open/close cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Open {
        index: usize,
    },
    Closing {
        index: usize,
    },
}

impl Phase {
    #[inline]
    #[must_use]
    pub const fn open_index(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Open { index } | Self::Closing { index } => Some(index),
        }
    }

    /// Signed detent index as sheet renderers expect it: `-1` when closed.
    #[must_use]
    pub fn raw_index(self) -> isize {
        self.open_index()
            .map_or(-1, |index| isize::try_from(index).unwrap_or(isize::MAX))
    }

    #[inline]
    #[must_use]
    pub const fn is_closing(self) -> bool {
        matches!(self, Self::Closing { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Open-time parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Target snap index; `None` opens at the default detent (0).
    pub index: Option<usize>,
}

impl OpenOptions {
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self { index: Some(index) }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OpenOutcome {
    Opened {
        index: usize,
        generation: u64,
        /// Set when the requested index was past the last detent.
        clamped_from: Option<usize>,
    },
    Ignored(Phase),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CloseOutcome {
    /// First close of this cycle: the exit animation must start.
    BeginExit,
    /// Already closing; the callback (if any) joined the queue.
    Joined { queued: usize },
    /// Nothing to close.
    Ignored { dropped_callback: bool },
}

pub(crate) struct Completion {
    pub callbacks: CallbackQueue,
    pub gesture: bool,
}

pub(crate) struct Teardown {
    pub phase: Phase,
    pub discarded: CallbackQueue,
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    phase: Phase,
    callbacks: CallbackQueue,
    generation: u64,
    detents: usize,
    mounted: bool,
}

impl Lifecycle {
    pub(crate) fn new(detents: usize) -> Self {
        Self {
            phase: Phase::Idle,
            callbacks: CallbackQueue::new(),
            generation: 0,
            detents: detents.max(1),
            mounted: true,
        }
    }

    #[inline]
    pub(crate) const fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub(crate) fn pending(&self) -> usize {
        self.callbacks.len()
    }

    /// True while `generation` names the live, non-idle cycle.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.mounted && self.generation == generation && !self.phase.is_idle()
    }

    pub(crate) fn open(&mut self, requested: Option<usize>) -> OpenOutcome {
        if !self.mounted || !self.phase.is_idle() {
            return OpenOutcome::Ignored(self.phase);
        }

        let wanted = requested.unwrap_or(0);
        let index = wanted.min(self.detents - 1);

        self.generation += 1;
        self.phase = Phase::Open { index };

        OpenOutcome::Opened {
            index,
            generation: self.generation,
            clamped_from: (index != wanted).then_some(wanted),
        }
    }

    pub(crate) fn close(&mut self, callback: Option<CloseCallback>) -> CloseOutcome {
        match self.phase {
            Phase::Idle => CloseOutcome::Ignored {
                dropped_callback: callback.is_some(),
            },
            Phase::Open { index } => {
                self.callbacks.extend(callback);
                self.phase = Phase::Closing { index };
                CloseOutcome::BeginExit
            }
            Phase::Closing { .. } => {
                self.callbacks.extend(callback);
                CloseOutcome::Joined {
                    queued: self.callbacks.len(),
                }
            }
        }
    }

    /// Close-complete transition. `generation` pins the signal to one cycle;
    /// `None` means "the current one".
    pub(crate) fn complete(&mut self, generation: Option<u64>) -> Option<Completion> {
        if generation.is_some_and(|g| g != self.generation) {
            return None;
        }

        let gesture = match self.phase {
            Phase::Idle => return None,
            Phase::Open { .. } => true,
            Phase::Closing { .. } => false,
        };

        self.phase = Phase::Idle;
        Some(Completion {
            callbacks: mem::take(&mut self.callbacks),
            gesture,
        })
    }

    /// Unmount. Pending callbacks are handed back to be dropped unfired.
    pub(crate) fn teardown(&mut self) -> Teardown {
        self.mounted = false;
        Teardown {
            phase: mem::take(&mut self.phase),
            discarded: mem::take(&mut self.callbacks),
        }
    }
}
