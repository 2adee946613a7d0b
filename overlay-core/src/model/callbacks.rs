//! Close callbacks and the guarded drain that runs them.

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::warn;

use crate::error::{CallbackFault, DialogError};
use crate::model::dialog_id::DialogId;

type CallbackFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

pub(crate) type CallbackQueue = SmallVec<[CloseCallback; 2]>;

/// Zero-argument callback fired once the close animation has finished.
pub struct CloseCallback(CallbackFn);

impl CloseCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// Callback whose error is logged and discarded at the drain site.
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self(Box::new(f))
    }

    fn invoke(self) -> Result<(), CallbackFault> {
        guarded(self.0)
    }
}

impl fmt::Debug for CloseCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CloseCallback(..)")
    }
}

/// Outcome of one close-complete transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub invoked: usize,
    pub failed: usize,
    /// The sheet was dismissed by the surface (pan-down) without `close()`.
    pub dismissed_by_gesture: bool,
}

/// Run user code, turning both `Err` and panics into a [`CallbackFault`].
pub(crate) fn guarded<F>(f: F) -> Result<(), CallbackFault>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CallbackFault::Failed(err)),
        Err(payload) => Err(CallbackFault::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Invoke every queued callback in push order. A failing callback is logged
/// and skipped; it never stops the rest of the queue.
pub(crate) fn drain(dialog: &DialogId, queue: CallbackQueue, report: &mut DrainReport) {
    for (position, callback) in queue.into_iter().enumerate() {
        report.invoked += 1;
        if let Err(fault) = callback.invoke() {
            report.failed += 1;
            let err = DialogError::callback_fault(dialog, position, fault);
            warn!(dialog = %dialog, error = %err, "close callback failed; continuing");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> CompactString {
    if let Some(s) = payload.downcast_ref::<&str>() {
        CompactString::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        CompactString::from(s.as_str())
    } else {
        CompactString::const_new("non-string panic payload")
    }
}
