//! Dialog lifecycle controller.
//!
//! A [`Dialog`] is owned by the component that mounts the sheet. Callers get a
//! cloneable [`DialogControl`] (`open` / `close` only), content inside the
//! sheet gets a [`DialogContext`] (`close` only), and the renderer gets a
//! [`SurfaceLink`] per open cycle. All three hold weak references, so once the
//! owner is dropped every remaining handle turns into a no-op.
//!
//! Ordering guarantees:
//! - registry entry exists exactly while the dialog is not `Idle`
//! - close callbacks run once each, in push order, after the close-complete
//!   signal and before the `on_close` observer
//! - no user code runs while the state lock is held

use std::{
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::DialogError;
use crate::model::{
    callbacks::{self, CloseCallback, DrainReport},
    dialog_id::DialogId,
    lifecycle::{CloseOutcome, Lifecycle, OpenOptions, OpenOutcome, Phase},
    registry::DialogRegistry,
    sheet::SheetOptions,
};
use crate::view::surface::{PresentRequest, PresentationSurface, SurfaceEvent};

/// Observer fired once per completed close cycle, after all queued callbacks.
pub type OnClose = Arc<dyn Fn() + Send + Sync>;

struct DialogShared {
    id: DialogId,
    state: Mutex<Lifecycle>,
    registry: Arc<DialogRegistry>,
    surface: Arc<dyn PresentationSurface>,
    sheet: SheetOptions,
    on_close: Option<OnClose>,
}

impl DialogShared {
    fn open(self: &Arc<Self>, options: OpenOptions) {
        let request = {
            let mut state = self.state.lock();
            match state.open(options.index) {
                OpenOutcome::Opened {
                    index,
                    generation,
                    clamped_from,
                } => {
                    self.registry.register_open(&self.id);
                    if let Some(requested) = clamped_from {
                        warn!(
                            dialog = %self.id,
                            requested,
                            index,
                            "open index past last snap point; clamped"
                        );
                    }
                    info!(dialog = %self.id, index, generation, "dialog opened");

                    PresentRequest {
                        id: self.id.clone(),
                        index,
                        snap_point: self.sheet.snap_point(index),
                        test_id: self.sheet.test_id.clone(),
                        link: SurfaceLink {
                            shared: Arc::downgrade(self),
                            generation,
                        },
                    }
                }
                OpenOutcome::Ignored(phase) => {
                    debug!(dialog = %self.id, ?phase, "open ignored; dialog already active");
                    return;
                }
            }
        };

        self.surface.present(request);
    }

    fn close(&self, callback: Option<CloseCallback>) {
        let outcome = self.state.lock().close(callback);

        match outcome {
            CloseOutcome::BeginExit => {
                info!(dialog = %self.id, "dialog closing");
                self.surface.begin_exit_animation(&self.id);
            }
            CloseOutcome::Joined { queued } => {
                debug!(dialog = %self.id, queued, "close joined in-flight exit animation");
            }
            CloseOutcome::Ignored { dropped_callback } => {
                debug!(dialog = %self.id, dropped_callback, "close ignored; dialog idle");
            }
        }
    }

    fn complete(&self, generation: Option<u64>) -> Option<DrainReport> {
        let completion = {
            let mut state = self.state.lock();
            let completion = state.complete(generation)?;
            self.registry.register_closed(&self.id);
            completion
        };

        let mut report = DrainReport {
            dismissed_by_gesture: completion.gesture,
            ..DrainReport::default()
        };
        callbacks::drain(&self.id, completion.callbacks, &mut report);

        if let Some(on_close) = &self.on_close {
            if let Err(fault) = callbacks::guarded(|| {
                on_close();
                Ok(())
            }) {
                let err = DialogError::observer_fault(&self.id, fault);
                warn!(dialog = %self.id, error = %err, "on_close observer failed");
            }
        }

        info!(
            dialog = %self.id,
            invoked = report.invoked,
            failed = report.failed,
            gesture = report.dismissed_by_gesture,
            "dialog closed"
        );
        Some(report)
    }

    fn handle_event(&self, generation: Option<u64>, event: SurfaceEvent) -> bool {
        if let Some(generation) = generation {
            if !self.state.lock().is_current(generation) {
                debug!(dialog = %self.id, generation, ?event, "stale surface event ignored");
                return false;
            }
        }

        match event {
            SurfaceEvent::BackdropPressed => {
                self.close(None);
                true
            }
            SurfaceEvent::ExitAnimationComplete => self.complete(generation).is_some(),
        }
    }

    fn teardown(&self) {
        let torn = {
            let mut state = self.state.lock();
            let torn = state.teardown();
            if !torn.phase.is_idle() {
                self.registry.register_closed(&self.id);
            }
            torn
        };

        if !torn.phase.is_idle() {
            info!(
                dialog = %self.id,
                phase = ?torn.phase,
                discarded = torn.discarded.len(),
                "dialog unmounted while active; pending callbacks discarded"
            );
        }
        drop(torn);

        self.surface.unmount(&self.id);
    }
}

/// Owner of one dialog's lifecycle. Dropping it unmounts the dialog.
pub struct Dialog {
    shared: Arc<DialogShared>,
}

impl Dialog {
    #[must_use]
    pub fn builder(
        registry: Arc<DialogRegistry>,
        surface: Arc<dyn PresentationSurface>,
    ) -> DialogBuilder {
        DialogBuilder {
            id: None,
            registry,
            surface,
            sheet: SheetOptions::default(),
            on_close: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &DialogId {
        &self.shared.id
    }

    #[must_use]
    pub fn control(&self) -> DialogControl {
        DialogControl {
            id: self.shared.id.clone(),
            shared: Arc::downgrade(&self.shared),
        }
    }

    #[must_use]
    pub fn context(&self) -> DialogContext {
        DialogContext {
            shared: Arc::downgrade(&self.shared),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase()
    }

    #[must_use]
    pub fn open_index(&self) -> Option<usize> {
        self.phase().open_index()
    }

    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.phase().is_closing()
    }

    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.shared.state.lock().pending()
    }

    #[must_use]
    pub fn sheet(&self) -> &SheetOptions {
        &self.shared.sheet
    }

    /// Close-complete signal for the current cycle. Returns `None` when there
    /// was nothing to complete.
    pub fn on_close_animation_complete(&self) -> Option<DrainReport> {
        self.shared.complete(None)
    }

    /// Deliver a surface event for the current cycle.
    pub fn dispatch(&self, event: SurfaceEvent) -> bool {
        self.shared.handle_event(None, event)
    }

    /// Explicit unmount; same as dropping the owner.
    pub fn unmount(self) {}
}

impl Drop for Dialog {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("id", &self.shared.id)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

pub struct DialogBuilder {
    id: Option<DialogId>,
    registry: Arc<DialogRegistry>,
    surface: Arc<dyn PresentationSurface>,
    sheet: SheetOptions,
    on_close: Option<OnClose>,
}

impl DialogBuilder {
    #[must_use]
    pub fn id(mut self, id: DialogId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn sheet(mut self, sheet: SheetOptions) -> Self {
        self.sheet = sheet;
        self
    }

    #[must_use]
    pub fn on_close<F>(mut self, observer: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(observer));
        self
    }

    #[must_use]
    pub fn build(self) -> Dialog {
        let id = self.id.unwrap_or_else(DialogId::generate);
        debug!(dialog = %id, detents = self.sheet.detents(), "dialog mounted");

        Dialog {
            shared: Arc::new(DialogShared {
                state: Mutex::new(Lifecycle::new(self.sheet.detents())),
                id,
                registry: self.registry,
                surface: self.surface,
                sheet: self.sheet,
                on_close: self.on_close,
            }),
        }
    }
}

/// Caller-facing handle: identity plus `open` / `close`.
#[derive(Clone)]
pub struct DialogControl {
    id: DialogId,
    shared: Weak<DialogShared>,
}

impl DialogControl {
    #[inline]
    #[must_use]
    pub fn id(&self) -> &DialogId {
        &self.id
    }

    /// Open at `options.index` (default detent 0). No-op unless idle.
    pub fn open(&self, options: OpenOptions) {
        match self.shared.upgrade() {
            Some(shared) => shared.open(options),
            None => debug!(dialog = %self.id, "open on unmounted dialog ignored"),
        }
    }

    /// Start closing; `callback` runs after the exit animation completes.
    /// Repeated calls while closing only queue their callbacks.
    pub fn close(&self, callback: Option<CloseCallback>) {
        match self.shared.upgrade() {
            Some(shared) => shared.close(callback),
            None => debug!(dialog = %self.id, "close on unmounted dialog ignored"),
        }
    }
}

impl fmt::Debug for DialogControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogControl")
            .field("id", &self.id)
            .field("mounted", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// Close access for content rendered inside the sheet.
#[derive(Clone)]
pub struct DialogContext {
    shared: Weak<DialogShared>,
}

impl DialogContext {
    pub fn close(&self, callback: Option<CloseCallback>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.close(callback);
        }
    }
}

impl fmt::Debug for DialogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogContext").finish_non_exhaustive()
    }
}

/// Renderer's return channel for one open cycle of one dialog.
#[derive(Clone)]
pub struct SurfaceLink {
    shared: Weak<DialogShared>,
    generation: u64,
}

impl SurfaceLink {
    /// Deliver `event`. Returns `false` if the dialog is gone or the cycle
    /// this link belongs to has already ended.
    pub fn send(&self, event: SurfaceEvent) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.handle_event(Some(self.generation), event))
    }

    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SurfaceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceLink")
            .field("generation", &self.generation)
            .field("live", &(self.shared.strong_count() > 0))
            .finish()
    }
}
