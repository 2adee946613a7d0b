//! Contract between the dialog controller and whatever renders the sheet.
//!
//! The controller issues commands (`present`, `begin_exit_animation`,
//! `unmount`); the renderer answers with [`SurfaceEvent`]s through the
//! [`SurfaceLink`] it received when the sheet was presented.

use compact_str::CompactString;
use tokio::sync::mpsc;
use tracing::warn;

use crate::controller::dialog::SurfaceLink;
use crate::model::{dialog_id::DialogId, sheet::SnapPoint};

/// Events a presentation surface delivers back to its dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The backdrop behind the sheet was tapped.
    BackdropPressed,
    /// The exit animation finished, or the user dragged the sheet closed.
    ExitAnimationComplete,
}

/// Everything a renderer needs to show one open cycle of a dialog.
#[derive(Debug, Clone)]
pub struct PresentRequest {
    pub id: DialogId,
    pub index: usize,
    /// Detent for `index`; `None` for content-sized sheets.
    pub snap_point: Option<SnapPoint>,
    pub test_id: Option<CompactString>,
    pub link: SurfaceLink,
}

/// Renderer side of a dialog. Never called while dialog state is locked, so
/// implementations may deliver events synchronously from inside a command.
pub trait PresentationSurface: Send + Sync {
    /// Make the sheet visible and start its entry animation.
    fn present(&self, request: PresentRequest);

    /// Start the exit animation. Must eventually be followed by exactly one
    /// `SurfaceEvent::ExitAnimationComplete` on the cycle's link.
    fn begin_exit_animation(&self, id: &DialogId);

    /// The owning dialog is gone; drop any state kept for it.
    fn unmount(&self, _id: &DialogId) {}
}

/// Command stream produced by [`ChannelSurface`].
#[derive(Debug)]
pub enum SurfaceCommand {
    Present(PresentRequest),
    BeginExit(DialogId),
    Unmount(DialogId),
}

/// Surface that forwards every command onto an unbounded channel, for a
/// renderer running as its own task (see `SheetAnimator`).
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<SurfaceCommand>,
}

impl ChannelSurface {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, command: SurfaceCommand) {
        if let Err(mpsc::error::SendError(command)) = self.tx.send(command) {
            warn!(?command, "surface receiver dropped; command lost");
        }
    }
}

impl PresentationSurface for ChannelSurface {
    fn present(&self, request: PresentRequest) {
        self.forward(SurfaceCommand::Present(request));
    }

    fn begin_exit_animation(&self, id: &DialogId) {
        self.forward(SurfaceCommand::BeginExit(id.clone()));
    }

    fn unmount(&self, id: &DialogId) {
        self.forward(SurfaceCommand::Unmount(id.clone()));
    }
}
