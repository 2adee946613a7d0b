//! ``overlay-core/src/controller/animator.rs``
//! ============================================================================
//! # SheetAnimator: timed stand-in renderer
//!
//! Consumes the command stream of a [`ChannelSurface`](crate::view::surface::ChannelSurface)
//! and answers every `BeginExit` with `ExitAnimationComplete` once the
//! configured exit duration has elapsed. Used by the demo binary and by
//! headless hosts that have no real sheet renderer.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time};
use tracing::{debug, trace, warn};

use crate::controller::dialog::SurfaceLink;
use crate::model::dialog_id::DialogId;
use crate::view::surface::{SurfaceCommand, SurfaceEvent};

pub struct SheetAnimator {
    commands: mpsc::UnboundedReceiver<SurfaceCommand>,
    exit_duration: Duration,
    links: HashMap<DialogId, SurfaceLink>,
}

impl SheetAnimator {
    #[must_use]
    pub fn new(commands: mpsc::UnboundedReceiver<SurfaceCommand>, exit_duration: Duration) -> Self {
        Self {
            commands,
            exit_duration,
            links: HashMap::new(),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every sender of the command channel is gone.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        debug!(tracked = self.links.len(), "surface channel closed; animator stopped");
    }

    fn handle(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::Present(request) => {
                trace!(dialog = %request.id, index = request.index, "sheet presented");
                self.links.insert(request.id, request.link);
            }

            SurfaceCommand::BeginExit(id) => {
                let Some(link) = self.links.remove(&id) else {
                    warn!(dialog = %id, "exit requested for a sheet that was never presented");
                    return;
                };

                let delay = self.exit_duration;
                tokio::spawn(async move {
                    time::sleep(delay).await;
                    if !link.send(SurfaceEvent::ExitAnimationComplete) {
                        debug!(dialog = %id, "exit completion arrived after the cycle ended");
                    }
                });
            }

            SurfaceCommand::Unmount(id) => {
                self.links.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use crate::controller::dialog::Dialog;
    use crate::model::{
        callbacks::CloseCallback, lifecycle::OpenOptions, lifecycle::Phase,
        registry::DialogRegistry,
    };
    use crate::view::surface::{ChannelSurface, PresentationSurface};

    const EXIT: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(5);

    fn setup() -> (Arc<DialogRegistry>, Arc<dyn PresentationSurface>, JoinHandle<()>) {
        let (surface, rx) = ChannelSurface::new();
        let handle = SheetAnimator::new(rx, EXIT).spawn();
        let surface: Arc<dyn PresentationSurface> = Arc::new(surface);
        (Arc::new(DialogRegistry::new()), surface, handle)
    }

    #[tokio::test]
    async fn test_close_completes_after_exit_animation() {
        let (registry, surface, _animator) = setup();
        let dialog = Dialog::builder(Arc::clone(&registry), surface).build();
        let control = dialog.control();

        let (done_tx, done_rx) = oneshot::channel();
        control.open(OpenOptions::default());
        control.close(Some(CloseCallback::new(move || {
            let _ = done_tx.send(());
        })));
        assert!(registry.is_open(dialog.id()));

        time::timeout(WAIT, done_rx).await.unwrap().unwrap();

        assert_eq!(dialog.phase(), Phase::Idle);
        assert!(!registry.is_open(dialog.id()));
    }

    #[tokio::test]
    async fn test_registry_watch_follows_animated_close() {
        let (registry, surface, _animator) = setup();
        let dialog = Dialog::builder(Arc::clone(&registry), surface).build();
        let mut any_open = registry.subscribe();

        dialog.control().open(OpenOptions::default());
        assert!(*any_open.borrow_and_update());

        dialog.control().close(None);
        time::timeout(WAIT, any_open.changed()).await.unwrap().unwrap();
        assert!(!*any_open.borrow());
        assert_eq!(dialog.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_animator_stops_when_surfaces_are_gone() {
        let (surface, rx) = ChannelSurface::new();
        let handle = SheetAnimator::new(rx, EXIT).spawn();

        drop(surface);
        time::timeout(WAIT, handle).await.unwrap().unwrap();
    }
}
