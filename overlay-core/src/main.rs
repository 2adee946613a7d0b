//! src/main.rs
//! Scripted walk through the dialog lifecycle against the timed animator.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::{
    sync::{oneshot, watch},
    time,
};
use tracing::{info, warn};

use overlay_core::{
    CloseCallback, Config, Dialog, DialogId, DialogRegistry, OpenOptions,
    controller::SheetAnimator,
    logging::LoggerBuilder,
    view::{ChannelSurface, PresentationSurface, SurfaceEvent},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().await.context("Failed to load configuration")?;
    let _guard = LoggerBuilder::new()
        .with_config(config.logging.clone())
        .build()
        .context("Failed to initialize logging")?;

    info!("Starting overlay demo");

    let registry = Arc::new(DialogRegistry::new());
    let (surface, commands) = ChannelSurface::new();
    let animator = SheetAnimator::new(commands, config.sheet.exit_animation).spawn();
    let surface: Arc<dyn PresentationSurface> = Arc::new(surface);

    let mut inert = registry.subscribe();
    let watcher = tokio::spawn({
        let mut inert = inert.clone();
        async move {
            while inert.changed().await.is_ok() {
                let value = *inert.borrow_and_update();
                info!(inert = value, "background content inert flag changed");
            }
        }
    });

    let patience = config.sheet.exit_animation * 4 + Duration::from_secs(1);

    let repost = Dialog::builder(Arc::clone(&registry), Arc::clone(&surface))
        .id(DialogId::named("repost-picker"))
        .sheet(config.sheet.sheet_options())
        .on_close(|| info!("repost picker observer: closed"))
        .build();
    let control = repost.control();

    // Two call sites close the same sheet before the animation is done.
    control.open(OpenOptions::default());
    let (done_tx, done_rx) = oneshot::channel();
    control.close(Some(CloseCallback::new(|| info!("repost: starting quote composer"))));
    control.close(Some(CloseCallback::new(move || {
        let _ = done_tx.send(());
    })));
    time::timeout(patience, done_rx)
        .await
        .context("close callbacks never fired")??;
    info!(phase = ?repost.phase(), "first cycle finished");

    // Reopen and dismiss through the backdrop.
    control.open(OpenOptions::at(0));
    repost.dispatch(SurfaceEvent::BackdropPressed);
    wait_until_closed(&mut inert, patience).await?;
    info!(phase = ?repost.phase(), "backdrop cycle finished");

    // Unmount while the exit animation is still running.
    let gif = Dialog::builder(Arc::clone(&registry), Arc::clone(&surface))
        .id(DialogId::named("gif-select"))
        .build();
    gif.control().open(OpenOptions::default());
    gif.control().close(Some(CloseCallback::new(|| {
        warn!("gif-select callback ran after unmount");
    })));
    gif.unmount();
    info!(open = registry.open_count(), "gif-select unmounted mid-close");

    // Let any in-flight animation finish before shutting the animator down.
    time::sleep(config.sheet.exit_animation).await;
    drop(repost);
    drop(surface);
    time::timeout(patience, animator)
        .await
        .context("animator did not stop")??;
    watcher.abort();

    info!("Overlay demo finished");
    Ok(())
}

async fn wait_until_closed(inert: &mut watch::Receiver<bool>, patience: Duration) -> Result<()> {
    time::timeout(patience, inert.wait_for(|any_open| !*any_open))
        .await
        .context("dialog never finished closing")?
        .context("registry dropped")?;
    Ok(())
}
