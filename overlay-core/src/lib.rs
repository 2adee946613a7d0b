//! # overlay-core
//!
//! Lifecycle coordinator for bottom-sheet dialogs. Each [`Dialog`] owns one
//! open/close state machine; callers drive it through a [`DialogControl`],
//! the renderer reports back through a [`SurfaceLink`], and a shared
//! [`DialogRegistry`] tracks which dialogs are open so the host can mark
//! background content inert.

pub mod error;

pub mod config;

pub mod logging;

pub mod model {
    pub mod callbacks;
    pub use callbacks::{CloseCallback, DrainReport};

    pub mod dialog_id;
    pub use dialog_id::DialogId;

    pub mod lifecycle;
    pub use lifecycle::{OpenOptions, Phase};

    pub mod registry;
    pub use registry::DialogRegistry;

    pub mod sheet;
    pub use sheet::{SheetOptions, SnapPoint};
}

pub mod controller {
    pub mod animator;
    pub use animator::SheetAnimator;

    pub mod dialog;
    pub use dialog::{Dialog, DialogBuilder, DialogContext, DialogControl, OnClose, SurfaceLink};
}

pub mod view {
    pub mod surface;
    pub use surface::{
        ChannelSurface, PresentRequest, PresentationSurface, SurfaceCommand, SurfaceEvent,
    };
}

pub use config::Config;
pub use controller::{Dialog, DialogControl, SurfaceLink};
pub use error::{DialogError, DialogResult};
pub use model::{CloseCallback, DialogId, DialogRegistry, OpenOptions, Phase};
