//! overlay-core/src/config.rs
//! ============================================================================
//! # Config: dialog defaults and logging settings
//!
//! Loads and saves settings as TOML from the platform config directory using
//! the [`directories`](https://docs.rs/directories) crate. A missing file is
//! replaced by the defaults, which are written back so users can edit them.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let sheet = config.sheet.sheet_options();
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{DialogError, DialogResult};
use crate::logging::LoggerConfig;
use crate::model::sheet::{SheetOptions, SnapPoint};

/// Defaults applied to dialogs that do not configure their own sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Detents, e.g. `["50%", "100%"]`. Empty sizes sheets to their content.
    pub snap_points: Vec<SnapPoint>,

    /// How long the timed animator takes to play an exit animation.
    #[serde(with = "humantime_serde")]
    pub exit_animation: Duration,
}

impl SheetConfig {
    #[must_use]
    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions::default().with_snap_points(self.snap_points.iter().copied())
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_points: vec![SnapPoint::FULL],
            exit_animation: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheet: SheetConfig,

    #[serde(default)]
    pub logging: LoggerConfig,
}

impl Config {
    /// Load from the platform config dir, creating the file with defaults if
    /// it does not exist yet.
    pub async fn load() -> DialogResult<Self> {
        let path = Self::config_path()?;
        if TokioFs::try_exists(&path)
            .await
            .map_err(|e| DialogError::config_io(&path, e))?
        {
            Self::load_from(&path).await
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );
            let config = Self::default();
            config.save_to(&path).await?;
            Ok(config)
        }
    }

    pub async fn save(&self) -> DialogResult<()> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn load_from(path: &Path) -> DialogResult<Self> {
        info!("Loading config from {}", path.display());
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|e| DialogError::config_io(path, e))?;
        Ok(toml::from_str(&text)?)
    }

    pub async fn save_to(&self, path: &Path) -> DialogResult<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| DialogError::config_io(parent, e))?;
        }

        let text = toml::to_string_pretty(self)?;
        TokioFs::write(path, text)
            .await
            .map_err(|e| DialogError::config_io(path, e))
    }

    pub fn config_path() -> DialogResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> DialogResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "example", "OverlayCore").ok_or(DialogError::NoConfigDir)?;
        Ok(dirs.config_dir().to_path_buf())
    }
}
