//! src/error.rs
//! ============================================================================
//! # `DialogError`: error type for the dialog coordinator
//!
//! Caller misuse (double open, close while idle) is never an error here; those
//! calls are tolerated no-ops. The variants below cover the failures that are
//! absorbed and logged at the drain site, and the fallible edges of the crate
//! (configuration files and logger setup).

use compact_str::CompactString;
use std::{io, path::PathBuf};
use thiserror::Error;

use crate::logging::LoggingError;
use crate::model::dialog_id::DialogId;

pub type DialogResult<T> = Result<T, DialogError>;

/// Error type for dialog lifecycle, configuration and logging operations.
#[derive(Debug, Error)]
pub enum DialogError {
    /// A queued close callback returned an error.
    #[error("Close callback #{position} of dialog {dialog} failed: {reason}")]
    CallbackFailed {
        dialog: DialogId,
        position: usize,
        reason: String,
    },

    /// A queued close callback panicked.
    #[error("Close callback #{position} of dialog {dialog} panicked: {message}")]
    CallbackPanicked {
        dialog: DialogId,
        position: usize,
        message: CompactString,
    },

    /// The dialog's `on_close` observer panicked.
    #[error("on_close observer of dialog {dialog} panicked: {message}")]
    ObserverPanicked {
        dialog: DialogId,
        message: CompactString,
    },

    /// Snap point string that is neither `N%` (1..=100) nor a point count.
    #[error("Invalid snap point '{0}'")]
    InvalidSnapPoint(CompactString),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// No home/config directory could be resolved for this platform.
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl DialogError {
    /// Build the error recorded for a failing close callback.
    pub(crate) fn callback_fault(dialog: &DialogId, position: usize, fault: CallbackFault) -> Self {
        match fault {
            CallbackFault::Failed(err) => Self::CallbackFailed {
                dialog: dialog.clone(),
                position,
                reason: format!("{err:#}"),
            },
            CallbackFault::Panicked(message) => Self::CallbackPanicked {
                dialog: dialog.clone(),
                position,
                message,
            },
        }
    }

    /// Build the error recorded for a failing `on_close` observer.
    pub(crate) fn observer_fault(dialog: &DialogId, fault: CallbackFault) -> Self {
        let message = match fault {
            CallbackFault::Failed(err) => CompactString::from(format!("{err:#}")),
            CallbackFault::Panicked(message) => message,
        };
        Self::ObserverPanicked {
            dialog: dialog.clone(),
            message,
        }
    }

    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

/// How a guarded piece of user code failed.
#[derive(Debug)]
pub(crate) enum CallbackFault {
    Failed(anyhow::Error),
    Panicked(CompactString),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_fault_messages() {
        let id = DialogId::named("repost");

        let failed = DialogError::callback_fault(
            &id,
            1,
            CallbackFault::Failed(anyhow::anyhow!("network gone")),
        );
        assert_eq!(
            failed.to_string(),
            "Close callback #1 of dialog repost failed: network gone"
        );
        assert!(matches!(failed, DialogError::CallbackFailed { position: 1, .. }));

        let panicked =
            DialogError::callback_fault(&id, 0, CallbackFault::Panicked("boom".into()));
        assert!(matches!(panicked, DialogError::CallbackPanicked { position: 0, .. }));
    }

    #[test]
    fn test_config_io_error_names_the_path() {
        let err = DialogError::config_io("/nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, DialogError::ConfigIo { .. }));
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_logging_errors_convert_transparently() {
        let err: DialogError = LoggingError::InvalidLevel("loud".into()).into();
        assert!(matches!(err, DialogError::Logging(LoggingError::InvalidLevel(_))));
        assert_eq!(err.to_string(), "Invalid log level 'loud'");
    }
}
