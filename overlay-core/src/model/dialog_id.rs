//! Opaque, stable identity for one logical dialog.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

const GENERATED_ID_LEN: usize = 12;

/// Identity of a dialog control. Stable for the lifetime of the dialog that
/// owns it; used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogId(CompactString);

impl DialogId {
    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(CompactString::from(nanoid::nanoid!(GENERATED_ID_LEN)))
    }

    /// Caller-chosen id, e.g. a test id that must be predictable.
    #[must_use]
    pub fn named(name: impl Into<CompactString>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
