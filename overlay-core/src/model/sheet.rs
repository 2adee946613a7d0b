//! Sheet detent configuration passed through to the presentation surface.

use std::{fmt, str::FromStr};

use compact_str::{CompactString, ToCompactString};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::error::DialogError;

/// One detent the sheet can rest at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SnapPoint {
    /// Share of the window height, `1..=100`.
    Percent(u8),
    /// Absolute height in layout points.
    Points(u32),
}

impl SnapPoint {
    pub const FULL: Self = Self::Percent(100);
}

impl FromStr for SnapPoint {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || DialogError::InvalidSnapPoint(trimmed.to_compact_string());

        if let Some(percent) = trimmed.strip_suffix('%') {
            let value: u8 = percent.trim().parse().map_err(|_| invalid())?;
            if !(1..=100).contains(&value) {
                return Err(invalid());
            }
            return Ok(Self::Percent(value));
        }

        let value: u32 = trimmed.parse().map_err(|_| invalid())?;
        if value == 0 {
            return Err(invalid());
        }
        Ok(Self::Points(value))
    }
}

impl TryFrom<String> for SnapPoint {
    type Error = DialogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SnapPoint> for String {
    fn from(point: SnapPoint) -> Self {
        point.to_string()
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Points(p) => write!(f, "{p}"),
        }
    }
}

/// Per-dialog sheet options fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOptions {
    /// Empty means the sheet sizes itself to its content (single detent).
    pub snap_points: SmallVec<[SnapPoint; 4]>,
    pub test_id: Option<CompactString>,
}

impl SheetOptions {
    #[must_use]
    pub fn with_snap_points(mut self, points: impl IntoIterator<Item = SnapPoint>) -> Self {
        self.snap_points = points.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_test_id(mut self, test_id: impl Into<CompactString>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    /// Number of addressable open indices; never zero.
    #[inline]
    #[must_use]
    pub fn detents(&self) -> usize {
        self.snap_points.len().max(1)
    }

    #[must_use]
    pub fn snap_point(&self, index: usize) -> Option<SnapPoint> {
        self.snap_points.get(index).copied()
    }
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            snap_points: smallvec![SnapPoint::FULL],
            test_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snap_points() {
        assert_eq!("100%".parse::<SnapPoint>().unwrap(), SnapPoint::Percent(100));
        assert_eq!(" 45 % ".parse::<SnapPoint>().unwrap(), SnapPoint::Percent(45));
        assert_eq!("320".parse::<SnapPoint>().unwrap(), SnapPoint::Points(320));

        for bad in ["0%", "101%", "0", "-5", "half", ""] {
            assert!(bad.parse::<SnapPoint>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_snap_point_string_form() {
        let points = vec![SnapPoint::Percent(50), SnapPoint::Points(640)];
        let json = serde_json::to_string(&points).unwrap();
        assert_eq!(json, r#"["50%","640"]"#);

        let err = serde_json::from_str::<Vec<SnapPoint>>(r#"["150%"]"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_detents_never_zero() {
        assert_eq!(SheetOptions::default().detents(), 1);

        let dynamic = SheetOptions::default().with_snap_points([]);
        assert_eq!(dynamic.detents(), 1);
        assert_eq!(dynamic.snap_point(0), None);

        let stepped = SheetOptions::default()
            .with_snap_points([SnapPoint::Percent(40), SnapPoint::FULL])
            .with_test_id("quote-picker");
        assert_eq!(stepped.detents(), 2);
        assert_eq!(stepped.snap_point(1), Some(SnapPoint::FULL));
        assert_eq!(stepped.test_id.as_deref(), Some("quote-picker"));
    }
}
