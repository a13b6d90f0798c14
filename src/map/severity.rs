use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::map::color;

pub const DEFAULT_TOLERANCE: f64 = 20.0;

/// Accepts only finite tolerances above zero.
pub fn validate_tolerance(tolerance: f64) -> Result<f64, AppError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(tolerance)
    } else {
        Err(AppError::InvalidTolerance(tolerance))
    }
}

/// Risk tiers from the published legend, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    NoWarning,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Severity {
    /// Declaration order. Classification walks this and the first match wins.
    pub const ALL: [Severity; 5] = [
        Severity::NoWarning,
        Severity::Low,
        Severity::Moderate,
        Severity::High,
        Severity::VeryHigh,
    ];

    pub const fn reference_color(self) -> Rgb<u8> {
        match self {
            Severity::NoWarning => Rgb([0xff, 0xfb, 0xd8]),
            Severity::Low => Rgb([0xfe, 0xe3, 0x97]),
            Severity::Moderate => Rgb([0xfe, 0xac, 0x47]),
            Severity::High => Rgb([0xdf, 0x6e, 0x23]),
            Severity::VeryHigh => Rgb([0x9a, 0x45, 0x1e]),
        }
    }

    pub fn hex(self) -> String {
        color::to_hex(self.reference_color())
    }

    pub fn id(self) -> &'static str {
        severity_message(Some(self)).0
    }

    pub fn message(self) -> &'static str {
        severity_message(Some(self)).1
    }

    /// Returns the first legend tier strictly closer than `tolerance` to `color`.
    pub fn classify(color: Rgb<u8>, tolerance: f64) -> Option<Severity> {
        Self::ALL
            .into_iter()
            .find(|severity| color::distance(color, severity.reference_color()) < tolerance)
    }
}

/// Maps a classification to its `(id, text)` pair. Unmatched colors are "0".
pub fn severity_message(severity: Option<Severity>) -> (&'static str, &'static str) {
    match severity {
        Some(Severity::NoWarning) => ("1", "Nepatrná"),
        Some(Severity::Low) => ("2", "Mírná"),
        Some(Severity::Moderate) => ("3", "Střední"),
        Some(Severity::High) => ("4", "Vysoká"),
        Some(Severity::VeryHigh) => ("5", "Mimořádná"),
        None => ("0", "Neznámá"),
    }
}
