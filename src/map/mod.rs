pub mod color;
mod geometry;
mod severity;

pub use geometry::{GeoTransform, ImageBorders, RegionBounds};
pub use severity::{severity_message, validate_tolerance, Severity, DEFAULT_TOLERANCE};
