pub mod analyzer;
pub mod config;
pub mod error;
pub mod map;
pub mod service;
pub mod source;

pub use analyzer::{AnalysisResult, Analyzer};
pub use config::Configuration;
pub use error::AppError;
pub use map::{ImageBorders, RegionBounds, Severity};
pub use service::{Coordinate, RiskService};
pub use source::{FileSource, HttpSource, MapSource};
