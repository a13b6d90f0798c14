use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to fetch map from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },
    #[error("Failed to decode map image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Invalid region bounds: {0}")]
    InvalidRegion(String),
    #[error("Borders {borders} leave no plot area in a {width}x{height} image")]
    InvalidGeometry {
        borders: String,
        width: u32,
        height: u32,
    },
    #[error("Coordinate ({latitude}, {longitude}) is outside the mapped region")]
    OutOfRegion { latitude: f64, longitude: f64 },
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} map raster")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("Invalid tolerance {0}: must be finite and above zero")]
    InvalidTolerance(f64),
    #[error("Invalid color {0:?}: expected six hex digits")]
    InvalidColor(String),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn fetch(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Fetch {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
