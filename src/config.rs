use std::path::Path;

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::AppError;
use crate::map::{validate_tolerance, ImageBorders, RegionBounds, DEFAULT_TOLERANCE};

pub const DEFAULT_MAP_URL: &str = "https://info.chmi.cz/bio/maps/kliste_1.png";

/// Where the map comes from and how it is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub image_url: String,
    /// Local copy of the map; takes precedence over `image_url` when set.
    pub image_path: Option<String>,
    pub region: RegionBounds,
    pub borders: ImageBorders,
    pub tolerance: f64,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            image_url: DEFAULT_MAP_URL.to_string(),
            image_path: None,
            region: RegionBounds {
                lat_min: 48.55,
                lat_max: 51.05,
                lon_min: 12.09,
                lon_max: 18.87,
            },
            borders: ImageBorders::new(150, 170, 270, 300),
            tolerance: DEFAULT_TOLERANCE,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Defaults, then the optional TOML file, then `KLISTATA__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, environment: Environment) -> Result<Self, AppError> {
        // Every key is seeded so a file or variable may override a single nested field.
        let defaults = config::Config::try_from(&Configuration::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.region.validate()?;
        validate_tolerance(self.tolerance)?;
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, AppError> {
        self.log_level.parse().map_err(|_| {
            AppError::Config(ConfigError::Message(format!(
                "unknown log_level {:?}, expected one of trace, debug, info, warn, error",
                self.log_level
            )))
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix("KLISTATA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
