use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Geographic extent covered by the plotted part of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBounds {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self, AppError> {
        let bounds = Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let values = [self.lat_min, self.lat_max, self.lon_min, self.lon_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::InvalidRegion(format!(
                "bounds must be finite, got {:?}",
                self
            )));
        }
        if self.lat_min >= self.lat_max {
            return Err(AppError::InvalidRegion(format!(
                "lat_min {} must be below lat_max {}",
                self.lat_min, self.lat_max
            )));
        }
        if self.lon_min >= self.lon_max {
            return Err(AppError::InvalidRegion(format!(
                "lon_min {} must be below lon_max {}",
                self.lon_min, self.lon_max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

/// Pixel margins between the image edges and the plotted area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageBorders {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl ImageBorders {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Linear mapping from a region onto the plot area of a `width` x `height` raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    bounds: RegionBounds,
    borders: ImageBorders,
    width: u32,
    height: u32,
}

impl GeoTransform {
    pub fn new(
        bounds: RegionBounds,
        borders: ImageBorders,
        width: u32,
        height: u32,
    ) -> Result<Self, AppError> {
        bounds.validate()?;

        let horizontal = borders.left as u64 + borders.right as u64;
        let vertical = borders.top as u64 + borders.bottom as u64;
        if horizontal >= width as u64 || vertical >= height as u64 {
            return Err(AppError::InvalidGeometry {
                borders: format!(
                    "(left {}, right {}, top {}, bottom {})",
                    borders.left, borders.right, borders.top, borders.bottom
                ),
                width,
                height,
            });
        }

        Ok(Self {
            bounds,
            borders,
            width,
            height,
        })
    }

    pub fn bounds(&self) -> RegionBounds {
        self.bounds
    }

    pub fn borders(&self) -> ImageBorders {
        self.borders
    }

    fn plot_width(&self) -> u32 {
        self.width - self.borders.left - self.borders.right
    }

    fn plot_height(&self) -> u32 {
        self.height - self.borders.top - self.borders.bottom
    }

    /// Maps a coordinate to a pixel, truncating toward zero.
    ///
    /// Coordinates outside the region are rejected rather than clamped. The
    /// closed upper edges (`lon_max`, `lat_min`) land on the last plot
    /// column/row instead of one past it.
    pub fn geo_to_pixel(&self, latitude: f64, longitude: f64) -> Result<(u32, u32), AppError> {
        if !self.bounds.contains(latitude, longitude) {
            return Err(AppError::OutOfRegion {
                latitude,
                longitude,
            });
        }

        let b = &self.bounds;
        let plot_w = self.plot_width() as f64;
        let plot_h = self.plot_height() as f64;

        let x = self.borders.left as f64
            + (longitude - b.lon_min) / (b.lon_max - b.lon_min) * plot_w;
        let y = self.borders.top as f64
            + (1.0 - (latitude - b.lat_min) / (b.lat_max - b.lat_min)) * plot_h;

        let last_x = self.borders.left + self.plot_width() - 1;
        let last_y = self.borders.top + self.plot_height() - 1;
        Ok(((x as u32).min(last_x), (y as u32).min(last_y)))
    }
}
