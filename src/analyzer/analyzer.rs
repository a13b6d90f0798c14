use chrono::{DateTime, Utc};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, info, info_span, warn, Span};

use crate::analyzer::AnalysisResult;
use crate::error::AppError;
use crate::map::{
    color, validate_tolerance, GeoTransform, ImageBorders, RegionBounds, Severity,
    DEFAULT_TOLERANCE,
};
use crate::source::MapSource;

/// Owns one decoded risk map and answers point lookups against it.
///
/// Immutable after construction; share it behind an `Arc` for concurrent use.
pub struct Analyzer {
    image: RgbImage,
    transform: GeoTransform,
    tolerance: f64,
    source_name: String,
    fetched_at: DateTime<Utc>,
    span: Span,
}

impl Analyzer {
    /// Reads the map from `source` once and decodes it.
    pub async fn fetch(
        source: &dyn MapSource,
        bounds: RegionBounds,
        borders: ImageBorders,
    ) -> Result<Self, AppError> {
        bounds.validate()?;
        let bytes = source.fetch().await?;
        Self::from_bytes(source.name(), &bytes, bounds, borders)
    }

    pub fn from_bytes(
        source_name: impl Into<String>,
        bytes: &[u8],
        bounds: RegionBounds,
        borders: ImageBorders,
    ) -> Result<Self, AppError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(source_name, image, bounds, borders)
    }

    pub fn from_image(
        source_name: impl Into<String>,
        image: DynamicImage,
        bounds: RegionBounds,
        borders: ImageBorders,
    ) -> Result<Self, AppError> {
        let source_name = source_name.into();
        // Palette and RGBA maps are flattened once so sampling is a plain read.
        let image = image.to_rgb8();
        let (width, height) = image.dimensions();
        let transform = GeoTransform::new(bounds, borders, width, height)?;

        let span = info_span!("analyzer", source = %source_name);
        span.in_scope(|| info!(width, height, ?bounds, ?borders, "map loaded"));

        Ok(Self {
            image,
            transform,
            tolerance: DEFAULT_TOLERANCE,
            source_name,
            fetched_at: Utc::now(),
            span,
        })
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, AppError> {
        self.tolerance = validate_tolerance(tolerance)?;
        Ok(self)
    }

    /// Replaces the span every lookup runs in, so callers can attach their own context.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn bounds(&self) -> RegionBounds {
        self.transform.bounds()
    }

    pub fn borders(&self) -> ImageBorders {
        self.transform.borders()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn geo_to_pixel(&self, latitude: f64, longitude: f64) -> Result<(u32, u32), AppError> {
        self.transform.geo_to_pixel(latitude, longitude)
    }

    pub fn sample(&self, x: u32, y: u32) -> Result<Rgb<u8>, AppError> {
        let (width, height) = self.image.dimensions();
        self.image
            .get_pixel_checked(x, y)
            .copied()
            .ok_or(AppError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            })
    }

    pub fn classify(&self, color: Rgb<u8>) -> Option<Severity> {
        Severity::classify(color, self.tolerance)
    }

    pub fn analyze(&self, latitude: f64, longitude: f64) -> Result<AnalysisResult, AppError> {
        let _entered = self.span.enter();

        let (x, y) = self.geo_to_pixel(latitude, longitude)?;
        let sampled = self.sample(x, y)?;
        let severity = self.classify(sampled);

        debug!(
            latitude,
            longitude,
            x,
            y,
            color = %color::to_hex(sampled),
            ?severity,
            "sampled map"
        );
        if severity.is_none() {
            warn!(x, y, color = %color::to_hex(sampled), "pixel matches no legend color");
        }

        Ok(AnalysisResult::new(latitude, longitude, severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileSource;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    const PRAGUE: (f64, f64) = (50.07926370796739, 14.430981701794192);
    const BACKGROUND: Rgb<u8> = Rgb([0, 255, 255]);

    fn czech_bounds() -> RegionBounds {
        RegionBounds::new(48.55, 51.05, 12.09, 18.87).unwrap()
    }

    fn czech_borders() -> ImageBorders {
        ImageBorders::new(150, 170, 270, 300)
    }

    /// 800x1000 cyan map with a solid `fill` block covering pixels 300..330 x 420..450.
    fn synthetic_map(fill: Rgb<u8>) -> DynamicImage {
        let image = ImageBuffer::from_fn(800, 1000, |x, y| {
            if (300..330).contains(&x) && (420..450).contains(&y) {
                fill
            } else {
                BACKGROUND
            }
        });
        DynamicImage::ImageRgb8(image)
    }

    fn analyzer_for(fill: Rgb<u8>) -> Analyzer {
        Analyzer::from_image("synthetic", synthetic_map(fill), czech_bounds(), czech_borders())
            .unwrap()
    }

    fn encode_png(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn prague_block_reports_its_severity() {
        for severity in Severity::ALL {
            let analyzer = analyzer_for(severity.reference_color());
            let result = analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap();
            assert_eq!(result.severity, Some(severity));
            assert_eq!(result.severity_id, severity.id());
            assert_eq!(result.latitude, PRAGUE.0);
            assert_eq!(result.longitude, PRAGUE.1);
        }
    }

    #[test]
    fn moderate_block_yields_id_three() {
        let analyzer = analyzer_for(Severity::Moderate.reference_color());
        let result = analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap();
        assert_eq!(result.severity_id, "3");
        assert_eq!(result.severity_message, "Střední");
    }

    #[test]
    fn unmatched_background_is_unknown_not_error() {
        let analyzer = analyzer_for(Severity::High.reference_color());
        // Brno, well outside the painted block
        let result = analyzer.analyze(49.1951, 16.6068).unwrap();
        assert_eq!(result.severity_id, "0");
        assert_eq!(result.severity_message, "Neznámá");
    }

    #[test]
    fn out_of_region_coordinate_is_an_error() {
        let analyzer = analyzer_for(Severity::Low.reference_color());
        // Vienna
        assert!(matches!(
            analyzer.analyze(48.2082, 16.3738),
            Err(AppError::OutOfRegion { .. })
        ));
    }

    #[test]
    fn sampling_outside_raster_is_an_error() {
        let analyzer = analyzer_for(Severity::Low.reference_color());
        assert_eq!(analyzer.sample(310, 430).unwrap(), Severity::Low.reference_color());
        assert!(matches!(
            analyzer.sample(800, 0),
            Err(AppError::PixelOutOfBounds { x: 800, y: 0, .. })
        ));
        assert!(matches!(
            analyzer.sample(0, 1000),
            Err(AppError::PixelOutOfBounds { .. })
        ));
    }

    #[test]
    fn tolerance_can_be_widened() {
        let off_by_thirty = Rgb([0xfe, 0xac, 0x47 + 30]);
        let analyzer = analyzer_for(off_by_thirty);
        assert_eq!(analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap().severity_id, "0");

        let analyzer = analyzer_for(off_by_thirty).with_tolerance(35.0).unwrap();
        assert_eq!(analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap().severity_id, "3");
    }

    #[test]
    fn unusable_tolerance_is_refused() {
        let exact_high = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            800,
            1000,
            Severity::High.reference_color(),
        ));
        for bad in [f64::NAN, 0.0, -1.0, f64::INFINITY] {
            let analyzer = Analyzer::from_image(
                "synthetic",
                exact_high.clone(),
                czech_bounds(),
                czech_borders(),
            )
            .unwrap();
            assert!(matches!(
                analyzer.with_tolerance(bad),
                Err(AppError::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn rgba_maps_are_flattened() {
        let image = ImageBuffer::from_pixel(800, 1000, Rgba([0xdf, 0x6e, 0x23, 255]));
        let analyzer = Analyzer::from_image(
            "rgba",
            DynamicImage::ImageRgba8(image),
            czech_bounds(),
            czech_borders(),
        )
        .unwrap();
        assert_eq!(analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap().severity_id, "4");
    }

    #[test]
    fn decodes_png_payload() {
        let bytes = encode_png(&synthetic_map(Severity::VeryHigh.reference_color()));
        let analyzer =
            Analyzer::from_bytes("memory", &bytes, czech_bounds(), czech_borders()).unwrap();
        assert_eq!(analyzer.dimensions(), (800, 1000));
        assert_eq!(analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap().severity_id, "5");
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        assert!(matches!(
            Analyzer::from_bytes("memory", b"<html>oops</html>", czech_bounds(), czech_borders()),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn tiny_image_is_rejected_at_construction() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(100, 100, BACKGROUND));
        assert!(matches!(
            Analyzer::from_image("tiny", image, czech_bounds(), czech_borders()),
            Err(AppError::InvalidGeometry { .. })
        ));
    }

    #[tokio::test]
    async fn fetches_through_a_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            encode_png(&synthetic_map(Severity::NoWarning.reference_color())),
        )
        .unwrap();

        let source = FileSource::new(file.path());
        let analyzer = Analyzer::fetch(&source, czech_bounds(), czech_borders())
            .await
            .unwrap();
        assert_eq!(analyzer.source_name(), file.path().display().to_string());
        assert_eq!(analyzer.analyze(PRAGUE.0, PRAGUE.1).unwrap().severity_id, "1");
    }

    #[tokio::test]
    async fn invalid_bounds_fail_before_fetching() {
        let source = FileSource::new("/definitely/not/here.png");
        let bounds = RegionBounds {
            lat_min: 51.05,
            lat_max: 48.55,
            lon_min: 12.09,
            lon_max: 18.87,
        };
        assert!(matches!(
            Analyzer::fetch(&source, bounds, czech_borders()).await,
            Err(AppError::InvalidRegion(_))
        ));
    }

    #[test]
    fn analyzer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }
}
