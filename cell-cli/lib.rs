use std::path::{Path, PathBuf};

use cell_core::{Contour, ImageOps};
use cell_features::FeatureExtractor;
use image::{GrayImage, ImageReader, RgbImage};
use tracing::{debug, info};

pub mod annotate;
pub mod config;
pub mod error;
pub mod report;

pub use annotate::annotate;
pub use cell_core::{self, FeatureRecord, Moments};
pub use cell_vision::{self, ImageprocOps, OpsBuilder, VisionConfig};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use report::{ColumnStats, Describe, ReportTable};

/// Read the image at `path` as 8-bit grayscale.
///
/// Any failure to open or decode is reported as `ImageNotFound` carrying the
/// absolute path.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> AnalysisResult<GrayImage> {
    let path = path.as_ref();
    let full_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!(path = %full_path.display(), "Reading image");

    let not_found = |reason: String| AnalysisError::ImageNotFound {
        path: full_path.clone(),
        reason,
    };
    let reader = ImageReader::open(path)
        .map_err(|e| not_found(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| not_found(e.to_string()))?;
    let image = reader.decode().map_err(|e| not_found(e.to_string()))?;
    Ok(image.to_luma8())
}

/// In-memory result of one pass over an image
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Binary foreground mask (0 or 255)
    pub mask: GrayImage,
    pub contours: Vec<Contour>,
    pub features: ReportTable,
    pub annotated: RgbImage,
}

impl Analysis {
    pub fn cell_count(&self) -> usize {
        self.contours.len()
    }
}

/// What a completed run wrote
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input: PathBuf,
    pub annotated_path: PathBuf,
    pub report_path: PathBuf,
    pub cell_count: usize,
    pub stats: Describe,
}

/// Segmentation and morphometry pipeline over an `ImageOps` backend
pub struct CellAnalyzer<O: ImageOps> {
    ops: O,
    config: AnalysisConfig,
    extractor: FeatureExtractor,
}

impl CellAnalyzer<ImageprocOps> {
    /// Analyzer whose image operations are built from `config.vision`
    pub fn from_config(config: AnalysisConfig) -> AnalysisResult<Self> {
        let ops = ImageprocOps::new(config.vision.clone())?;
        Self::new(ops, config)
    }
}

impl<O: ImageOps> CellAnalyzer<O> {
    /// Validate the configuration and set up the feature extraction pool.
    ///
    /// Every image stage runs on `ops` as given; `config.vision` only takes
    /// effect through [`CellAnalyzer::from_config`].
    pub fn new(ops: O, config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let extractor = FeatureExtractor::new(config.n_threads)?;
        debug!(threads = extractor.threads(), "{}", config.summary());
        Ok(Self {
            ops,
            config,
            extractor,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Blur, threshold, trace, measure and annotate `image`.
    pub fn analyze(&self, image: &GrayImage) -> Analysis {
        let blurred = self.ops.blur(image);
        let mask = self.ops.otsu_threshold(&blurred);
        let contours = self.ops.external_contours(&mask);
        let features = ReportTable::new(self.extractor.extract(&contours));
        let annotated = annotate(&self.ops, image, &contours, self.config.highlight());

        debug!(
            width = image.width(),
            height = image.height(),
            cells = contours.len(),
            "Analysis complete"
        );

        Analysis {
            mask,
            contours,
            features,
            annotated,
        }
    }

    /// Load the configured input, analyze it, and write both artifacts.
    ///
    /// Nothing is written when the input cannot be loaded.
    pub fn run(&self) -> AnalysisResult<RunSummary> {
        let image = load_grayscale(&self.config.input)?;
        let analysis = self.analyze(&image);

        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|source| AnalysisError::CreateOutputDir {
            path: output_dir.clone(),
            source,
        })?;

        let annotated_path = self.config.annotated_path();
        analysis
            .annotated
            .save(&annotated_path)
            .map_err(|source| AnalysisError::WriteImage {
                path: annotated_path.clone(),
                source,
            })?;
        info!(path = %annotated_path.display(), "Annotated image saved");

        let report_path = self.config.report_path();
        analysis.features.save_csv(&report_path)?;
        info!(path = %report_path.display(), "Cell features saved");

        let stats = analysis.features.describe();
        info!(cells = analysis.cell_count(), "Total cells detected");
        info!("Summary stats:\n{stats}");

        Ok(RunSummary {
            input: self.config.input.clone(),
            annotated_path,
            report_path,
            cell_count: analysis.cell_count(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cell_core::{Highlight, Point};
    use image::{DynamicImage, Luma, Rgb};
    use proptest::prelude::*;

    fn disks(width: u32, height: u32, centers: &[(i32, i32)], r: i32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = centers.iter().any(|&(cx, cy)| {
                let dx = x as i32 - cx;
                let dy = y as i32 - cy;
                dx * dx + dy * dy <= r * r
            });
            Luma([if inside { 200 } else { 20 }])
        })
    }

    fn analyzer() -> CellAnalyzer<ImageprocOps> {
        let mut config = AnalysisConfig::default();
        config.n_threads = 2;
        CellAnalyzer::from_config(config).unwrap()
    }

    #[test]
    fn test_uniform_image_has_no_cells() {
        let image = GrayImage::from_pixel(32, 32, Luma([30]));
        let analysis = analyzer().analyze(&image);

        assert!(analysis.mask.pixels().all(|p| p[0] == 0));
        assert!(analysis.contours.is_empty());
        assert!(analysis.features.is_empty());
        assert_eq!(analysis.annotated, DynamicImage::ImageLuma8(image).into_rgb8());

        let mut csv = Vec::new();
        analysis.features.write_csv(&mut csv).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "Cell_ID,Area,Perimeter,Circularity\n");
    }

    #[test]
    fn test_single_disk_is_round() {
        let image = disks(48, 48, &[(24, 24)], 14);
        let analysis = analyzer().analyze(&image);

        assert_eq!(analysis.cell_count(), 1);
        let cell = analysis.features.records()[0];
        assert_eq!(cell.cell_id, 1);
        assert!((cell.circularity - 1.0).abs() <= 0.1, "circularity {}", cell.circularity);
        assert!(cell.area > 400.0 && cell.area < 800.0, "area {}", cell.area);

        // Boundary and label are painted green on top of the gray background
        let green = Rgb([0, 255, 0]);
        assert!(analysis.annotated.pixels().any(|p| *p == green));
        assert_eq!(*analysis.annotated.get_pixel(0, 0), Rgb([20, 20, 20]));
    }

    #[test]
    fn test_two_disks_in_raster_order() {
        let image = disks(120, 60, &[(30, 30), (90, 30)], 12);
        let analysis = analyzer().analyze(&image);

        let ids: Vec<u32> = analysis.features.records().iter().map(|r| r.cell_id).collect();
        assert_eq!(ids, vec![1, 2]);
        for r in analysis.features.records() {
            assert!(r.area > 0.0);
            assert!(r.perimeter > 0.0);
        }
        // Same row of tops, so the left disk is discovered first
        assert!(analysis.contours[0].points.iter().all(|p| p.x < 60));
        assert!(analysis.contours[1].points.iter().all(|p| p.x >= 60));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let image = disks(120, 60, &[(30, 30), (90, 30)], 12);
        let a = analyzer();
        let first = a.analyze(&image);
        let second = a.analyze(&image);
        assert_eq!(first.mask, second.mask);
        assert_eq!(first.contours, second.contours);
        assert_eq!(first.features, second.features);
        assert_eq!(first.annotated, second.annotated);
    }

    #[test]
    fn test_vision_settings_reach_the_stages() {
        let image = disks(48, 48, &[(24, 24)], 14);
        let green = |img: &RgbImage| img.pixels().filter(|p| **p == Rgb([0, 255, 0])).count();

        let mut thin = AnalysisConfig::default();
        thin.vision.stroke_width = 1;
        let mut thick = AnalysisConfig::default();
        thick.vision.stroke_width = 8;

        let thin = CellAnalyzer::from_config(thin).unwrap();
        let thick = CellAnalyzer::from_config(thick).unwrap();
        assert_eq!(thick.ops().config().stroke_width, 8);

        let a = thin.analyze(&image);
        let b = thick.analyze(&image);
        assert_ne!(a.annotated, b.annotated);
        assert!(green(&b.annotated) > green(&a.annotated));
        // Same segmentation, only the overlay differs
        assert_eq!(a.features, b.features);
    }

    /// Backend that ignores the pixels and reports canned contours
    struct FakeOps {
        contours: Vec<Contour>,
    }

    impl ImageOps for FakeOps {
        fn blur(&self, image: &GrayImage) -> GrayImage {
            image.clone()
        }

        fn otsu_threshold(&self, image: &GrayImage) -> GrayImage {
            GrayImage::new(image.width(), image.height())
        }

        fn external_contours(&self, _mask: &GrayImage) -> Vec<Contour> {
            self.contours.clone()
        }

        fn moments(&self, contour: &Contour) -> Moments {
            cell_features::contour_moments(&contour.points)
        }

        fn draw_contour(&self, canvas: &mut RgbImage, contour: &Contour, color: Highlight) {
            for p in &contour.points {
                canvas.put_pixel(p.x as u32, p.y as u32, color);
            }
        }

        fn put_label(&self, _canvas: &mut RgbImage, _text: &str, _origin: (i32, i32), _color: Highlight) {}
    }

    #[test]
    fn test_pipeline_with_fake_backend() {
        let ops = FakeOps {
            contours: vec![
                Contour::from(vec![(1, 1), (4, 1), (4, 4), (1, 4)]),
                Contour::from(vec![(6, 6)]),
            ],
        };
        let analyzer = CellAnalyzer::new(ops, AnalysisConfig::default()).unwrap();
        let analysis = analyzer.analyze(&GrayImage::new(8, 8));

        let records = analysis.features.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].area, 9.0);
        assert_eq!(records[0].perimeter, 12.0);
        assert!((records[0].circularity - std::f64::consts::PI / 4.0).abs() < 1e-9);
        assert_eq!(records[1].area, 0.0);
        assert_eq!(records[1].circularity, 0.0);
        assert_eq!(*analysis.annotated.get_pixel(6, 6), Rgb([0, 255, 0]));
        assert_eq!(*analysis.annotated.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.vision.stroke_width = 0;
        assert!(matches!(
            CellAnalyzer::from_config(config),
            Err(AnalysisError::Vision(_))
        ));
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let config = AnalysisConfig::new(dir.path().join("absent.tif"), &output_dir);
        let err = CellAnalyzer::from_config(config)
            .unwrap()
            .run()
            .unwrap_err();

        match err {
            AnalysisError::ImageNotFound { path, .. } => {
                assert!(path.is_absolute());
                assert!(path.ends_with("absent.tif"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_undecodable_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("garbage.png");
        std::fs::write(&input, b"not an image").unwrap();
        assert!(matches!(load_grayscale(&input), Err(AnalysisError::ImageNotFound { .. })));
    }

    #[test]
    fn test_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cells.png");
        disks(120, 60, &[(30, 30), (90, 30)], 12).save(&input).unwrap();

        let output_dir = dir.path().join("results").join("today");
        let analyzer = CellAnalyzer::from_config(AnalysisConfig::new(&input, &output_dir)).unwrap();
        let summary = analyzer.run().unwrap();

        assert_eq!(summary.cell_count, 2);
        assert_eq!(summary.stats.column("Cell_ID").unwrap().count, 2);
        let annotated = image::open(&summary.annotated_path).unwrap().to_rgb8();
        assert_eq!(annotated.dimensions(), (120, 60));

        let csv = std::fs::read_to_string(&summary.report_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Cell_ID,Area,Perimeter,Circularity");
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));

        // Re-running into the existing directory is fine
        assert_eq!(analyzer.run().unwrap().cell_count, 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_ids_follow_discovery_order(n in 0usize..40) {
            let contours = (0..n)
                .map(|i| Contour::new(vec![Point::new(i as i32, 0), Point::new(i as i32, 2), Point::new(i as i32 + 1, 2)]))
                .collect();
            let analyzer = CellAnalyzer::new(FakeOps { contours }, AnalysisConfig::default()).unwrap();
            let analysis = analyzer.analyze(&GrayImage::new(48, 4));
            let ids: Vec<u32> = analysis.features.records().iter().map(|r| r.cell_id).collect();
            prop_assert_eq!(ids, (1..=n as u32).collect::<Vec<_>>());
            prop_assert_eq!(analysis.contours.len(), n);
        }
    }
}
