use ab_glyph::FontRef;
use cell_core::{Contour, Highlight, ImageOps, Moments};
use image::{GrayImage, RgbImage};

use crate::config::VisionConfig;
use crate::error::VisionResult;
use crate::{contours, drawing, preprocessing, threshold};

/// `ImageOps` backed by the `image` / `imageproc` crates.
#[derive(Debug, Clone)]
pub struct ImageprocOps {
    config: VisionConfig,
    font: FontRef<'static>,
}

impl ImageprocOps {
    /// Creates the operations set after validating the configuration and
    /// loading the label font
    pub fn new(config: VisionConfig) -> VisionResult<Self> {
        config.validate()?;
        let font = drawing::load_label_font()?;
        tracing::debug!(config = %config.summary(), "image operations ready");
        Ok(Self { config, font })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }
}

impl ImageOps for ImageprocOps {
    fn blur(&self, image: &GrayImage) -> GrayImage {
        preprocessing::gaussian_blur(image, self.config.kernel_size, self.config.sigma)
    }

    fn otsu_threshold(&self, image: &GrayImage) -> GrayImage {
        threshold::otsu_mask(image)
    }

    fn external_contours(&self, mask: &GrayImage) -> Vec<Contour> {
        contours::external_contours(mask)
    }

    fn moments(&self, contour: &Contour) -> Moments {
        cell_features::contour_moments(&contour.points)
    }

    fn draw_contour(&self, canvas: &mut RgbImage, contour: &Contour, color: Highlight) {
        drawing::draw_closed_polyline(canvas, contour, self.config.stroke_width, color);
    }

    fn put_label(&self, canvas: &mut RgbImage, text: &str, origin: (i32, i32), color: Highlight) {
        drawing::draw_label(canvas, &self.font, text, origin, self.config.label_scale, color);
    }
}
