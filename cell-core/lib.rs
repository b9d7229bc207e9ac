use image::{GrayImage, Rgb, RgbImage};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate on a contour
pub type Point = imageproc::point::Point<i32>;

/// Drawing colour for overlays
pub type Highlight = Rgb<u8>;

/// Default overlay colour (green)
pub const DEFAULT_HIGHLIGHT: [u8; 3] = [0, 255, 0];

/// Closed boundary of one foreground region, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive point pairs including the closing edge back to the first point.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

impl From<Vec<(i32, i32)>> for Contour {
    fn from(points: Vec<(i32, i32)>) -> Self {
        Self::new(points.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }
}

/// Zeroth and first order spatial moments of a contour polygon
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Centroid `(m10/m00, m01/m00)`, or `None` for a degenerate polygon.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            None
        } else {
            Some((self.m10 / self.m00, self.m01 / self.m00))
        }
    }
}

/// Measurements of one detected cell
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureRecord {
    /// 1-based, assigned in contour discovery order
    pub cell_id: u32,
    pub area: f64,
    pub perimeter: f64,
    pub circularity: f64,
}

/// Image processing primitives the pipeline is built on.
///
/// Every stage takes its input by reference and returns a new value, except
/// the two drawing operations which paint onto a canvas the caller owns.
pub trait ImageOps {
    /// Smooth the grid to suppress high-frequency noise.
    fn blur(&self, image: &GrayImage) -> GrayImage;

    /// Global two-class threshold; foreground samples become 255, the rest 0.
    fn otsu_threshold(&self, image: &GrayImage) -> GrayImage;

    /// Outermost boundaries of the foreground regions, in a stable raster order.
    fn external_contours(&self, mask: &GrayImage) -> Vec<Contour>;

    fn moments(&self, contour: &Contour) -> Moments;

    /// Stroke the closed boundary onto the canvas.
    fn draw_contour(&self, canvas: &mut RgbImage, contour: &Contour, color: Highlight);

    /// Draw `text` with its baseline-left corner at `origin`.
    fn put_label(&self, canvas: &mut RgbImage, text: &str, origin: (i32, i32), color: Highlight);
}

impl<T: ImageOps + ?Sized> ImageOps for &T {
    fn blur(&self, image: &GrayImage) -> GrayImage {
        (**self).blur(image)
    }

    fn otsu_threshold(&self, image: &GrayImage) -> GrayImage {
        (**self).otsu_threshold(image)
    }

    fn external_contours(&self, mask: &GrayImage) -> Vec<Contour> {
        (**self).external_contours(mask)
    }

    fn moments(&self, contour: &Contour) -> Moments {
        (**self).moments(contour)
    }

    fn draw_contour(&self, canvas: &mut RgbImage, contour: &Contour, color: Highlight) {
        (**self).draw_contour(canvas, contour, color)
    }

    fn put_label(&self, canvas: &mut RgbImage, text: &str, origin: (i32, i32), color: Highlight) {
        (**self).put_label(canvas, text, origin, color)
    }
}

/// Worker count used when none is configured
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Build a local Rayon pool with the given number of workers (0 picks the default).
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    let n_threads = if n_threads == 0 { default_threads() } else { n_threads };
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
}
