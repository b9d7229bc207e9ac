use cell_core::{Contour, FeatureRecord, Moments, Point};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Signed polygon area by the shoelace formula (positive for counter-clockwise
/// winding in a y-up frame).
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
        })
        .sum();
    twice as f64 / 2.0
}

/// Unsigned enclosed area of the contour polygon
pub fn polygon_area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Sum of Euclidean distances between consecutive points, optionally closing the loop.
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points
        .windows(2)
        .map(|w| distance(w[0], w[1]))
        .sum();
    if closed {
        open + distance(points[points.len() - 1], points[0])
    } else {
        open
    }
}

#[inline]
fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// `4π·area / perimeter²`; 0 for a zero perimeter.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter == 0.0 {
        0.0
    } else {
        4.0 * PI * area / (perimeter * perimeter)
    }
}

/// Spatial moments of the polygon via Green's theorem.
///
/// Signs are normalised so `m00` is never negative; the centroid does not
/// depend on the winding direction.
pub fn contour_moments(points: &[Point]) -> Moments {
    let n = points.len();
    if n < 3 {
        return Moments::default();
    }

    let mut a00 = 0.0f64;
    let mut a10 = 0.0f64;
    let mut a01 = 0.0f64;
    for i in 0..n {
        let (xp, yp) = (points[i].x as f64, points[i].y as f64);
        let (xn, yn) = (points[(i + 1) % n].x as f64, points[(i + 1) % n].y as f64);
        let cross = xp * yn - xn * yp;
        a00 += cross;
        a10 += cross * (xp + xn);
        a01 += cross * (yp + yn);
    }

    let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
    Moments {
        m00: sign * a00 / 2.0,
        m10: sign * a10 / 6.0,
        m01: sign * a01 / 6.0,
    }
}

/// Measure one contour and tag it with `cell_id`.
pub fn measure(cell_id: u32, contour: &Contour) -> FeatureRecord {
    let area = polygon_area(&contour.points);
    let perimeter = arc_length(&contour.points, true);
    FeatureRecord {
        cell_id,
        area,
        perimeter,
        circularity: circularity(area, perimeter),
    }
}

/// Computes feature records for a list of contours on a dedicated worker pool.
///
/// Output order always matches input order regardless of the worker count.
pub struct FeatureExtractor {
    pool: rayon::ThreadPool,
}

impl FeatureExtractor {
    pub fn new(n_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = cell_core::build_thread_pool(n_threads)?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn extract(&self, contours: &[Contour]) -> Vec<FeatureRecord> {
        let records: Vec<FeatureRecord> = self.pool.install(|| {
            contours
                .par_iter()
                .enumerate()
                .map(|(i, contour)| measure(i as u32 + 1, contour))
                .collect()
        });
        tracing::debug!(count = records.len(), threads = self.threads(), "features extracted");
        records
    }
}

/// Sequential reference used when no pool is wanted.
pub fn extract_features(contours: &[Contour]) -> Vec<FeatureRecord> {
    contours
        .iter()
        .enumerate()
        .map(|(i, contour)| measure(i as u32 + 1, contour))
        .collect()
}
