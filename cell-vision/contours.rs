use cell_core::{Contour, Point};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

/// Outer boundaries of all foreground regions that are not nested inside
/// another region, in raster discovery order.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour::new(compress_collinear(&c.points)))
        .collect()
}

/// Drop points that sit in the middle of a straight run.
///
/// A point is removed when the step into it and the step out of it point the
/// same way, so the closed polygon it describes is unchanged. Reversals (a
/// one pixel wide spur walked out and back) are kept.
pub fn compress_collinear(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            !continues_straight(prev, cur, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        points.to_vec()
    } else {
        kept
    }
}

#[inline]
fn continues_straight(prev: Point, cur: Point, next: Point) -> bool {
    let (ax, ay) = ((cur.x - prev.x) as i64, (cur.y - prev.y) as i64);
    let (bx, by) = ((next.x - cur.x) as i64, (next.y - cur.y) as i64);
    let cross = ax * by - ay * bx;
    let dot = ax * bx + ay * by;
    cross == 0 && dot > 0
}
