use image::{GrayImage, Luma};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Level maximising the between-class variance of the 256-bin histogram.
///
/// Background is `<= level`. Ties keep the lowest level. Counts and sums are
/// 64-bit so arbitrarily large frames cannot overflow.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for p in image.pixels() {
        hist[p[0] as usize] += 1;
    }
    let total: u64 = hist.iter().sum();
    let total_sum: f64 = hist.iter().enumerate().map(|(t, &h)| t as f64 * h as f64).sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0f64;
    let mut largest_variance = 0f64;
    let mut best = 0u8;

    for (t, &h) in hist.iter().enumerate() {
        background_weight += h;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }
        background_sum += t as f64 * h as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (total_sum - background_sum) / foreground_weight as f64;
        let variance =
            background_weight as f64 * foreground_weight as f64 * (background_mean - foreground_mean).powi(2);
        if variance > largest_variance {
            largest_variance = variance;
            best = t as u8;
        }
    }

    best
}

/// Otsu level of the image, or `None` when fewer than two intensity levels
/// occur and no two-class split exists.
pub fn otsu_split(image: &GrayImage) -> Option<u8> {
    let mut samples = image.pixels().map(|p| p[0]);
    let first = samples.next()?;
    if samples.all(|v| v == first) {
        return None;
    }
    Some(otsu_level(image))
}

/// Samples strictly above `level` become foreground.
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    let mut mask = image.clone();
    for p in mask.pixels_mut() {
        *p = if p[0] > level { Luma([FOREGROUND]) } else { Luma([BACKGROUND]) };
    }
    mask
}

/// Global Otsu segmentation into a {0, 255} mask.
///
/// A single-level image has no foreground.
pub fn otsu_mask(image: &GrayImage) -> GrayImage {
    match otsu_split(image) {
        Some(level) => {
            tracing::debug!(level, "otsu threshold selected");
            binarize(image, level)
        }
        None => {
            tracing::debug!("single intensity level, mask left empty");
            GrayImage::new(image.width(), image.height())
        }
    }
}
