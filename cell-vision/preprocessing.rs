use image::GrayImage;
use imageproc::filter::separable_filter_equal;

/// Sigma implied by a kernel size when none is given:
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    (0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8) as f32
}

/// Normalised 1-D Gaussian weights of length `kernel_size`.
pub fn gaussian_kernel(kernel_size: u32, sigma: f32) -> Vec<f32> {
    let half = (kernel_size / 2) as f64;
    let sigma = sigma as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let d = i as f64 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / total) as f32).collect()
}

/// Separable Gaussian blur with a square `kernel_size` window.
///
/// Border samples are replicated. Returns a new image; the input is untouched.
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32, sigma: Option<f32>) -> GrayImage {
    if kernel_size <= 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let sigma = sigma.unwrap_or_else(|| sigma_for_kernel(kernel_size));
    let kernel = gaussian_kernel(kernel_size, sigma);
    separable_filter_equal(image, &kernel)
}
