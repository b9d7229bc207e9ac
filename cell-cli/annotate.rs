use cell_core::{Contour, Highlight, ImageOps};
use image::{DynamicImage, GrayImage, RgbImage};

/// Paint Cell_ID labels and boundaries over an RGB copy of `gray`.
///
/// Labels go down first so the boundaries stay visible where they overlap.
/// A contour without a centroid keeps its boundary but gets no label.
pub fn annotate<O: ImageOps>(ops: &O, gray: &GrayImage, contours: &[Contour], color: Highlight) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(gray.clone()).into_rgb8();

    for (i, contour) in contours.iter().enumerate() {
        if let Some((cx, cy)) = ops.moments(contour).centroid() {
            ops.put_label(&mut canvas, &(i + 1).to_string(), (cx as i32, cy as i32), color);
        }
    }
    for contour in contours {
        ops.draw_contour(&mut canvas, contour, color);
    }

    canvas
}
