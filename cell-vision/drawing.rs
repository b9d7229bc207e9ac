use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use cell_core::{Contour, Highlight};
use image::RgbImage;
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

use crate::error::{VisionError, VisionResult};

/// Bundled label typeface (DejaVu Sans, see `fonts/LICENSE`)
const LABEL_FONT: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");

/// Label em height in pixels at `label_scale == 1.0`; the default 0.4 gives
/// 12 px text with digits about 9 px tall.
pub const LABEL_PX_PER_SCALE: f32 = 30.0;

pub fn load_label_font() -> VisionResult<FontRef<'static>> {
    FontRef::try_from_slice(LABEL_FONT).map_err(|e| VisionError::InvalidFont(e.to_string()))
}

pub fn label_px_scale(scale: f32) -> PxScale {
    PxScale::from(scale * LABEL_PX_PER_SCALE)
}

/// Draw `text` with its baseline-left corner at `origin`.
pub fn draw_label(
    canvas: &mut RgbImage,
    font: &FontRef<'_>,
    text: &str,
    origin: (i32, i32),
    scale: f32,
    color: Highlight,
) {
    let px = label_px_scale(scale);
    // draw_text_mut takes the top of the line box; the baseline sits one ascent below it
    let ascent = font.as_scaled(px).ascent().round() as i32;
    draw_text_mut(canvas, color, origin.0, origin.1 - ascent, px, font, text);
}

/// Stroke a closed polyline `width` pixels wide.
///
/// The stroke is built from parallel 1 px passes offset around the centre line.
pub fn draw_closed_polyline(canvas: &mut RgbImage, contour: &Contour, width: u32, color: Highlight) {
    if contour.is_empty() {
        return;
    }
    let width = width.max(1) as i32;
    let lo = -(width - 1) / 2;
    let hi = lo + width - 1;

    for (a, b) in contour.edges() {
        for dy in lo..=hi {
            for dx in lo..=hi {
                draw_line_segment_mut(
                    canvas,
                    ((a.x + dx) as f32, (a.y + dy) as f32),
                    ((b.x + dx) as f32, (b.y + dy) as f32),
                    color,
                );
            }
        }
    }
}
