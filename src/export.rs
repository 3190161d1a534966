//! PNG rasterization of spectrum snapshots (image crate).
//!
//! Turns the draw-ready geometry from `render` into pixels: the headless
//! stand-in for the live drawing surface.

use image::RgbImage;

use crate::render::{BarView, WaterfallView};

const BACKGROUND: [u8; 3] = [0, 0, 0];
const REFERENCE_LINE: [u8; 3] = [255, 0, 0];

/// Rasterize a bar view: black background, one colored column per bar, and a
/// red line where a full-scale magnitude would land before clipping.
pub fn render_bars_image(view: &BarView) -> RgbImage {
    let mut img = RgbImage::from_pixel(view.width, view.height, image::Rgb(BACKGROUND));
    let surface_height = view.height as f32;

    for bar in &view.bars {
        let x0 = bar.x.floor() as u32;
        let x1 = ((bar.x + bar.width).ceil() as u32).min(view.width);
        let y_top = (surface_height - bar.height).max(0.0) as u32;
        for x in x0..x1 {
            for y in y_top..view.height {
                img.put_pixel(x, y, image::Rgb([bar.color.r, bar.color.g, bar.color.b]));
            }
        }
    }

    let ref_y = (surface_height - view.reference_height).max(0.0) as u32;
    for y in ref_y..(ref_y + 2).min(view.height) {
        for x in 0..view.width {
            img.put_pixel(x, y, image::Rgb(REFERENCE_LINE));
        }
    }

    img
}

/// Rasterize a waterfall view: newest row along the bottom edge, older rows
/// stacked above it.
pub fn render_waterfall_image(view: &WaterfallView) -> RgbImage {
    let mut img = RgbImage::from_pixel(view.width, view.height, image::Rgb(BACKGROUND));

    for (row_index, row) in view.rows.iter().enumerate() {
        if row_index as u32 >= view.height || row.cells.is_empty() {
            continue;
        }
        let y = view.height - 1 - row_index as u32;
        let cell_width = view.width as f32 / row.cells.len() as f32;

        for (i, cell) in row.cells.iter().enumerate() {
            let x0 = (i as f32 * cell_width) as u32;
            let x1 = (((i + 1) as f32 * cell_width).ceil() as u32).min(view.width);
            for x in x0..x1 {
                img.put_pixel(x, y, image::Rgb([cell.r, cell.g, cell.b]));
            }
        }
    }

    img
}
