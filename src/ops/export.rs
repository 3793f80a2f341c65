// ============================================================================
// EXPORT — grid → bitmap buffers and terminal previews
// ============================================================================

use image::{Rgba, RgbaImage, imageops::FilterType};

use crate::canvas::{CellState, Color, GridStore};
use crate::error::{GradcapError, Result};

/// Row-major RGB buffer, three bytes per cell, `Empty` → `background`.
pub fn export_bitmap(grid: &GridStore, background: Color) -> Vec<u8> {
    let mut out = Vec::with_capacity(grid.size() * grid.size() * 3);
    grid.for_each_cell(|_, _, state| {
        let c = state.color().unwrap_or(background);
        out.extend_from_slice(&c.to_array());
    });
    out
}

/// One pixel per cell.  Empty cells are transparent unless a background is
/// given, mirroring the cleared regions of the drawing canvas.
pub fn to_rgba_image(grid: &GridStore, background: Option<Color>) -> RgbaImage {
    let n = grid.size() as u32;
    let mut img = RgbaImage::new(n, n);
    grid.for_each_cell(|row, column, state| {
        let px = match (state, background) {
            (CellState::Rgb(c), _) | (CellState::Empty, Some(c)) => Rgba([c.r, c.g, c.b, 255]),
            (CellState::Empty, None) => Rgba([0, 0, 0, 0]),
        };
        img.put_pixel(column as u32, row as u32, px);
    });
    img
}

/// Integer nearest-neighbour upscale so small designs stay crisp.
pub fn upscale(img: &RgbaImage, scale: u32) -> Result<RgbaImage> {
    if scale <= 1 {
        return Ok(img.clone());
    }
    let too_large = || {
        GradcapError::Image(format!(
            "{}×{} scaled by {} does not fit in an image",
            img.width(),
            img.height(),
            scale
        ))
    };
    let width = img.width().checked_mul(scale).ok_or_else(too_large)?;
    let height = img.height().checked_mul(scale).ok_or_else(too_large)?;
    Ok(image::imageops::resize(img, width, height, FilterType::Nearest))
}

/// ANSI true-color rendering of the matrix: lit cells as colored dots, off
/// cells in `off_color`.
pub fn ansi_preview(grid: &GridStore, off_color: Color) -> String {
    let n = grid.size();
    let mut out = String::with_capacity(n * n * 24);
    grid.for_each_cell(|_, column, state| {
        let (c, glyph) = match state {
            CellState::Rgb(c) => (c, "●"),
            CellState::Empty => (off_color, "·"),
        };
        out.push_str(&format!("\x1b[38;2;{};{};{}m{} ", c.r, c.g, c.b, glyph));
        if column + 1 == n {
            out.push_str("\x1b[0m\n");
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> GridStore {
        let mut grid = GridStore::new(2);
        grid.set_cell(0, 1, Color::rgb(1, 2, 3)).unwrap();
        grid.set_cell(1, 0, Color::rgb(4, 5, 6)).unwrap();
        grid
    }

    #[test]
    fn bitmap_is_row_major_with_background() {
        let bytes = export_bitmap(&sample_grid(), Color::rgb(9, 9, 9));
        assert_eq!(bytes, vec![9, 9, 9, 1, 2, 3, 4, 5, 6, 9, 9, 9]);
    }

    #[test]
    fn rgba_export_leaves_empty_transparent() {
        let img = to_rgba_image(&sample_grid(), None);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([1, 2, 3, 255]));
        assert_eq!(*img.get_pixel(0, 1), Rgba([4, 5, 6, 255]));

        let filled = to_rgba_image(&sample_grid(), Some(Color::WHITE));
        assert_eq!(*filled.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn upscale_multiplies_dimensions() {
        let img = to_rgba_image(&sample_grid(), None);
        assert_eq!(upscale(&img, 1).unwrap().dimensions(), (2, 2));
        assert_eq!(upscale(&img, 8).unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn oversized_upscale_is_an_error() {
        let img = to_rgba_image(&GridStore::new(32), None);
        assert!(matches!(upscale(&img, 1 << 28), Err(GradcapError::Image(_))));
    }

    #[test]
    fn preview_has_one_line_per_row() {
        let text = ansi_preview(&sample_grid(), Color::rgb(155, 155, 155));
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text.matches('●').count(), 2);
        assert_eq!(text.matches('·').count(), 2);
        assert!(text.contains("38;2;1;2;3m"));
    }
}
