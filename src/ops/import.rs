// ============================================================================
// IMAGE IMPORT — bitmap → one sample per LED → replay through the controller
// ============================================================================

use image::RgbaImage;

use crate::canvas::Color;
use crate::components::controller::{CanvasObserver, DrawController, ImportReport};
use crate::error::{GradcapError, Result};

/// Wrap a raw RGBA8 buffer, checking it matches the stated dimensions.
pub fn rgba_from_raw(pixels: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(GradcapError::ImportDecodeFailure(format!(
            "image has no pixels ({}×{})",
            width, height
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4));
    if expected != Some(pixels.len()) {
        return Err(GradcapError::ImportDecodeFailure(format!(
            "buffer holds {} bytes, {}×{} RGBA needs {}",
            pixels.len(),
            width,
            height,
            expected.map_or_else(|| "more than usize::MAX".to_string(), |n| n.to_string())
        )));
    }
    RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        GradcapError::ImportDecodeFailure("buffer does not match image dimensions".to_string())
    })
}

/// Decode PNG / JPEG / BMP / GIF / … bytes to RGBA8.
pub fn decode_encoded(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| GradcapError::ImportDecodeFailure(e.to_string()))
}

/// Nearest-neighbour resample to `grid_size × grid_size`, row-major.
///
/// Each cell takes the source pixel under its centre.  Pixels whose alpha is
/// at or below `alpha_threshold` (0–1 scale) come back as `None`.  An image
/// with no pixels yields no samples.
pub fn sample_grid(img: &RgbaImage, grid_size: usize, alpha_threshold: f32) -> Vec<Option<Color>> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let n = grid_size as f64;
    let source_index = |cell: usize, extent: u32| -> u32 {
        let pos = ((cell as f64 + 0.5) * extent as f64 / n).floor() as u32;
        pos.min(extent - 1)
    };

    let mut samples = Vec::with_capacity(grid_size * grid_size);
    for row in 0..grid_size {
        let sy = source_index(row, h);
        for column in 0..grid_size {
            let sx = source_index(column, w);
            let px = *img.get_pixel(sx, sy);
            let alpha = px[3] as f32 / 255.0;
            samples.push((alpha > alpha_threshold).then(|| Color::from(px)));
        }
    }
    samples
}

/// Import an already-decoded image into the controller's grid.
pub fn import_rgba<O: CanvasObserver>(
    controller: &mut DrawController<O>,
    img: &RgbaImage,
    alpha_threshold: f32,
) -> Result<ImportReport> {
    if img.width() == 0 || img.height() == 0 {
        return Err(GradcapError::ImportDecodeFailure("image has no pixels".to_string()));
    }
    let samples = sample_grid(img, controller.grid().size(), alpha_threshold);
    controller.replay_import(&samples)
}

/// Import a raw RGBA8 buffer.  A malformed buffer fails before anything is
/// cleared.
pub fn import_image<O: CanvasObserver>(
    controller: &mut DrawController<O>,
    pixels: &[u8],
    width: u32,
    height: u32,
    alpha_threshold: f32,
) -> Result<ImportReport> {
    let img = rgba_from_raw(pixels, width, height)?;
    import_rgba(controller, &img, alpha_threshold)
}

/// Import an encoded image file's bytes.
pub fn import_encoded<O: CanvasObserver>(
    controller: &mut DrawController<O>,
    bytes: &[u8],
    alpha_threshold: f32,
) -> Result<ImportReport> {
    let img = decode_encoded(bytes)?;
    import_rgba(controller, &img, alpha_threshold)
}
