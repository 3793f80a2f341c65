//! File-level load/save for the headless tool.

use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::{GradcapError, Result};
use crate::ops::import::decode_encoded;

/// Read and decode an image file.  A missing file is an I/O error; a file
/// that exists but does not decode is an `ImportDecodeFailure`.
pub fn load_image_sync(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path)?;
    decode_encoded(&bytes).map_err(|e| match e {
        GradcapError::ImportDecodeFailure(msg) => {
            GradcapError::ImportDecodeFailure(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Output format inferred from the file extension.  No extension or an
/// unknown one means PNG; a known format that cannot hold the RGBA design
/// (JPEG, WebP, …) is an error rather than PNG bytes under the wrong name.
pub fn save_format(path: &Path) -> Result<ImageFormat> {
    if path.extension().is_none() {
        return Ok(ImageFormat::Png);
    }
    match ImageFormat::from_path(path) {
        Ok(f @ (ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tga | ImageFormat::Ico)) => Ok(f),
        Ok(other) => Err(GradcapError::Image(format!(
            "cannot write {:?} designs to {}; use .png, .bmp, .tga or .ico",
            other,
            path.display()
        ))),
        Err(_) => Ok(ImageFormat::Png),
    }
}

/// Encode `img` and write it to `path`, creating parent directories.
pub fn encode_and_write(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let format = save_format(path)?;
    img.save_with_format(path, format)?;
    Ok(())
}
