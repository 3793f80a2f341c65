use std::fmt;

/// Error type for grid, palette and import operations.
#[derive(Debug)]
pub enum GradcapError {
    /// A `(row, column)` outside `[0, size)`.  Always a caller bug.
    OutOfBounds { row: i64, column: i64, size: usize },
    /// Palette slot (1-based) that is not currently populated.
    IndexOutOfRange { slot: usize, populated: usize },
    /// Source image could not be read or has inconsistent dimensions.
    ImportDecodeFailure(String),
    /// An import was started while another one is still in flight.
    ImportInProgress,
    Io(std::io::Error),
    Image(String),
    Config(String),
}

pub type Result<T> = std::result::Result<T, GradcapError>;

impl fmt::Display for GradcapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradcapError::OutOfBounds { row, column, size } => write!(
                f,
                "cell ({}, {}) is outside the {}×{} grid",
                row, column, size, size
            ),
            GradcapError::IndexOutOfRange { slot, populated } => write!(
                f,
                "palette slot {} is not populated ({} slots in use)",
                slot, populated
            ),
            GradcapError::ImportDecodeFailure(e) => write!(f, "Image import failed: {}", e),
            GradcapError::ImportInProgress => write!(f, "an image import is already in progress"),
            GradcapError::Io(e) => write!(f, "I/O error: {}", e),
            GradcapError::Image(e) => write!(f, "Image error: {}", e),
            GradcapError::Config(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for GradcapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GradcapError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GradcapError {
    fn from(e: std::io::Error) -> Self {
        GradcapError::Io(e)
    }
}

impl From<image::ImageError> for GradcapError {
    fn from(e: image::ImageError) -> Self {
        GradcapError::Image(e.to_string())
    }
}

impl From<serde_json::Error> for GradcapError {
    fn from(e: serde_json::Error) -> Self {
        GradcapError::Config(e.to_string())
    }
}
