//! Canvas configuration.
//!
//! Defaults reproduce the graduation-cap designer: a 32×32 matrix, nine
//! swatches pre-filled with four colors and a gold pen.  A JSON file can
//! override any subset of fields:
//!
//! ```json
//! { "grid_size": 16, "palette_policy": "legacy", "initial_color": [0, 0, 0] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::{Color, DEFAULT_GRID_SIZE, GridStore};
use crate::components::controller::{CanvasObserver, DrawController, INITIAL_COLOR};
use crate::components::palette::{DEFAULT_PALETTE_CAPACITY, PaletteManager, PalettePolicy};
use crate::error::{GradcapError, Result};

/// Color of an unlit LED in previews.
pub const OFF_COLOR: Color = Color::rgb(155, 155, 155);

/// Swatches shown before the user has drawn anything.
pub const SEED_PALETTE: [Color; 4] = [
    Color::rgb(255, 146, 76),
    Color::rgb(255, 64, 64),
    Color::rgb(138, 201, 38),
    Color::rgb(25, 130, 196),
];

/// File stem used when exporting a design.
pub const EXPORT_STEM: &str = "graduation-cap-design";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid_size: usize,
    pub palette_capacity: usize,
    pub palette_policy: PalettePolicy,
    pub initial_color: Color,
    pub seed_palette: Vec<Color>,
    pub off_color: Color,
    /// Fill for empty cells in `export_bitmap`.  `None` exports PNGs with
    /// transparent empty cells.
    pub export_background: Option<Color>,
    /// Minimum alpha (0–1, exclusive) for an imported pixel to be drawn.
    pub alpha_threshold: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            palette_capacity: DEFAULT_PALETTE_CAPACITY,
            palette_policy: PalettePolicy::Mru,
            initial_color: INITIAL_COLOR,
            seed_palette: SEED_PALETTE.to_vec(),
            off_color: OFF_COLOR,
            export_background: None,
            alpha_threshold: 0.1,
        }
    }
}

impl CanvasConfig {
    /// Read a JSON config.  Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: CanvasConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || self.grid_size > 4096 {
            return Err(GradcapError::Config(format!(
                "grid_size must be between 1 and 4096, got {}",
                self.grid_size
            )));
        }
        if self.palette_capacity == 0 {
            return Err(GradcapError::Config(
                "palette_capacity must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.alpha_threshold) {
            return Err(GradcapError::Config(format!(
                "alpha_threshold must be in [0, 1), got {}",
                self.alpha_threshold
            )));
        }
        Ok(())
    }

    pub fn build_palette(&self) -> PaletteManager {
        PaletteManager::seeded(self.palette_capacity, self.palette_policy, &self.seed_palette)
    }

    /// Fresh controller in the configured initial state.
    pub fn build_controller<O: CanvasObserver>(&self, observer: O) -> Result<DrawController<O>> {
        self.validate()?;
        Ok(DrawController::new(
            GridStore::new(self.grid_size),
            self.build_palette(),
            self.initial_color,
            observer,
        ))
    }
}
