use serde::{Deserialize, Serialize};

use crate::error::{GradcapError, Result};

/// Default edge length of the LED matrix.
pub const DEFAULT_GRID_SIZE: usize = 32;

// ============================================================================
// COLOR
// ============================================================================

/// An RGB triple.  Compared by channel value, never by identity.
///
/// Serialised as a plain `[r, g, b]` array so config and event files stay
/// readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `r,g,b` or `#rrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Color::rgb(r, g, b))
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(p: image::Rgba<u8>) -> Self {
        Color::rgb(p[0], p[1], p[2])
    }
}

// ============================================================================
// CELL STATE
// ============================================================================

/// State of one LED on the matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    Rgb(Color),
}

impl CellState {
    pub fn color(self) -> Option<Color> {
        match self {
            CellState::Empty => None,
            CellState::Rgb(c) => Some(c),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, CellState::Empty)
    }
}

// ============================================================================
// GRID STORE
// ============================================================================

/// Authoritative N×N cell array, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStore {
    size: usize,
    cells: Vec<CellState>,
}

impl GridStore {
    /// Create an all-`Empty` grid.  `size` must be non-zero; the config layer
    /// rejects zero before a grid is ever built.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellState::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, column: usize) -> Result<usize> {
        if row >= self.size || column >= self.size {
            return Err(GradcapError::OutOfBounds {
                row: row as i64,
                column: column as i64,
                size: self.size,
            });
        }
        Ok(row * self.size + column)
    }

    /// Color a cell.  Returns `true` if the stored state changed.
    pub fn set_cell(&mut self, row: usize, column: usize, color: Color) -> Result<bool> {
        let idx = self.index(row, column)?;
        let next = CellState::Rgb(color);
        let changed = self.cells[idx] != next;
        self.cells[idx] = next;
        Ok(changed)
    }

    /// Turn a cell off.  Returns `true` if it was lit.
    pub fn clear_cell(&mut self, row: usize, column: usize) -> Result<bool> {
        let idx = self.index(row, column)?;
        let changed = !self.cells[idx].is_empty();
        self.cells[idx] = CellState::Empty;
        Ok(changed)
    }

    pub fn get_cell(&self, row: usize, column: usize) -> Result<CellState> {
        let idx = self.index(row, column)?;
        Ok(self.cells[idx])
    }

    /// Row-major traversal: row 0..N, and column 0..N within each row.
    pub fn for_each_cell<F: FnMut(usize, usize, CellState)>(&self, mut f: F) {
        for (row, column, state) in self.iter() {
            f(row, column, state);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (i / n, i % n, *state))
    }

    pub fn painted_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.painted_count() == 0
    }
}

// ============================================================================
// COORDINATE MAPPER
// ============================================================================

/// Map a pointer offset on the drawing surface to `(row, column)`.
///
/// `x` and `y` are relative to the surface's top-left corner.  Positions
/// outside the surface are not clamped and may come back out of range
/// (including negative); the grid store rejects those.  A non-finite
/// coordinate maps to `-1` on its axis.
pub fn map_to_cell(
    x: f32,
    y: f32,
    surface_width: f32,
    surface_height: f32,
    grid_size: usize,
) -> (i64, i64) {
    let n = grid_size as f64;
    let column = axis_to_index(x as f64, surface_width as f64, n);
    let row = axis_to_index(y as f64, surface_height as f64, n);
    (row, column)
}

fn axis_to_index(pos: f64, extent: f64, n: f64) -> i64 {
    if !pos.is_finite() {
        return -1;
    }
    let idx = (pos / (extent / n)).floor() as i64;
    // A position a hair inside the far edge can round up to `n`.
    if pos >= 0.0 && pos < extent && idx >= n as i64 {
        n as i64 - 1
    } else {
        idx
    }
}

/// On-screen rectangle the matrix is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(GradcapError::Config(format!(
                "surface must have a positive size, got {}×{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// True for offsets strictly inside the surface.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width && y < self.height
    }

    pub fn cell_at(&self, x: f32, y: f32, grid_size: usize) -> (i64, i64) {
        map_to_cell(x, y, self.width, self.height, grid_size)
    }
}
