use serde::{Deserialize, Serialize};

use crate::canvas::Color;
use crate::error::{GradcapError, Result};

/// Number of swatches shown under the color wheel.
pub const DEFAULT_PALETTE_CAPACITY: usize = 9;

/// How `record_use` treats a color that is already somewhere in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PalettePolicy {
    /// Move the existing entry to the front.  No duplicates ever.
    #[default]
    Mru,
    /// Push to the front unless it is already frontmost; older copies stay
    /// until they fall off the end.  Matches the first published version of
    /// the cap designer and is only kept for parity.
    Legacy,
}

// ============================================================================
// PaletteManager — bounded most-recently-used color list
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct PaletteManager {
    /// Most recent first.
    colors: Vec<Color>,
    capacity: usize,
    policy: PalettePolicy,
}

impl PaletteManager {
    pub fn new(capacity: usize, policy: PalettePolicy) -> Self {
        Self {
            colors: Vec::with_capacity(capacity + 1),
            capacity,
            policy,
        }
    }

    /// Start from a predefined swatch list (front = slot 1).  The seed is cut
    /// to `capacity`; under `Mru` later duplicates are dropped.
    pub fn seeded(capacity: usize, policy: PalettePolicy, seed: &[Color]) -> Self {
        let mut palette = Self::new(capacity, policy);
        for &color in seed {
            if palette.colors.len() == capacity {
                break;
            }
            if policy == PalettePolicy::Mru && palette.colors.contains(&color) {
                continue;
            }
            palette.colors.push(color);
        }
        palette
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn front(&self) -> Option<Color> {
        self.colors.first().copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> PalettePolicy {
        self.policy
    }

    /// Note that `color` was just drawn with and return the new ordering.
    pub fn record_use(&mut self, color: Color) -> &[Color] {
        self.promote(color);
        &self.colors
    }

    /// Same as [`record_use`](Self::record_use) but reports whether the list
    /// changed, so callers know when swatches need repainting.
    pub(crate) fn promote(&mut self, color: Color) -> bool {
        if self.front() == Some(color) {
            return false;
        }
        if self.policy == PalettePolicy::Mru {
            self.colors.retain(|c| *c != color);
        }
        self.colors.insert(0, color);
        self.colors.truncate(self.capacity);
        true
    }

    /// Take the color out of 1-based `slot`.  It is removed from the list and
    /// only comes back on its next `record_use`.
    pub fn select_slot(&mut self, slot: usize) -> Result<Color> {
        if slot == 0 || slot > self.colors.len() {
            return Err(GradcapError::IndexOutOfRange {
                slot,
                populated: self.colors.len(),
            });
        }
        Ok(self.colors.remove(slot - 1))
    }

    /// Every swatch slot, 1-based, populated or not.
    pub fn slots(&self) -> impl Iterator<Item = (usize, Option<Color>)> + '_ {
        (0..self.capacity).map(move |i| (i + 1, self.colors.get(i).copied()))
    }
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE_CAPACITY, PalettePolicy::Mru)
    }
}
