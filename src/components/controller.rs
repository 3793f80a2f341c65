use crate::canvas::{CellState, Color, GridStore};
use crate::components::palette::PaletteManager;
use crate::error::{GradcapError, Result};

/// Initial pen color of a fresh session (the cap's gold).
pub const INITIAL_COLOR: Color = Color::rgb(255, 202, 58);

// ============================================================================
// OBSERVER TRAIT
// ============================================================================

/// Outbound notifications for whatever draws the matrix, swatches and color
/// wheel.  Every method has an empty default so a renderer only implements
/// what it shows.
pub trait CanvasObserver {
    /// A cell's state changed.
    fn render_cell(&mut self, _row: usize, _column: usize, _state: CellState) {}
    /// Swatch `slot` (1-based) now shows `color`, or nothing.
    fn render_swatch(&mut self, _slot: usize, _color: Option<Color>) {}
    /// The active color was changed by the core; display it and redraw.
    fn set_displayed_color(&mut self, _color: Color) {}
    /// The eraser control toggled.
    fn render_eraser(&mut self, _on: bool) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl CanvasObserver for NullObserver {}

/// Summary of a finished image import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub painted: usize,
    pub skipped: usize,
    pub last_color: Option<Color>,
}

/// What a single paint/erase did.
#[derive(Clone, Copy, Debug, Default)]
struct Stroke {
    cell_changed: bool,
    palette_changed: bool,
}

// ============================================================================
// DRAW CONTROLLER
// ============================================================================

/// Owns the grid, palette and pen for one drawing session.
///
/// All mutations go grid first, then palette, then observer notifications.
pub struct DrawController<O: CanvasObserver = NullObserver> {
    grid: GridStore,
    palette: PaletteManager,
    active_color: Color,
    eraser_on: bool,
    observer: O,
}

impl DrawController<NullObserver> {
    pub fn headless(grid_size: usize, palette: PaletteManager) -> Self {
        Self::new(GridStore::new(grid_size), palette, INITIAL_COLOR, NullObserver)
    }
}

impl<O: CanvasObserver> DrawController<O> {
    pub fn new(grid: GridStore, palette: PaletteManager, active_color: Color, observer: O) -> Self {
        Self {
            grid,
            palette,
            active_color,
            eraser_on: false,
            observer,
        }
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn palette(&self) -> &PaletteManager {
        &self.palette
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn eraser_on(&self) -> bool {
        self.eraser_on
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Push the full current state to the observer (initial paint).
    pub fn sync_observer(&mut self) {
        for (row, column, state) in self.grid.iter() {
            self.observer.render_cell(row, column, state);
        }
        self.render_swatches();
        self.observer.set_displayed_color(self.active_color);
        self.observer.render_eraser(self.eraser_on);
    }

    // -- per-cell ----------------------------------------------------------

    /// Paint with the active color, or erase when the eraser is on.
    pub fn paint_at(&mut self, row: usize, column: usize) -> Result<()> {
        let stroke = self.stroke(row, column)?;
        if stroke.cell_changed {
            self.render_cell(row, column);
        }
        if stroke.palette_changed {
            self.render_swatches();
        }
        Ok(())
    }

    fn stroke(&mut self, row: usize, column: usize) -> Result<Stroke> {
        if self.eraser_on {
            let cell_changed = self.grid.clear_cell(row, column)?;
            return Ok(Stroke {
                cell_changed,
                palette_changed: false,
            });
        }
        let cell_changed = self.grid.set_cell(row, column, self.active_color)?;
        let palette_changed = self.palette.promote(self.active_color);
        Ok(Stroke {
            cell_changed,
            palette_changed,
        })
    }

    // -- pen state ---------------------------------------------------------

    /// Color picked on the wheel.  Turns the eraser off.
    pub fn set_active_color(&mut self, color: Color) {
        self.active_color = color;
        if self.eraser_on {
            self.eraser_on = false;
            self.observer.render_eraser(false);
        }
    }

    /// The active color is kept while erasing and comes back when the eraser
    /// is switched off.
    pub fn set_eraser(&mut self, on: bool) {
        if self.eraser_on != on {
            self.eraser_on = on;
            self.observer.render_eraser(on);
        }
    }

    /// Activate the color in palette slot `slot` (1-based).  Unpopulated
    /// slots are ignored and return `None`.
    pub fn select_palette_slot(&mut self, slot: usize) -> Option<Color> {
        // IndexOutOfRange: swatch is empty and not clickable
        let color = self.palette.select_slot(slot).ok()?;
        self.set_active_color(color);
        self.render_swatches();
        self.observer.set_displayed_color(color);
        Some(color)
    }

    // -- bulk --------------------------------------------------------------

    /// Erase every cell regardless of the current mode, then put the mode
    /// back.  Notifications are sent once the whole grid is blank.
    pub fn clear_all(&mut self) {
        let touched = self.erase_everything();
        for (row, column) in touched {
            self.render_cell(row, column);
        }
    }

    fn erase_everything(&mut self) -> Vec<(usize, usize)> {
        let prior = self.eraser_on;
        self.eraser_on = true;
        let n = self.grid.size();
        let mut touched = Vec::new();
        for row in 0..n {
            for column in 0..n {
                // indices come from the grid's own size
                if let Ok(stroke) = self.stroke(row, column)
                    && stroke.cell_changed
                {
                    touched.push((row, column));
                }
            }
        }
        self.eraser_on = prior;
        touched
    }

    /// Replace the grid with one resampled image: `samples` is row-major,
    /// one entry per cell, `None` for pixels too transparent to show.
    ///
    /// The grid is cleared first and each visible sample is painted through
    /// the normal paint path with the pen set to that sample's color.  Only
    /// the eraser mode is restored afterwards.  The active color is *not*
    /// put back: it stays on the last painted pixel's color (and
    /// `set_displayed_color` reports it), so the pen matches what the wheel
    /// shows.  When no sample is visible the prior active color is kept.
    pub fn replay_import(&mut self, samples: &[Option<Color>]) -> Result<ImportReport> {
        let n = self.grid.size();
        if samples.len() != n * n {
            return Err(GradcapError::ImportDecodeFailure(format!(
                "expected {} samples for a {}×{} grid, got {}",
                n * n,
                n,
                n,
                samples.len()
            )));
        }

        let prior_eraser = self.eraser_on;
        let prior_color = self.active_color;
        let mut touched = self.erase_everything();
        let mut palette_changed = false;
        let mut report = ImportReport::default();

        self.eraser_on = false;
        for (idx, sample) in samples.iter().enumerate() {
            let Some(color) = *sample else {
                report.skipped += 1;
                continue;
            };
            let (row, column) = (idx / n, idx % n);
            self.active_color = color;
            let stroke = self.stroke(row, column)?;
            if stroke.cell_changed {
                touched.push((row, column));
            }
            palette_changed |= stroke.palette_changed;
            report.painted += 1;
            report.last_color = Some(color);
        }
        self.eraser_on = prior_eraser;
        self.active_color = report.last_color.unwrap_or(prior_color);

        touched.sort_unstable();
        touched.dedup();
        for (row, column) in touched {
            self.render_cell(row, column);
        }
        if palette_changed {
            self.render_swatches();
        }
        if let Some(color) = report.last_color {
            self.observer.set_displayed_color(color);
        }
        Ok(report)
    }

    // -- notifications -----------------------------------------------------

    fn render_cell(&mut self, row: usize, column: usize) {
        if let Ok(state) = self.grid.get_cell(row, column) {
            self.observer.render_cell(row, column, state);
        }
    }

    fn render_swatches(&mut self) {
        for (slot, color) in self.palette.slots() {
            self.observer.render_swatch(slot, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::palette::PalettePolicy;

    /// Records every notification in order.
    #[derive(Debug, Default)]
    struct Recorder {
        cells: Vec<(usize, usize, CellState)>,
        swatches: Vec<(usize, Option<Color>)>,
        displayed: Vec<Color>,
        eraser: Vec<bool>,
    }

    impl CanvasObserver for Recorder {
        fn render_cell(&mut self, row: usize, column: usize, state: CellState) {
            self.cells.push((row, column, state));
        }
        fn render_swatch(&mut self, slot: usize, color: Option<Color>) {
            self.swatches.push((slot, color));
        }
        fn set_displayed_color(&mut self, color: Color) {
            self.displayed.push(color);
        }
        fn render_eraser(&mut self, on: bool) {
            self.eraser.push(on);
        }
    }

    const RED: Color = Color::rgb(255, 0, 0);
    const TEAL: Color = Color::rgb(10, 20, 30);

    fn controller(size: usize, capacity: usize) -> DrawController<Recorder> {
        DrawController::new(
            GridStore::new(size),
            PaletteManager::new(capacity, PalettePolicy::Mru),
            INITIAL_COLOR,
            Recorder::default(),
        )
    }

    #[test]
    fn paint_sets_cell_and_promotes_color() {
        let mut ctl = controller(4, 3);
        ctl.set_active_color(TEAL);
        ctl.paint_at(1, 1).unwrap();
        assert_eq!(ctl.grid().get_cell(1, 1).unwrap(), CellState::Rgb(TEAL));
        assert_eq!(ctl.palette().front(), Some(TEAL));
        assert_eq!(ctl.observer().cells, vec![(1, 1, CellState::Rgb(TEAL))]);
        assert_eq!(ctl.observer().swatches[0], (1, Some(TEAL)));
        assert_eq!(ctl.observer().swatches.len(), 3);
    }

    #[test]
    fn eraser_clears_without_touching_palette() {
        let mut ctl = controller(4, 3);
        ctl.paint_at(1, 1).unwrap();
        let palette = ctl.palette().clone();
        ctl.set_eraser(true);
        ctl.paint_at(1, 1).unwrap();
        assert_eq!(ctl.grid().get_cell(1, 1).unwrap(), CellState::Empty);
        assert_eq!(ctl.palette(), &palette);
        // the pen color survives the eraser
        assert_eq!(ctl.active_color(), INITIAL_COLOR);
        ctl.set_eraser(false);
        ctl.paint_at(0, 0).unwrap();
        assert_eq!(ctl.grid().get_cell(0, 0).unwrap(), CellState::Rgb(INITIAL_COLOR));
    }

    #[test]
    fn out_of_bounds_leaves_everything_untouched() {
        let mut ctl = controller(4, 3);
        assert!(matches!(ctl.paint_at(4, 0), Err(GradcapError::OutOfBounds { .. })));
        assert!(ctl.palette().is_empty());
        assert!(ctl.grid().is_blank());
        assert!(ctl.observer().cells.is_empty());
    }

    #[test]
    fn picking_a_color_turns_eraser_off() {
        let mut ctl = controller(4, 3);
        ctl.set_eraser(true);
        ctl.set_active_color(RED);
        assert!(!ctl.eraser_on());
        assert_eq!(ctl.observer().eraser, vec![true, false]);
    }

    #[test]
    fn clear_all_restores_mode_and_blanks_grid() {
        let mut ctl = controller(4, 3);
        for i in 0..4 {
            ctl.paint_at(i, i).unwrap();
        }
        ctl.observer_mut().cells.clear();
        ctl.clear_all();
        assert!(ctl.grid().is_blank());
        assert!(!ctl.eraser_on());
        assert_eq!(ctl.observer().cells.len(), 4);
        assert!(ctl.observer().cells.iter().all(|(_, _, s)| s.is_empty()));

        ctl.set_eraser(true);
        ctl.clear_all();
        assert!(ctl.eraser_on());
    }

    #[test]
    fn selecting_slot_activates_color() {
        let mut ctl = DrawController::new(
            GridStore::new(4),
            PaletteManager::seeded(3, PalettePolicy::Mru, &[RED, TEAL]),
            INITIAL_COLOR,
            Recorder::default(),
        );
        ctl.set_eraser(true);
        assert_eq!(ctl.select_palette_slot(2), Some(TEAL));
        assert_eq!(ctl.active_color(), TEAL);
        assert!(!ctl.eraser_on());
        assert_eq!(ctl.palette().colors(), &[RED]);
        assert_eq!(ctl.observer().displayed, vec![TEAL]);
    }

    #[test]
    fn selecting_empty_slot_is_silent() {
        let mut ctl = controller(4, 3);
        ctl.set_eraser(true);
        assert_eq!(ctl.select_palette_slot(1), None);
        assert!(ctl.eraser_on());
        assert!(ctl.observer().swatches.is_empty());
        assert!(ctl.observer().displayed.is_empty());
    }

    #[test]
    fn replay_rejects_wrong_sample_count_before_clearing() {
        let mut ctl = controller(2, 3);
        ctl.paint_at(0, 0).unwrap();
        let err = ctl.replay_import(&[Some(RED); 3]).unwrap_err();
        assert!(matches!(err, GradcapError::ImportDecodeFailure(_)));
        assert_eq!(ctl.grid().get_cell(0, 0).unwrap(), CellState::Rgb(INITIAL_COLOR));
    }

    #[test]
    fn replay_restores_eraser_and_follows_last_color() {
        let mut ctl = controller(2, 3);
        ctl.paint_at(1, 1).unwrap();
        ctl.set_eraser(true);
        let report = ctl
            .replay_import(&[Some(RED), None, Some(TEAL), None])
            .unwrap();
        assert_eq!(
            report,
            ImportReport {
                painted: 2,
                skipped: 2,
                last_color: Some(TEAL)
            }
        );
        assert!(ctl.eraser_on());
        assert_eq!(ctl.active_color(), TEAL);
        assert_eq!(ctl.grid().get_cell(0, 0).unwrap(), CellState::Rgb(RED));
        assert_eq!(ctl.grid().get_cell(1, 0).unwrap(), CellState::Rgb(TEAL));
        assert_eq!(ctl.grid().get_cell(1, 1).unwrap(), CellState::Empty);
        assert_eq!(ctl.palette().colors(), &[TEAL, RED, INITIAL_COLOR]);
        assert_eq!(ctl.observer().displayed.last(), Some(&TEAL));
    }

    #[test]
    fn sync_pushes_full_state() {
        let mut ctl = controller(2, 3);
        ctl.sync_observer();
        let rec = ctl.observer();
        assert_eq!(rec.cells.len(), 4);
        assert_eq!(rec.swatches, vec![(1, None), (2, None), (3, None)]);
        assert_eq!(rec.displayed, vec![INITIAL_COLOR]);
        assert_eq!(rec.eraser, vec![false]);
    }

    #[test]
    fn replay_of_invisible_image_keeps_pen() {
        let mut ctl = controller(2, 3);
        ctl.set_active_color(RED);
        let report = ctl.replay_import(&[None; 4]).unwrap();
        assert_eq!(report.painted, 0);
        assert_eq!(ctl.active_color(), RED);
        assert!(ctl.grid().is_blank());
    }
}
