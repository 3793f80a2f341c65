//! One drawing session: the inbound event surface around a [`DrawController`].
//!
//! Pointer, picker, swatch and host events all arrive here.  While an image
//! import is in flight (between [`Session::begin_import`] and
//! [`Session::complete_import`]) incoming events are queued and replayed in
//! arrival order afterwards, so nothing paints over a half-finished import.

use std::collections::VecDeque;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canvas::{Color, Surface};
use crate::components::controller::{CanvasObserver, DrawController, ImportReport, NullObserver};
use crate::config::CanvasConfig;
use crate::error::{GradcapError, Result};
use crate::ops::import;
use crate::{log_info, log_warn};

/// Inbound UI / host event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pointer or single touch is down at `(x, y)` on the surface.
    PointerActive { x: f32, y: f32 },
    /// The color wheel moved.
    ColorChanged { color: Color },
    /// A swatch was clicked (1-based).
    SlotClicked { slot: usize },
    EraserToggled { on: bool },
    /// The embedding page asked for a blank canvas.
    RequestClear,
}

pub struct Session<O: CanvasObserver = NullObserver> {
    pub id: Uuid,
    surface: Surface,
    controller: DrawController<O>,
    alpha_threshold: f32,
    importing: bool,
    pending: VecDeque<Event>,
}

impl Session<NullObserver> {
    pub fn headless(config: &CanvasConfig, surface: Surface) -> Result<Self> {
        Self::new(config, surface, NullObserver)
    }
}

impl<O: CanvasObserver> Session<O> {
    pub fn new(config: &CanvasConfig, surface: Surface, observer: O) -> Result<Self> {
        let mut controller = config.build_controller(observer)?;
        controller.sync_observer();
        let id = Uuid::new_v4();
        log_info!(
            "session {} started: {}×{} grid, {} swatches ({:?})",
            id,
            config.grid_size,
            config.grid_size,
            config.palette_capacity,
            config.palette_policy
        );
        Ok(Self {
            id,
            surface,
            controller,
            alpha_threshold: config.alpha_threshold,
            importing: false,
            pending: VecDeque::new(),
        })
    }

    pub fn controller(&self) -> &DrawController<O> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DrawController<O> {
        &mut self.controller
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// The drawing surface was resized (layout change).
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    pub fn is_importing(&self) -> bool {
        self.importing
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Handle an event now, or queue it if an import is running.
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        if self.importing {
            self.pending.push_back(event);
            return Ok(());
        }
        self.handle(event)
    }

    fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::PointerActive { x, y } => self.pointer_active(x, y),
            Event::ColorChanged { color } => {
                self.controller.set_active_color(color);
                Ok(())
            }
            Event::SlotClicked { slot } => {
                self.controller.select_palette_slot(slot);
                Ok(())
            }
            Event::EraserToggled { on } => {
                self.controller.set_eraser(on);
                Ok(())
            }
            Event::RequestClear => {
                log_info!("session {}: clear requested", self.id);
                self.controller.clear_all();
                Ok(())
            }
        }
    }

    fn pointer_active(&mut self, x: f32, y: f32) -> Result<()> {
        // capture only fires inside the matrix
        if !self.surface.contains(x, y) {
            return Ok(());
        }
        let size = self.controller.grid().size();
        let (row, column) = self.surface.cell_at(x, y, size);
        let out_of_bounds = || GradcapError::OutOfBounds { row, column, size };
        let row = usize::try_from(row).map_err(|_| out_of_bounds())?;
        let column = usize::try_from(column).map_err(|_| out_of_bounds())?;
        self.controller.paint_at(row, column)
    }

    // -- import critical section ---------------------------------------------

    /// Mark an import as started (the source image is loading).
    pub fn begin_import(&mut self) -> Result<()> {
        if self.importing {
            return Err(GradcapError::ImportInProgress);
        }
        self.importing = true;
        Ok(())
    }

    /// Finish the import started by [`begin_import`](Self::begin_import)
    /// with the decoded image, or the error that stopped decoding.  On error
    /// the grid is left as it was.  Queued events are replayed either way;
    /// a queued event that fails is logged and dropped.
    pub fn complete_import(&mut self, decoded: Result<RgbaImage>) -> Result<ImportReport> {
        let result = decoded.and_then(|img| {
            import::import_rgba(&mut self.controller, &img, self.alpha_threshold)
        });
        self.importing = false;

        match &result {
            Ok(report) => log_info!(
                "session {}: imported image, {} cells lit, {} skipped",
                self.id,
                report.painted,
                report.skipped
            ),
            Err(e) => log_warn!("session {}: import failed: {}", self.id, e),
        }

        while let Some(event) = self.pending.pop_front() {
            if let Err(e) = self.handle(event) {
                log_warn!("session {}: dropped queued event: {}", self.id, e);
            }
        }
        result
    }

    /// Import a raw RGBA8 buffer in one step.
    pub fn import_image(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<ImportReport> {
        self.begin_import()?;
        self.complete_import(import::rgba_from_raw(pixels, width, height))
    }

    /// Import encoded image bytes (PNG, JPEG, …) in one step.
    pub fn import_encoded(&mut self, bytes: &[u8]) -> Result<ImportReport> {
        self.begin_import()?;
        self.complete_import(import::decode_encoded(bytes))
    }
}

/// A recorded list of events to replay, with the surface they were captured
/// on.  Read by the CLI's `--events` option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventScript {
    pub surface: Surface,
    pub events: Vec<Event>,
}

impl EventScript {
    pub fn from_json(text: &str) -> Result<Self> {
        let script: EventScript = serde_json::from_str(text)?;
        Surface::new(script.surface.width, script.surface.height)?;
        Ok(script)
    }
}
