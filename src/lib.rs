//! LED-matrix drawing engine for graduation-cap designs.
//!
//! A [`GridStore`] holds the N×N cells, a [`PaletteManager`] keeps the
//! recently used colors, and a [`DrawController`] applies paint, erase,
//! clear and image-import operations to both while notifying a
//! [`CanvasObserver`].  [`Session`] wraps a controller with the pointer and
//! widget events a front end produces.

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod io;
pub mod ops;
pub mod session;

pub use canvas::{CellState, Color, GridStore, Surface, map_to_cell};
pub use components::controller::{CanvasObserver, DrawController, ImportReport, NullObserver};
pub use components::palette::{PaletteManager, PalettePolicy};
pub use config::CanvasConfig;
pub use error::{GradcapError, Result};
pub use ops::export::export_bitmap;
pub use session::{Event, EventScript, Session};
