use gradcap::ops::import::import_image;
use gradcap::{
    CanvasConfig, CellState, Color, DrawController, GradcapError, GridStore, NullObserver,
    PaletteManager, PalettePolicy, Session, Surface, export_bitmap, map_to_cell,
};

const RED: Color = Color::rgb(255, 0, 0);
const GREEN: Color = Color::rgb(0, 255, 0);
const BLUE: Color = Color::rgb(0, 0, 255);
const CYAN: Color = Color::rgb(0, 255, 255);

fn small_controller(grid_size: usize, capacity: usize) -> DrawController {
    DrawController::new(
        GridStore::new(grid_size),
        PaletteManager::new(capacity, PalettePolicy::Mru),
        Color::WHITE,
        NullObserver,
    )
}

#[test]
fn fourth_color_evicts_the_first() {
    let mut palette = PaletteManager::new(3, PalettePolicy::Mru);
    palette.record_use(RED);
    palette.record_use(GREEN);
    palette.record_use(BLUE);
    let history = palette.record_use(CYAN).to_vec();
    assert_eq!(history, vec![CYAN, BLUE, GREEN]);
}

#[test]
fn repeated_use_is_idempotent_at_front() {
    let mut palette = PaletteManager::new(3, PalettePolicy::Mru);
    let first = palette.record_use(RED).to_vec();
    let second = palette.record_use(RED).to_vec();
    assert_eq!(first, second);
}

#[test]
fn paint_with_active_color() {
    let mut ctl = small_controller(4, 3);
    ctl.set_active_color(Color::rgb(10, 20, 30));
    ctl.paint_at(1, 1).unwrap();
    assert_eq!(ctl.grid().get_cell(1, 1).unwrap(), CellState::Rgb(Color::rgb(10, 20, 30)));
    assert_eq!(ctl.palette().front(), Some(Color::rgb(10, 20, 30)));
}

#[test]
fn erase_leaves_palette_alone() {
    let mut ctl = small_controller(4, 3);
    ctl.paint_at(1, 1).unwrap();
    let before = ctl.palette().colors().to_vec();
    ctl.set_eraser(true);
    ctl.paint_at(1, 1).unwrap();
    assert_eq!(ctl.grid().get_cell(1, 1).unwrap(), CellState::Empty);
    assert_eq!(ctl.palette().colors(), before.as_slice());
}

#[test]
fn unpopulated_slot_changes_nothing() {
    let mut palette = PaletteManager::new(3, PalettePolicy::Mru);
    palette.record_use(RED);
    assert!(matches!(palette.select_slot(2), Err(GradcapError::IndexOutOfRange { .. })));
    assert_eq!(palette.colors(), &[RED]);
}

#[test]
fn clear_all_blanks_every_cell() {
    let mut ctl = small_controller(4, 3);
    for row in 0..4 {
        for column in 0..4 {
            ctl.set_active_color(Color::rgb(row as u8 * 40, column as u8 * 40, 7));
            ctl.paint_at(row, column).unwrap();
        }
    }
    ctl.clear_all();
    let mut count = 0;
    ctl.grid().for_each_cell(|_, _, state| {
        assert_eq!(state, CellState::Empty);
        count += 1;
    });
    assert_eq!(count, 16);
}

#[test]
fn opaque_pixel_fills_whole_grid() {
    let mut ctl = small_controller(2, 3);
    import_image(&mut ctl, &[255, 0, 0, 255], 1, 1, 0.1).unwrap();
    ctl.grid()
        .for_each_cell(|_, _, state| assert_eq!(state, CellState::Rgb(RED)));
}

#[test]
fn transparent_pixel_leaves_grid_empty() {
    let mut ctl = small_controller(2, 3);
    ctl.paint_at(0, 0).unwrap();
    import_image(&mut ctl, &[255, 0, 0, 0], 1, 1, 0.1).unwrap();
    assert!(ctl.grid().is_blank());
}

#[test]
fn mapper_covers_surface() {
    for &(x, y) in &[(0.0, 0.0), (99.99, 99.99), (50.0, 12.5), (0.001, 75.0)] {
        let (row, column) = map_to_cell(x, y, 100.0, 100.0, 32);
        assert!((0..32).contains(&row) && (0..32).contains(&column));
    }
}

#[test]
fn session_import_then_export() {
    let config = CanvasConfig {
        grid_size: 2,
        ..Default::default()
    };
    let mut session = Session::headless(&config, Surface::new(64.0, 64.0).unwrap()).unwrap();
    // left column opaque blue, right column transparent
    let pixels = [0, 0, 255, 255, 0, 0, 0, 0, 0, 0, 255, 255, 0, 0, 0, 0];
    let report = session.import_image(&pixels, 2, 2).unwrap();
    assert_eq!(report.painted, 2);
    assert_eq!(session.controller().active_color(), BLUE);

    let bitmap = export_bitmap(session.controller().grid(), Color::BLACK);
    assert_eq!(bitmap, vec![0, 0, 255, 0, 0, 0, 0, 0, 255, 0, 0, 0]);
}
