// ============================================================================
// GradCap CLI — headless cap designs from images and recorded events
// ============================================================================
//
// Usage examples:
//   gradcap -i logo.png -o cap.png                 (32×32 design from an image)
//   gradcap -i logo.png --scale 16 --preview        (big PNG + terminal preview)
//   gradcap -i art/*.png --output-dir designs/      (batch)
//   gradcap --events strokes.json -o cap.png        (replay on a blank matrix)
//   gradcap -i logo.png --events touch-up.json      (import, then replay)
//
// Everything runs synchronously on the current thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::{Color, Surface};
use crate::config::{CanvasConfig, EXPORT_STEM};
use crate::error::{GradcapError, Result};
use crate::io::{encode_and_write, load_image_sync};
use crate::ops::export::{ansi_preview, to_rgba_image, upscale};
use crate::components::palette::PalettePolicy;
use crate::session::{EventScript, Session};
use crate::{log_err, log_info, log_warn};

/// GradCap headless LED-matrix designer.
///
/// Turn images into graduation-cap matrix designs without a browser.
#[derive(Parser, Debug)]
#[command(
    name = "gradcap",
    about = "Headless LED-matrix designer for graduation caps",
    long_about = "Import images into a square LED matrix (32×32 by default), optionally\n\
                  replay a recorded JSON event script, and export the design as an image.\n\n\
                  Example:\n  \
                  gradcap --input logo.png --output cap.png --scale 16\n  \
                  gradcap -i art/*.png --output-dir designs/"
)]
pub struct CliArgs {
    /// Input image(s). Glob patterns accepted (e.g. "*.png").
    /// Optional when --events is given; the matrix then starts blank.
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for a single design.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// JSON event script replayed after the import.
    #[arg(short, long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// JSON canvas configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Matrix edge length (overrides the config file).
    #[arg(long, value_name = "N")]
    pub grid_size: Option<usize>,

    /// Number of recent-color swatches (overrides the config file).
    #[arg(long, value_name = "K")]
    pub palette_capacity: Option<usize>,

    /// Keep stale duplicate swatches like the first designer release did.
    #[arg(long)]
    pub legacy_palette: bool,

    /// Fill empty cells with this color instead of leaving them transparent.
    /// Accepts "r,g,b" or "#rrggbb".
    #[arg(short, long, value_name = "COLOR", value_parser = parse_color)]
    pub background: Option<Color>,

    /// Upscale factor for the exported image (nearest-neighbour, 1–256).
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_name = "FACTOR",
        value_parser = clap::value_parser!(u32).range(1..=256)
    )]
    pub scale: u32,

    /// Print an ANSI preview of each design.
    #[arg(short, long)]
    pub preview: bool,

    /// Write the session log here instead of the data directory.
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Print per-file timing and import statistics.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_color(s: &str) -> std::result::Result<Color, String> {
    Color::parse(s).ok_or_else(|| format!("'{}' is not a color (expected r,g,b or #rrggbb)", s))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the CLI and return an OS exit code: success only if every design was
/// written.
pub fn run(args: CliArgs) -> ExitCode {
    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let script = match &args.events {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(GradcapError::from)
            .and_then(|text| EventScript::from_json(&text))
        {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("error: could not read events '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() && script.is_none() {
        eprintln!("error: nothing to draw; give --input image(s) and/or --events.");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    // No images: a single design drawn purely from the event script.
    let jobs: Vec<Option<PathBuf>> = if inputs.is_empty() {
        vec![None]
    } else {
        inputs.into_iter().map(Some).collect()
    };

    let total = jobs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input) in jobs.iter().enumerate() {
        let label = input
            .as_deref()
            .map_or_else(|| "(blank)".to_string(), |p| p.display().to_string());
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, label);
        }
        let start = Instant::now();
        let output = build_output_path(
            input.as_deref(),
            args.output.as_deref(),
            args.output_dir.as_deref(),
        );

        match run_one(input.as_deref(), &output, &config, script.as_ref(), &args) {
            Ok(summary) => {
                log_info!("{} → {} ({})", label, output.display(), summary);
                if args.verbose || multi {
                    println!(
                        "  → {} ({}, {:.0}ms)",
                        output.display(),
                        summary,
                        start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", label, e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Config file (if any) with command-line overrides applied.
pub fn build_config(args: &CliArgs) -> Result<CanvasConfig> {
    let mut config = match &args.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };
    if let Some(n) = args.grid_size {
        config.grid_size = n;
    }
    if let Some(k) = args.palette_capacity {
        config.palette_capacity = k;
    }
    if args.legacy_palette {
        config.palette_policy = PalettePolicy::Legacy;
    }
    if args.background.is_some() {
        config.export_background = args.background;
    }
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Per-design pipeline
// ============================================================================

fn run_one(
    input:  Option<&Path>,
    output: &Path,
    config: &CanvasConfig,
    script: Option<&EventScript>,
    args:   &CliArgs,
) -> Result<String> {
    let surface = match script {
        Some(s) => s.surface,
        // one surface unit per cell
        None => Surface::new(config.grid_size as f32, config.grid_size as f32)?,
    };
    let mut session = Session::headless(config, surface)?;

    // -- Step 1: Import ----------------------------------------------------
    let mut lit = 0;
    if let Some(path) = input {
        session.begin_import()?;
        let report = session.complete_import(load_image_sync(path))?;
        lit = report.painted;
    }

    // -- Step 2: Replay events -------------------------------------------
    if let Some(script) = script {
        for event in &script.events {
            session.dispatch(event.clone())?;
        }
    }

    // -- Step 3: Export ------------------------------------------------------
    let grid = session.controller().grid();
    let img = upscale(&to_rgba_image(grid, config.export_background), args.scale)?;
    encode_and_write(&img, output)?;

    if args.preview {
        print!("{}", ansi_preview(grid, config.off_color));
    }

    Ok(format!(
        "{} imported, {} of {} cells lit",
        lit,
        grid.painted_count(),
        grid.size() * grid.size()
    ))
}

// ============================================================================
// Helpers
// ============================================================================

/// Every input the patterns name, in first-seen order without repeats.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    for path in patterns.iter().flat_map(|p| expand_pattern(p)) {
        if !inputs.contains(&path) {
            inputs.push(path);
        }
    }
    inputs
}

/// An existing file is taken as-is; anything else is tried as a glob.
fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let literal = PathBuf::from(pattern);
    if literal.exists() {
        return vec![literal];
    }
    let matches: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(e) => {
            log_warn!("input '{}' is neither a file nor a valid glob: {}", pattern, e);
            eprintln!("warning: skipping '{}': {}", pattern, e);
            return Vec::new();
        }
    };
    if matches.is_empty() {
        log_warn!("input '{}' matched nothing", pattern);
        eprintln!("warning: no input matches '{}'", pattern);
    }
    matches
}

/// Where a design is written.
///
/// Priority:
/// 1. `--output`
/// 2. `--output-dir`, named after the input stem (or the default stem)
/// 3. next to the input as `<stem>-cap.png`, or `graduation-cap-design.png`
///    in the working directory for a blank design
fn build_output_path(input: Option<&Path>, output: Option<&Path>, output_dir: Option<&Path>) -> PathBuf {
    if let Some(out) = output {
        return out.to_path_buf();
    }

    let stem = input
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned());

    if let Some(dir) = output_dir {
        return dir.join(format!("{}.png", stem.as_deref().unwrap_or(EXPORT_STEM)));
    }

    match (input, stem) {
        (Some(path), Some(stem)) => path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("{}-cap.png", stem)),
        _ => PathBuf::from(format!("{}.png", EXPORT_STEM)),
    }
}
