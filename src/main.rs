//! Dot-matrix display simulator for desktop.
//!
//! Renders the display into an embedded-graphics-simulator window and lets
//! the user switch shapes while the animation keeps running.
//!
//! # Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | `A` / `D` | Previous / next shape |
//! | `I` | Toggle block ids |
//! | `N` | Shape `none` |
//! | `Q`, window close | Quit |
//! | stdin: shape name | Select that shape |
//! | stdin: `list` | Print available shapes |
//! | stdin: `quit` | Quit |
//!
//! `RUST_LOG` controls log verbosity (default `info`).

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod cli;

use std::io::{self, BufRead};
use std::process;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use clap::Parser;
use dot_matrix_display::driver::share;
use dot_matrix_display::{CancellationToken, DotMatrixDisplay, FrameDriver, GraphicsSurface, SharedDisplay};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};

use crate::cli::Cli;

type Surface = GraphicsSurface<SimulatorDisplay<Rgb888>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match cli.display_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            process::exit(1);
        }
    };
    let interval = config.animation_interval();
    let shape_names: Vec<String> = config.shapes.names().map(str::to_owned).collect();

    let canvas = SimulatorDisplay::<Rgb888>::new(Size::new(config.screen_width, config.screen_height));
    let surface = Some(GraphicsSurface::new(canvas));

    let display = match cli.seed {
        Some(seed) => DotMatrixDisplay::with_seed(config, surface, seed),
        None => DotMatrixDisplay::new(config, surface),
    };
    let mut display = match display {
        Ok(display) => display,
        Err(e) => {
            log::error!("Failed to create display: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = display.initialize() {
        log::error!("Failed to initialize display: {e}");
        process::exit(1);
    }
    if display.set_target_shape(&cli.shape).is_ok() {
        log::info!("Initial shape set to: {}", cli.shape);
    }

    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Dot Matrix Display", &output_settings);
    if let Some(surface) = display.surface() {
        window.update(surface.target());
    }

    let display = share(display);
    let token = CancellationToken::new();
    let input = spawn_input_thread(Arc::clone(&display), token.clone());

    println!("Enter a shape name to change the display, 'list' to show shapes, or 'quit' to exit.");

    // ==========================================================================
    // Main Loop
    // ==========================================================================

    let mut driver = FrameDriver::new(interval);
    driver.run(&display, &token, |display, report| {
        if report.is_some() {
            if let Some(surface) = display.surface() {
                window.update(surface.target());
            }
        }

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => token.cancel(),
                SimulatorEvent::KeyDown { keycode, repeat, .. } if !repeat => {
                    handle_key(keycode, display, &shape_names, &token);
                }
                _ => {}
            }
        }
    });

    // ==========================================================================
    // Shutdown
    // ==========================================================================

    log::info!("Stopping animation...");
    token.cancel();
    if input.is_finished() {
        if input.join().is_err() {
            log::warn!("Input thread panicked");
        }
    } else {
        // Blocked on stdin; it ends with the process
        log::warn!("Input thread did not stop cleanly");
    }

    match display.lock() {
        Ok(mut display) => {
            display.cleanup();
            if let Some(surface) = display.surface() {
                window.update(surface.target());
            }
        }
        Err(_) => log::error!("Display lock poisoned, skipping cleanup"),
    }

    log::info!("Simulator finished");
}

/// Apply one key press in the simulator window.
fn handle_key(
    keycode: Keycode,
    display: &mut DotMatrixDisplay<Surface>,
    shapes: &[String],
    token: &CancellationToken,
) {
    match keycode {
        Keycode::Q => token.cancel(),
        Keycode::N => select_shape(display, "none"),
        Keycode::A => {
            if let Some(name) = cycle_shape(shapes, display.selected_shape(), false) {
                select_shape(display, &name);
            }
        }
        Keycode::D => {
            if let Some(name) = cycle_shape(shapes, display.selected_shape(), true) {
                select_shape(display, &name);
            }
        }
        Keycode::I => {
            let show = !display.config().show_ids;
            match display.set_show_ids(show) {
                Ok(()) => log::info!("Block ids {}", if show { "shown" } else { "hidden" }),
                Err(e) => log::error!("Failed to toggle block ids: {e}"),
            }
        }
        _ => {}
    }
}

fn select_shape(display: &mut DotMatrixDisplay<Surface>, name: &str) {
    if display.set_target_shape(name).is_ok() {
        log::info!("Shape: {name}");
    }
}

/// Shape after (or before) `current` in `shapes`, wrapping around.
///
/// An unrecognized `current` starts from the first shape.
fn cycle_shape(shapes: &[String], current: &str, forward: bool) -> Option<String> {
    if shapes.is_empty() {
        return None;
    }
    let len = shapes.len();
    let next = match shapes.iter().position(|name| name == current) {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None => 0,
    };
    shapes.get(next).cloned()
}

/// Read shape names from stdin until `quit`, EOF, or cancellation.
fn spawn_input_thread(display: SharedDisplay<Surface>, token: CancellationToken) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            if token.is_cancelled() {
                break;
            }
            let Ok(line) = line else {
                break;
            };

            let input = line.trim().to_lowercase();
            match input.as_str() {
                "" => {}
                "quit" => break,
                "list" => {
                    let Ok(display) = display.lock() else {
                        break;
                    };
                    println!("Available shapes:");
                    for name in display.config().shapes.names() {
                        println!("- {name}");
                    }
                }
                name => {
                    let Ok(mut display) = display.lock() else {
                        break;
                    };
                    if display.config().shapes.contains(name) {
                        if display.set_target_shape(name).is_ok() {
                            println!("Shape set to '{name}'");
                        }
                    } else {
                        println!("Invalid shape '{name}'. Shape not changed.");
                    }
                }
            }
        }
        token.cancel();
    })
}
