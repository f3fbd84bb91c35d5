//! Entry point for the wobble visualizer: discovers directories, loads
//! `wobble.toml`, starts the settings hot-reload watcher, and hands the window
//! over to the renderer with keyboard controls attached.
//!
//! Types:
//!
//! - None; this module only orchestrates submodules.
//!
//! Functions:
//!
//! - `main` initialises tracing and delegates to `run::run`.

mod controls;
mod paths;
mod run;
mod watch;

use anyhow::Result;

fn main() -> Result<()> {
    run::initialise_tracing();
    run::run()
}
