//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `repodraw_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use repodraw_core::{core_version, default_log_level, init_logging, ping};

fn main() {
    // Optional first argument: absolute log directory. Exercises the full
    // logging bootstrap at the build-mode default level.
    if let Some(log_dir) = std::env::args().nth(1) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging init failed: {err}");
            std::process::exit(1);
        }
    }

    println!("repodraw_core ping={}", ping());
    println!("repodraw_core version={}", core_version());
}
