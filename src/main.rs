//! logctl - consumed-log marker store CLI tool
//!
//! A developer-friendly command-line interface for inspecting the
//! deduplication markers and delivery cursor of a tracker database.

use roundwatch::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
