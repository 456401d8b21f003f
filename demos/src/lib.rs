//! MBQC Demo Suite
//!
//! Command-line demonstrations of the pattern compiler and runtime:
//!
//! - **demo-random-circuit**: compiles random circuits and checks the
//!   pattern output against direct simulation
//! - **demo-rotation**: walks through the pattern of a single rotation

use std::f64::consts::PI;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mbqc_ir::{Circuit, QubitId};
use rand::Rng;
use tracing_subscriber::EnvFilter;

/// Install the `tracing` subscriber.
///
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// A random circuit of `depth` layers over `width` wires.
///
/// Each layer draws one rotation per wire and, for two or more wires, one
/// entangling gate on a random pair.
pub fn random_circuit<R: Rng>(width: u32, depth: u32, rng: &mut R) -> anyhow::Result<Circuit> {
    let mut circuit = Circuit::with_size(format!("random_{width}x{depth}"), width);
    for _ in 0..depth {
        for q in 0..width {
            let qubit = QubitId(q);
            let angle = rng.gen_range(-PI..PI);
            match rng.gen_range(0..5) {
                0 => circuit.h(qubit)?,
                1 => circuit.t(qubit)?,
                2 => circuit.rx(angle, qubit)?,
                3 => circuit.ry(angle, qubit)?,
                _ => circuit.rz(angle, qubit)?,
            };
        }
        if width >= 2 {
            let a = rng.gen_range(0..width);
            let b = (a + rng.gen_range(1..width)) % width;
            match rng.gen_range(0..3) {
                0 => circuit.cx(QubitId(a), QubitId(b))?,
                1 => circuit.cz(QubitId(a), QubitId(b))?,
                _ => circuit.swap(QubitId(a), QubitId(b))?,
            };
        }
    }
    Ok(circuit)
}

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a failure message.
pub fn print_failure(message: &str) {
    println!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}
