//! qfence demo suite
//!
//! Console helpers plus a synthetic device whose calibrations fence every
//! two-qubit pulse globally, so that the local rewrite has something to do.

use std::fmt::Write as _;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qfence_hal::{DeviceSnapshot, HalResult};
use qfence_ir::QubitPair;
use qfence_isa::{OperationCatalog, parse_calibrations};
use qfence_landscape::{Cell, ScoreLandscape};

/// Create a progress bar for sweep progress.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .map(|s| s.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
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

/// Print a landscape with β down the rows and γ across the columns.
pub fn print_landscape(landscape: &ScoreLandscape) {
    let values = landscape.grid().values();
    let header: Vec<String> = values.iter().map(|g| format!("{g:>7.3}")).collect();
    println!("  {}  {}", style(" β \\ γ ").dim(), style(header.join(" ")).dim());
    for (row, beta) in values.iter().enumerate() {
        let cells: Vec<String> = (0..landscape.width())
            .filter_map(|col| landscape.get(row, col))
            .map(|s| format!("{s:>7.3}"))
            .collect();
        println!("  {}  {}", style(format!("{beta:>7.3}")).dim(), cells.join(" "));
    }
}

/// One-line description of an extremal cell.
pub fn describe_cell(cell: &Cell) -> String {
    format!(
        "{:.4} at β = {:.3}, γ = {:.3}",
        cell.score, cell.point.beta, cell.point.gamma
    )
}

/// Calibration program for [`demo_device`]: one `RX` per site, and `CZ`
/// plus `CPHASE` per pair, each two-qubit definition bracketed by global
/// fences.
pub fn demo_calibration_program(pairs: &[QubitPair]) -> String {
    let mut sites: Vec<_> = pairs.iter().flat_map(|p| p.sites()).collect();
    sites.sort();
    sites.dedup();

    let mut text = String::new();
    for site in &sites {
        let _ = writeln!(text, "DEFCAL RX(%theta) {site}:");
        let _ = writeln!(text, "    FENCE {site}");
        let _ = writeln!(text, "    NONBLOCKING PULSE {site} \"rf\" drag(alpha: %theta)");
        let _ = writeln!(text, "    FENCE {site}");
    }
    for pair in pairs {
        let (a, b) = (pair.lo(), pair.hi());
        let _ = writeln!(text, "DEFCAL CZ {a} {b}:");
        let _ = writeln!(text, "    FENCE");
        let _ = writeln!(
            text,
            "    NONBLOCKING PULSE {a} {b} \"cz\" flat(duration: 1.6e-7, iq: 1.0)"
        );
        let _ = writeln!(text, "    SHIFT-PHASE {a} \"rf\" 0.25");
        let _ = writeln!(text, "    FENCE");
        let _ = writeln!(text, "DEFCAL CPHASE(%theta) {a} {b}:");
        let _ = writeln!(text, "    FENCE");
        let _ = writeln!(
            text,
            "    NONBLOCKING PULSE {a} {b} \"cphase\" flat(duration: 2e-7, iq: %theta)"
        );
        let _ = writeln!(text, "    FENCE");
    }
    text
}

/// A device offering `RX`/`RZ` on every site and `CZ`/`CPHASE` on every
/// pair in `pairs`.
pub fn demo_device(pairs: &[QubitPair]) -> HalResult<DeviceSnapshot> {
    let mut catalog = OperationCatalog::new();
    for pair in pairs {
        for site in pair.sites() {
            catalog = catalog.with_site(site, ["RX", "RZ"]);
        }
        catalog = catalog.with_pair(*pair, ["CZ", "CPHASE"]);
    }
    let calibrations = parse_calibrations(&demo_calibration_program(pairs))?;
    Ok(DeviceSnapshot::new("demo-chip", catalog, calibrations))
}
