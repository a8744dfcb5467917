//! Global versus local fencing demo
//!
//! Sweeps the (β, γ) landscape of a one-layer Max-Cut circuit twice, once
//! with the device calibrations and once with fences scoped to each
//! definition's operands, and prints both landscapes side by side.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qfence_adapter_sim::{BasisCompiler, SimulatorBackend, TextAssembler};
use qfence_demos::{
    create_progress_bar, demo_device, describe_cell, print_header, print_landscape, print_result,
    print_section, print_success,
};
use qfence_isa::emit_fragment;
use qfence_landscape::{Experiment, FencingPolicy, PolicyComparison, SweepConfig, SweepDriver};

#[derive(Parser, Debug)]
#[command(name = "demo-landscape")]
#[command(about = "Compare global and local fencing over a (beta, gamma) landscape")]
struct Args {
    /// YAML configuration file (QFENCE_* variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid points per axis
    #[arg(short, long)]
    width: Option<usize>,

    /// Shots per grid point
    #[arg(short, long)]
    shots: Option<u32>,

    /// Requests in flight at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Designated two-qubit operator
    #[arg(short, long)]
    operator: Option<String>,

    /// Seed for edge weights and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Print the locally fenced calibration fragment
    #[arg(long)]
    show_fragment: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, mut config: SweepConfig) -> anyhow::Result<SweepConfig> {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(operator) = &self.operator {
            config.operator.clone_from(operator);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = SweepConfig::load(args.config.as_deref()).context("loading configuration")?;
    let config = args.apply(config)?;
    info!(?config, "configuration loaded");

    print_header("Global vs Local Fencing");

    let graph = config.graph()?;
    let grid = config.grid()?;
    let device = demo_device(&config.edges)?;

    print_section("Problem Setup");
    print_result("Device", device.name());
    print_result("Operator", &config.operator);
    print_result("Sites", graph.num_sites());
    for (u, v, w) in graph.edges() {
        print_result(&format!("  edge {u}-{v}"), format!("{w:+.4}"));
    }
    print_result("Grid", format!("{0} x {0} over [0, π]", grid.width()));
    print_result("Shots per point", config.shots);
    print_result("Concurrency", config.concurrency);

    let compiler = BasisCompiler::new();
    let assembler = TextAssembler::new();
    let experiment = Experiment {
        snapshot: &device,
        compiler: &compiler,
        assembler: &assembler,
        operator: &config.operator,
    };

    print_section("Calibrations");
    let fragment = device.calibrations().rewrite(&config.operator)?;
    let scoped: usize = fragment.iter().map(|d| d.body.len()).sum();
    print_result("Device definitions", device.calibrations().len());
    print_result("Rewritten definitions", fragment.len());
    print_result("Instructions in fragment", scoped);
    if args.show_fragment {
        println!();
        for line in emit_fragment(&fragment).lines() {
            println!("    {line}");
        }
    }

    print_section("Sweeping");
    let pb = create_progress_bar(2 * grid.len() as u64, "global");
    let ticker = pb.clone();
    let driver = SweepDriver::new(SimulatorBackend::new().with_seed(config.seed))
        .with_shots(config.shots)
        .with_concurrency(config.concurrency)
        .with_observer(move |_, _| ticker.inc(1));

    let global = experiment
        .sweep(&driver, &graph, &grid, FencingPolicy::Global)
        .await?;
    pb.set_message("local");
    let local = experiment
        .sweep(&driver, &graph, &grid, FencingPolicy::Local)
        .await?;
    pb.finish_with_message("done");
    let comparison = PolicyComparison { global, local };

    for policy in [FencingPolicy::Global, FencingPolicy::Local] {
        let landscape = comparison.get(policy);
        print_section(&format!("{policy} fencing"));
        print_landscape(landscape);
        println!();
        if let Some(cell) = landscape.argmin() {
            print_result("Minimum", describe_cell(&cell));
        }
        if let Some(cell) = landscape.argmax() {
            print_result("Maximum", describe_cell(&cell));
        }
        if let Some(mean) = landscape.mean() {
            print_result("Mean", format!("{mean:.4}"));
        }
    }

    print_section("Comparison");
    let diff = comparison
        .global
        .difference(&comparison.local)
        .context("landscapes cover different grids")?;
    let largest = diff.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    print_result("Largest cell difference", format!("{largest:.4}"));
    println!();
    print_success("Both landscapes computed");

    Ok(())
}
