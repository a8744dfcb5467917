//! Global versus local fencing.
//!
//! Both policies restrict the device catalog to one two-qubit operator and
//! compile against it. They differ only in the calibrations the executable
//! runs with:
//!
//! - [`FencingPolicy::Global`] keeps the device calibrations, whose fences
//!   serialize every two-qubit pulse against the whole device.
//! - [`FencingPolicy::Local`] composes the rewritten fragment onto the
//!   program, so each definition only fences its own operands.

use std::fmt;
use std::str::FromStr;

use qfence_hal::{Backend, DeviceSnapshot, Executable, ExecutableBuilder, NativeCompiler};
use qfence_ir::Circuit;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::ansatz::build_circuit;
use crate::error::{LandscapeError, LandscapeResult};
use crate::graph::WeightedGraph;
use crate::grid::ParameterGrid;
use crate::landscape::ScoreLandscape;
use crate::sweep::SweepDriver;

/// How two-qubit operations are fenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FencingPolicy {
    /// Device calibrations as retrieved.
    #[default]
    Global,
    /// Fences scoped to each definition's operands.
    Local,
}

impl fmt::Display for FencingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FencingPolicy::Global => write!(f, "global"),
            FencingPolicy::Local => write!(f, "local"),
        }
    }
}

impl FromStr for FencingPolicy {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(FencingPolicy::Global),
            "local" => Ok(FencingPolicy::Local),
            other => Err(LandscapeError::Config(format!(
                "unknown fencing policy '{other}'"
            ))),
        }
    }
}

/// Restrict, compile, optionally patch and assemble `circuit` for `snapshot`.
#[instrument(skip(circuit, snapshot, compiler, assembler), fields(
    circuit = %circuit.name(),
    device = %snapshot.name(),
    compiler = %compiler.name(),
))]
pub fn prepare_executable(
    circuit: &Circuit,
    snapshot: &DeviceSnapshot,
    compiler: &dyn NativeCompiler,
    assembler: &dyn ExecutableBuilder,
    operator: &str,
    policy: FencingPolicy,
) -> LandscapeResult<Executable> {
    let restricted = snapshot.catalog().restrict(operator)?;
    let mut program = compiler.compile(circuit, &restricted)?;

    if policy == FencingPolicy::Local {
        let fragment = snapshot.calibrations().rewrite(operator)?;
        info!(definitions = fragment.len(), "composing locally fenced calibrations");
        program.compose(&fragment);
    }

    Ok(assembler.assemble(program)?)
}

/// Landscapes for both policies over the same grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyComparison {
    pub global: ScoreLandscape,
    pub local: ScoreLandscape,
}

impl PolicyComparison {
    pub fn get(&self, policy: FencingPolicy) -> &ScoreLandscape {
        match policy {
            FencingPolicy::Global => &self.global,
            FencingPolicy::Local => &self.local,
        }
    }
}

/// Everything needed to turn a graph into executables on one device.
#[derive(Clone, Copy)]
pub struct Experiment<'a> {
    pub snapshot: &'a DeviceSnapshot,
    pub compiler: &'a dyn NativeCompiler,
    pub assembler: &'a dyn ExecutableBuilder,
    pub operator: &'a str,
}

impl Experiment<'_> {
    /// Build the circuit for `graph` and prepare it under `policy`.
    pub fn prepare(&self, graph: &WeightedGraph, policy: FencingPolicy) -> LandscapeResult<Executable> {
        let circuit = build_circuit(graph)?;
        prepare_executable(
            &circuit,
            self.snapshot,
            self.compiler,
            self.assembler,
            self.operator,
            policy,
        )
    }

    /// Sweep one policy.
    pub async fn sweep<B: Backend>(
        &self,
        driver: &SweepDriver<B>,
        graph: &WeightedGraph,
        grid: &ParameterGrid,
        policy: FencingPolicy,
    ) -> LandscapeResult<ScoreLandscape> {
        let executable = self.prepare(graph, policy)?;
        driver.sweep(&executable, graph, grid).await
    }

    /// Sweep the global policy, then the local one.
    pub async fn compare_policies<B: Backend>(
        &self,
        driver: &SweepDriver<B>,
        graph: &WeightedGraph,
        grid: &ParameterGrid,
    ) -> LandscapeResult<PolicyComparison> {
        let global = self.sweep(driver, graph, grid, FencingPolicy::Global).await?;
        let local = self.sweep(driver, graph, grid, FencingPolicy::Local).await?;
        Ok(PolicyComparison { global, local })
    }
}
