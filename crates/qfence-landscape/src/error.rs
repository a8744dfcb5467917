//! Error types for sweeps and cost evaluation.

use qfence_hal::HalError;
use qfence_ir::{IrError, QubitId, QubitPair};
use qfence_isa::IsaError;
use thiserror::Error;

/// Errors raised while building, sweeping or scoring an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LandscapeError {
    /// An assignment does not cover every site of the graph.
    #[error("No value assigned to site {site}")]
    MissingAssignment { site: QubitId },

    /// The backend failed a sweep request.
    #[error("Backend dispatch failed at grid point {index}: {source}")]
    BackendDispatch {
        index: usize,
        #[source]
        source: HalError,
    },

    /// The backend answered with zero shots.
    #[error("Backend returned no shots for grid point {index}")]
    EmptyBatch { index: usize },

    /// The parameter grid cannot be built.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// An explicit edge weight lies outside [-1, 1].
    #[error("Weight {weight} of edge {pair} is outside [-1, 1]")]
    InvalidWeight { pair: QubitPair, weight: f64 },

    /// The same edge was given twice.
    #[error("Edge {0} appears more than once")]
    DuplicateEdge(QubitPair),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Circuit error.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Catalog or calibration error.
    #[error("ISA error: {0}")]
    Isa(#[from] IsaError),

    /// Compilation, assembly or device error outside a sweep request.
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),
}

/// Result type for landscape operations.
pub type LandscapeResult<T> = Result<T, LandscapeError>;
