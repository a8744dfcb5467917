//! Error types for the HAL crate.

use thiserror::Error;

/// Errors raised by device, compiler and backend collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The backend rejected or failed a request.
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// Native compilation failed.
    #[error("Compilation failed: {0}")]
    Compilation(String),

    /// Building the executable failed.
    #[error("Assembly failed: {0}")]
    Assembly(String),

    /// Unsupported feature.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// A returned batch does not have the expected shape.
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// Catalog or calibration error.
    #[error("ISA error: {0}")]
    Isa(#[from] qfence_isa::IsaError),

    /// Circuit error.
    #[error("IR error: {0}")]
    Ir(#[from] qfence_ir::IrError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
