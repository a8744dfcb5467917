//! Error types for catalog and calibration handling.

use qfence_ir::QubitId;
use thiserror::Error;

/// Errors that can occur while reading catalogs or rewriting calibrations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IsaError {
    /// A catalog entry does not have the expected shape.
    #[error("Malformed catalog entry '{key}': {reason}")]
    MalformedCatalog {
        /// Key of the offending entry (site, pair or section name).
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A calibration definition with no operand sites.
    #[error("Calibration '{name}' has no operand sites; a fence cannot be scoped to zero sites")]
    InvalidOperands {
        /// Operator name of the definition.
        name: String,
    },

    /// A scoped fence listing no sites.
    #[error("Calibration '{name}' contains a scoped fence with no sites")]
    EmptyScopedFence {
        /// Operator name of the definition.
        name: String,
    },

    /// Operand count does not match the operator's arity.
    #[error("Calibration '{name}' expects {expected} operand sites, got {got}")]
    ArityMismatch {
        /// Operator name of the definition.
        name: String,
        /// Arity of the operator.
        expected: usize,
        /// Number of operands declared.
        got: usize,
    },

    /// The same site listed twice as an operand.
    #[error("Calibration '{name}' lists operand site {site} twice")]
    DuplicateOperand {
        /// Operator name of the definition.
        name: String,
        /// The repeated site.
        site: QubitId,
    },

    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    Lexer { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input at line {line}: {message}")]
    UnexpectedEof { line: usize, message: String },

    /// The same parameter declared twice in one header.
    #[error("Calibration '{name}' declares parameter '%{parameter}' twice")]
    DuplicateParameter {
        /// Operator name of the definition.
        name: String,
        /// The repeated parameter.
        parameter: String,
    },

    /// Restriction requested for an empty operator name.
    #[error("Operator name must not be empty")]
    EmptyOperator,

    /// IR error (site or pair construction).
    #[error("IR error: {0}")]
    Ir(#[from] qfence_ir::IrError),
}

/// Result type for ISA operations.
pub type IsaResult<T> = Result<T, IsaError>;
