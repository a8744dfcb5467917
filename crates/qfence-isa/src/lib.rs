//! Native instruction sets and calibration rewriting for qfence.
//!
//! This crate owns the two program transformations that decide the fencing
//! behaviour of an executable:
//!
//! - **ISA restriction**: [`OperationCatalog::restrict`] narrows a device's
//!   two-qubit catalog to a single operator.
//! - **Fence rewriting**: [`CalibrationSet::rewrite`] replaces every global
//!   `FENCE` in that operator's calibrations by a fence on the calibration's
//!   own operand sites, leaving pulse content and order untouched.
//!
//! Calibration programs are read with [`parse_calibrations`] and printed
//! with [`emit_fragment`].
//!
//! # Example
//!
//! ```rust
//! use qfence_isa::{parse_calibrations, emit_fragment};
//!
//! let program = "\
//! DEFCAL CZ 31 32:
//!     FENCE
//!     NONBLOCKING PULSE 31 32 \"cz\" flat(duration: 1.6e-7, iq: 1.0)
//! ";
//!
//! let calibrations = parse_calibrations(program).unwrap();
//! let fragment = calibrations.rewrite("CZ").unwrap();
//! assert!(emit_fragment(&fragment).contains("FENCE 31 32"));
//! ```

pub mod calibration;
pub mod catalog;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod parser;

pub use calibration::{
    CalInstruction, CalibrationDefinition, CalibrationKey, CalibrationSet, Fence, FrameOpKind,
    operator_arity,
};
pub use catalog::{OperationCatalog, RestrictedCatalog};
pub use emitter::{emit_definition, emit_fragment};
pub use error::{IsaError, IsaResult};
pub use parser::parse_calibrations;
