//! qfence Circuit Intermediate Representation
//!
//! Core data structures for describing a parameterized circuit over the
//! physical sites of a device.
//!
//! # Core Components
//!
//! - **Sites and pairs**: [`QubitId`] names one physical site, [`QubitPair`] an
//!   unordered pair of distinct sites keyed canonically as `"lo-hi"`
//! - **Classical bits**: [`ClbitId`] indexes the output register
//! - **Parameters**: [`ParameterExpression`] for the free variational parameters
//!   and [`ParameterBindings`] for their concrete values
//! - **Gates**: [`StandardGate`] and device-specific [`CustomGate`]
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] builder with operand validation
//!
//! # Example
//!
//! ```rust
//! use qfence_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new("pair");
//! let a = circuit.add_qubit(31u32).unwrap();
//! let b = circuit.add_qubit(32u32).unwrap();
//! let gamma = circuit.declare_parameter("gamma").unwrap();
//! let ro = circuit.add_creg(2);
//!
//! circuit.h(a).unwrap().h(b).unwrap();
//! circuit.rzz(gamma.scaled(0.5), a, b).unwrap();
//! circuit.measure(a, ro[0]).unwrap();
//! circuit.measure(b, ro[1]).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.qubits()[0], QubitId(31));
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::{ParameterBindings, ParameterExpression};
pub use qubit::{ClbitId, QubitId, QubitPair};
