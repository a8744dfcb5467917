//! qfence Local Statevector Simulator
//!
//! Reference collaborators for running fencing experiments without a
//! device:
//!
//! - [`SimulatorBackend`]: exact statevector evolution with seeded sampling
//! - [`FixedBatchBackend`]: answers every request with one fixed batch
//! - [`BasisCompiler`]: lowers circuits onto `RX(±π/2)`, `RZ` and `CZ` / `CPHASE`
//! - [`TextAssembler`]: renders a native program as its executable text
//!
//! Calibrations and fences are not modelled by the simulator, so global and
//! locally fenced executables produce the same distribution here.
//!
//! # Performance
//!
//! | Sites | Memory | Simulation Speed |
//! |-------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//!
//! # Example
//!
//! ```ignore
//! use qfence_adapter_sim::{BasisCompiler, SimulatorBackend, TextAssembler};
//! use qfence_hal::{Backend, ExecutableBuilder, NativeCompiler};
//!
//! let program = BasisCompiler::new().compile(&circuit, &restricted)?;
//! let executable = TextAssembler::new().assemble(program)?;
//! let batch = SimulatorBackend::new().with_seed(7).run(&executable, &bindings, 1000).await?;
//! ```

mod assembler;
mod compiler;
mod fixed;
mod simulator;
mod statevector;

pub use assembler::TextAssembler;
pub use compiler::BasisCompiler;
pub use fixed::FixedBatchBackend;
pub use simulator::SimulatorBackend;
