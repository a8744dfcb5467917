//! qfence Hardware Abstraction Layer
//!
//! Contracts for the collaborators a fencing experiment talks to:
//!
//! - [`DeviceSnapshot`]: catalog and calibration program of one device
//! - [`NativeCompiler`]: lowers a circuit to native gates under a
//!   [`RestrictedCatalog`](qfence_isa::RestrictedCatalog)
//! - [`ExecutableBuilder`]: assembles a [`NativeProgram`] into an [`Executable`]
//! - [`Backend`]: runs an executable and returns a [`ShotBatch`]
//!
//! Reference implementations live in `qfence-adapter-sim`.

pub mod backend;
pub mod compiler;
pub mod device;
pub mod error;
pub mod program;
pub mod result;

pub use backend::Backend;
pub use compiler::{ExecutableBuilder, NativeCompiler};
pub use device::DeviceSnapshot;
pub use error::{HalError, HalResult};
pub use program::{Executable, NativeProgram};
pub use result::ShotBatch;
