//! Native compilation and assembly contracts.

use qfence_ir::Circuit;
use qfence_isa::RestrictedCatalog;

use crate::error::HalResult;
use crate::program::{Executable, NativeProgram};

/// Lowers a portable circuit into native-gate form.
///
/// Implementations MUST only emit two-qubit operations that the restricted
/// catalog retains, and MUST keep the circuit's declared parameters and its
/// measurement register unchanged.
pub trait NativeCompiler: Send + Sync {
    /// Name of the compiler.
    fn name(&self) -> &str;

    /// Compile `circuit` against `catalog`.
    fn compile(&self, circuit: &Circuit, catalog: &RestrictedCatalog) -> HalResult<NativeProgram>;
}

/// Turns a native program into something a backend can run.
pub trait ExecutableBuilder: Send + Sync {
    /// Assemble `program`.
    fn assemble(&self, program: NativeProgram) -> HalResult<Executable>;
}
