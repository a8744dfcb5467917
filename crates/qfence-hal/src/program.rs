//! Native programs and executables.
//!
//! A [`NativeProgram`] is the output of a native compiler: declarations, the
//! calibration overrides composed onto it and an instruction stream that
//! only uses operators from the restricted catalog. Calibrations not
//! overridden here come from the device itself.

use std::fmt;

use qfence_ir::{Instruction, InstructionKind};
use qfence_isa::{CalibrationSet, emit_fragment};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A compiled, native-gate program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeProgram {
    /// Program name.
    pub name: String,
    /// Declared free parameters, in declaration order.
    pub parameters: Vec<String>,
    /// Size of the `ro` output register.
    pub ro_size: usize,
    /// Native instructions in program order.
    pub instructions: Vec<Instruction>,
    /// Calibration overrides.
    pub calibrations: CalibrationSet,
}

impl NativeProgram {
    /// Create an empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: vec![],
            ro_size: 0,
            instructions: vec![],
            calibrations: CalibrationSet::new(),
        }
    }

    /// Append a calibration fragment. For a key already present, the
    /// fragment's definition replaces the existing one.
    pub fn compose(&mut self, fragment: &CalibrationSet) {
        let before = self.calibrations.len();
        self.calibrations.extend(fragment);
        debug!(
            program = %self.name,
            added = fragment.len(),
            overridden = before + fragment.len() - self.calibrations.len(),
            "composed calibration fragment"
        );
    }

    /// Builder form of [`NativeProgram::compose`].
    #[must_use]
    pub fn with_fragment(mut self, fragment: &CalibrationSet) -> Self {
        self.compose(fragment);
        self
    }

    /// Number of two-qubit native gates.
    pub fn two_qubit_gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(Instruction::as_gate)
            .filter(|g| g.num_qubits() == 2)
            .count()
    }
}

fn fmt_instruction(f: &mut fmt::Formatter<'_>, inst: &Instruction) -> fmt::Result {
    match &inst.kind {
        InstructionKind::Gate(gate) => {
            write!(f, "{}", gate.name())?;
            let params = gate.parameters();
            if !params.is_empty() {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
            }
            for q in &inst.qubits {
                write!(f, " {q}")?;
            }
        }
        InstructionKind::Measure => {
            write!(f, "MEASURE")?;
            for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                write!(f, " {q} {c}")?;
            }
        }
        InstructionKind::Reset => {
            write!(f, "RESET")?;
            for q in &inst.qubits {
                write!(f, " {q}")?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for NativeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ro_size > 0 {
            writeln!(f, "DECLARE ro BIT[{}]", self.ro_size)?;
        }
        for p in &self.parameters {
            writeln!(f, "DECLARE {p} REAL[1]")?;
        }
        if !self.calibrations.is_empty() {
            write!(f, "{}", emit_fragment(&self.calibrations))?;
        }
        for inst in &self.instructions {
            fmt_instruction(f, inst)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// An assembled program, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executable {
    program: NativeProgram,
    text: String,
}

impl Executable {
    /// Wrap an assembled program and its rendered text.
    pub fn new(program: NativeProgram, text: impl Into<String>) -> Self {
        Self {
            program,
            text: text.into(),
        }
    }

    /// The structured program.
    pub fn program(&self) -> &NativeProgram {
        &self.program
    }

    /// The assembled program text.
    pub fn text(&self) -> &str {
        &self.text
    }
}
