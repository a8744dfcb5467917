//! High-level circuit builder API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId};

/// A parameterized quantum circuit over physical sites.
///
/// Instructions are kept in program order. Every operand must be declared
/// before it is used and every symbol in a gate parameter must be a
/// declared free parameter, so a circuit that was built without error is
/// always well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Declared sites, in declaration order.
    qubits: Vec<QubitId>,
    /// Declared free parameters, in declaration order.
    parameters: Vec<String>,
    /// Size of the output register.
    num_clbits: u32,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            parameters: vec![],
            num_clbits: 0,
            instructions: vec![],
        }
    }

    /// Declare a physical site.
    pub fn add_qubit(&mut self, qubit: impl Into<QubitId>) -> IrResult<QubitId> {
        let qubit = qubit.into();
        if self.qubits.contains(&qubit) {
            return Err(IrError::DuplicateDeclaration(qubit));
        }
        self.qubits.push(qubit);
        Ok(qubit)
    }

    /// Declare a free real parameter and return its symbol.
    pub fn declare_parameter(&mut self, name: impl Into<String>) -> IrResult<ParameterExpression> {
        let name = name.into();
        if self.parameters.contains(&name) {
            return Err(IrError::DuplicateParameter(name));
        }
        self.parameters.push(name.clone());
        Ok(ParameterExpression::Symbol(name))
    }

    /// Declare the output register with `size` bits, returning their ids.
    pub fn add_creg(&mut self, size: u32) -> Vec<ClbitId> {
        let start = self.num_clbits;
        self.num_clbits += size;
        (start..self.num_clbits).map(ClbitId).collect()
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply RX gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rx(theta.into()),
            qubit,
        ))
    }

    /// Apply RZ gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CZ, q1, q2))
    }

    /// Apply controlled phase gate.
    pub fn cphase(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(
            StandardGate::CPhase(theta.into()),
            q1,
            q2,
        ))
    }

    /// Apply RZZ gate.
    pub fn rzz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(
            StandardGate::Rzz(theta.into()),
            q1,
            q2,
        ))
    }

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Reset every site on the device.
    pub fn reset_all(&mut self) -> IrResult<&mut Self> {
        self.apply(Instruction::reset_all())
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        for (i, qubit) in instruction.qubits.iter().enumerate() {
            if !self.qubits.contains(qubit) {
                return Err(IrError::QubitNotFound {
                    qubit: *qubit,
                    gate_name,
                });
            }
            if instruction.qubits[..i].contains(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit: *qubit,
                    gate_name,
                });
            }
        }

        for clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound { clbit: *clbit });
            }
        }

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let got = instruction.qubits.len() as u32;
            if got != gate.num_qubits() {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: gate.num_qubits(),
                    got,
                });
            }
            for param in gate.parameters() {
                if let Some(undeclared) = param
                    .symbols()
                    .into_iter()
                    .find(|s| !self.parameters.contains(s))
                {
                    return Err(IrError::UnboundParameter(undeclared));
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared sites, in declaration order.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the number of declared sites.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Size of the output register.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Declared free parameters, in declaration order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Symbols actually referenced by gate parameters.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.instructions
            .iter()
            .filter_map(Instruction::as_gate)
            .flat_map(|g| g.parameters().into_iter().flat_map(|p| p.symbols()))
            .collect()
    }

    /// Count two-qubit gates.
    pub fn two_qubit_gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(Instruction::as_gate)
            .filter(|g| g.num_qubits() == 2)
            .count()
    }
}
