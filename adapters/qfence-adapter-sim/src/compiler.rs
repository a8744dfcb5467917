//! Reference native compiler.
//!
//! Lowers the portable gate set onto `RX(±π/2)`, `RZ(θ)` and a single
//! two-qubit entangler, either `CZ` or `CPHASE`, depending on the operator
//! the catalog was restricted to.
//!
//! ```text
//!   H        →  RZ(π/2) RX(π/2) RZ(π/2)
//!   X        →  RX(π/2) RX(π/2)
//!   RX(θ)    →  RZ(π/2) RX(π/2) RZ(θ) RX(-π/2) RZ(-π/2)
//!   RZZ(θ)   →  H(b) CZ(a,b) RX(θ)(b) CZ(a,b) H(b)        with CZ
//!            →  RZ(θ)(a) RZ(θ)(b) CPHASE(-2θ)(a,b)        with CPHASE
//!   CPHASE(φ) → RZ(φ/2)(a) RZ(φ/2)(b) RZZ(-φ/2)(a,b)      with CZ
//! ```
//!
//! Every identity holds up to a global phase.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, instrument};

use qfence_hal::{HalError, HalResult, NativeCompiler, NativeProgram};
use qfence_ir::{
    Circuit, Gate, Instruction, InstructionKind, ParameterExpression, QubitId, QubitPair,
    StandardGate,
};
use qfence_isa::RestrictedCatalog;

/// Two-qubit entangler the compiler targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entangler {
    Cz,
    CPhase,
}

impl Entangler {
    fn from_operator(operator: &str) -> HalResult<Self> {
        match operator {
            "CZ" => Ok(Entangler::Cz),
            "CPHASE" => Ok(Entangler::CPhase),
            other => Err(HalError::Compilation(format!(
                "no lowering onto two-qubit operator {other}"
            ))),
        }
    }
}

/// Compiler onto the `RX(±π/2)`/`RZ`/entangler basis.
#[derive(Debug, Clone, Default)]
pub struct BasisCompiler;

impl BasisCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl NativeCompiler for BasisCompiler {
    fn name(&self) -> &str {
        "basis"
    }

    #[instrument(skip_all, fields(circuit = %circuit.name(), operator = %catalog.operator()))]
    fn compile(&self, circuit: &Circuit, catalog: &RestrictedCatalog) -> HalResult<NativeProgram> {
        let mut lowering = Lowering {
            catalog,
            entangler: Entangler::from_operator(catalog.operator())?,
            out: Vec::with_capacity(circuit.instructions().len() * 4),
        };
        for inst in circuit.instructions() {
            lowering.lower(inst)?;
        }

        let mut program = NativeProgram::new(circuit.name());
        program.parameters = circuit.parameters().to_vec();
        program.ro_size = circuit.num_clbits();
        program.instructions = lowering.out;

        debug!(
            input = circuit.instructions().len(),
            output = program.instructions.len(),
            two_qubit = program.two_qubit_gate_count(),
            "lowered circuit"
        );
        Ok(program)
    }
}

struct Lowering<'a> {
    catalog: &'a RestrictedCatalog,
    entangler: Entangler,
    out: Vec<Instruction>,
}

impl Lowering<'_> {
    fn lower(&mut self, inst: &Instruction) -> HalResult<()> {
        let gate = match &inst.kind {
            InstructionKind::Gate(gate) => gate,
            InstructionKind::Measure | InstructionKind::Reset => {
                self.out.push(inst.clone());
                return Ok(());
            }
        };

        match gate {
            Gate::Standard(standard) => match (standard, inst.qubits.as_slice()) {
                (StandardGate::H, &[q]) => self.h(q),
                (StandardGate::X, &[q]) => {
                    self.rx90(q, 1.0);
                    self.rx90(q, 1.0);
                }
                (StandardGate::Rx(theta), &[q]) => self.rx(theta, q),
                (StandardGate::Rz(theta), &[q]) => self.rz(theta.clone(), q),
                (StandardGate::CZ, &[a, b]) => {
                    self.check_pair(a, b)?;
                    match self.entangler {
                        Entangler::Cz => self.cz(a, b),
                        Entangler::CPhase => self.cphase(PI.into(), a, b),
                    }
                }
                (StandardGate::CPhase(phi), &[a, b]) => {
                    self.check_pair(a, b)?;
                    match self.entangler {
                        Entangler::CPhase => self.cphase(phi.clone(), a, b),
                        Entangler::Cz => {
                            self.rz(phi.scaled(0.5), a);
                            self.rz(phi.scaled(0.5), b);
                            self.rzz_via_cz(&phi.scaled(-0.5), a, b);
                        }
                    }
                }
                (StandardGate::Rzz(theta), &[a, b]) => {
                    self.check_pair(a, b)?;
                    match self.entangler {
                        Entangler::Cz => self.rzz_via_cz(theta, a, b),
                        Entangler::CPhase => {
                            self.rz(theta.clone(), a);
                            self.rz(theta.clone(), b);
                            self.cphase(theta.scaled(-2.0), a, b);
                        }
                    }
                }
                (standard, qubits) => {
                    return Err(HalError::Compilation(format!(
                        "{} applied to {} sites",
                        standard.name(),
                        qubits.len()
                    )));
                }
            },
            Gate::Custom(custom) => {
                if custom.name != self.catalog.operator() || inst.qubits.len() != 2 {
                    return Err(HalError::Compilation(format!(
                        "no lowering for custom gate {}",
                        custom.name
                    )));
                }
                self.check_pair(inst.qubits[0], inst.qubits[1])?;
                self.out.push(inst.clone());
            }
        }
        Ok(())
    }

    fn check_pair(&self, a: QubitId, b: QubitId) -> HalResult<()> {
        let pair = QubitPair::new(a, b)?;
        if self.catalog.supports(&pair) {
            Ok(())
        } else {
            Err(HalError::Compilation(format!(
                "pair {} does not offer {}",
                pair.key(),
                self.catalog.operator()
            )))
        }
    }

    fn push1(&mut self, gate: StandardGate, q: QubitId) {
        self.out.push(Instruction::single_qubit_gate(gate, q));
    }

    fn rz(&mut self, theta: ParameterExpression, q: QubitId) {
        self.push1(StandardGate::Rz(theta), q);
    }

    fn rx90(&mut self, q: QubitId, sign: f64) {
        self.push1(StandardGate::Rx((sign * FRAC_PI_2).into()), q);
    }

    fn h(&mut self, q: QubitId) {
        self.rz(FRAC_PI_2.into(), q);
        self.rx90(q, 1.0);
        self.rz(FRAC_PI_2.into(), q);
    }

    fn rx(&mut self, theta: &ParameterExpression, q: QubitId) {
        if let Some(v) = theta.as_f64() {
            if (v.abs() - FRAC_PI_2).abs() < 1e-12 {
                self.rx90(q, v.signum());
                return;
            }
        }
        self.rz(FRAC_PI_2.into(), q);
        self.rx90(q, 1.0);
        self.rz(theta.clone(), q);
        self.rx90(q, -1.0);
        self.rz((-FRAC_PI_2).into(), q);
    }

    fn cz(&mut self, a: QubitId, b: QubitId) {
        self.out
            .push(Instruction::two_qubit_gate(StandardGate::CZ, a, b));
    }

    fn cphase(&mut self, phi: ParameterExpression, a: QubitId, b: QubitId) {
        self.out
            .push(Instruction::two_qubit_gate(StandardGate::CPhase(phi), a, b));
    }

    fn rzz_via_cz(&mut self, theta: &ParameterExpression, a: QubitId, b: QubitId) {
        self.h(b);
        self.cz(a, b);
        self.rx(theta, b);
        self.cz(a, b);
        self.h(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfence_isa::OperationCatalog;

    fn pair(a: u32, b: u32) -> QubitPair {
        QubitPair::new(a, b).unwrap()
    }

    fn catalog(operator: &str) -> RestrictedCatalog {
        OperationCatalog::new()
            .with_pair(pair(0, 1), ["CZ", "CPHASE"])
            .with_pair(pair(1, 2), ["XY"])
            .restrict(operator)
            .unwrap()
    }

    fn circuit_with(apply: impl FnOnce(&mut Circuit, &[QubitId])) -> Circuit {
        let mut c = Circuit::new("c");
        let qs: Vec<_> = (0..3).map(|q| c.add_qubit(q).unwrap()).collect();
        c.add_creg(3);
        apply(&mut c, &qs);
        c
    }

    #[test]
    fn test_rzz_lowers_to_two_cz() {
        let mut c = Circuit::new("c");
        let q0 = c.add_qubit(0u32).unwrap();
        let q1 = c.add_qubit(1u32).unwrap();
        let gamma = c.declare_parameter("gamma").unwrap();
        c.rzz(gamma.scaled(0.5), q0, q1).unwrap();

        let program = BasisCompiler::new().compile(&c, &catalog("CZ")).unwrap();
        assert_eq!(program.two_qubit_gate_count(), 2);
        assert_eq!(program.parameters, ["gamma"]);
        assert!(
            program
                .instructions
                .iter()
                .filter_map(Instruction::as_gate)
                .all(|g| matches!(g.name(), "RX" | "RZ" | "CZ"))
        );
    }

    #[test]
    fn test_rzz_with_cphase_entangler() {
        let c = circuit_with(|c, q| {
            c.rzz(0.3, q[0], q[1]).unwrap();
        });
        let program = BasisCompiler::new().compile(&c, &catalog("CPHASE")).unwrap();
        let names: Vec<_> = program.instructions.iter().map(Instruction::name).collect();
        assert_eq!(names, ["RZ", "RZ", "CPHASE"]);
    }

    #[test]
    fn test_unsupported_pair_is_rejected() {
        let c = circuit_with(|c, q| {
            c.cz(q[1], q[2]).unwrap();
        });
        let err = BasisCompiler::new().compile(&c, &catalog("CZ")).unwrap_err();
        assert!(matches!(err, HalError::Compilation(msg) if msg.contains("1-2")));
    }

    #[test]
    fn test_unknown_entangler() {
        let c = circuit_with(|_, _| {});
        assert!(BasisCompiler::new().compile(&c, &catalog("XY")).is_err());
    }

    #[test]
    fn test_measure_and_reset_pass_through() {
        let c = circuit_with(|c, q| {
            c.reset_all().unwrap();
            c.x(q[0]).unwrap();
            c.measure(q[0], qfence_ir::ClbitId(2)).unwrap();
        });
        let program = BasisCompiler::new().compile(&c, &catalog("CZ")).unwrap();
        let names: Vec<_> = program.instructions.iter().map(Instruction::name).collect();
        assert_eq!(names, ["RESET", "RX", "RX", "MEASURE"]);
        assert_eq!(program.ro_size, 3);
    }
}
