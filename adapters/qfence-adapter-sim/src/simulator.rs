//! Simulator backend implementation.

use std::hash::{Hash, Hasher};
use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHasher};
use tracing::{debug, instrument};

use qfence_hal::{Backend, Executable, HalError, HalResult, NativeProgram, ShotBatch};
use qfence_ir::{Gate, InstructionKind, ParameterBindings, QubitId, StandardGate};

use crate::statevector::{Sampler, Statevector};

/// Local statevector backend.
///
/// Pulse-level detail is not modelled: calibration overrides and fences
/// carried by the executable are accepted and ignored. Each request draws
/// from its own generator, seeded from the backend seed and the bound
/// parameter values, so results do not depend on how many requests are in
/// flight or in which order they finish.
#[derive(Debug, Clone)]
pub struct SimulatorBackend {
    name: String,
    max_qubits: usize,
    max_concurrent: usize,
    seed: u64,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self {
            name: "simulator".into(),
            max_qubits: 20,
            max_concurrent: 8,
            seed: 0,
        }
    }

    /// Set the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the largest number of distinct sites a program may touch.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the number of requests accepted at once.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    fn request_seed(&self, bindings: &ParameterBindings) -> u64 {
        let mut entries: Vec<_> = bindings.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        for (name, value) in entries {
            name.hash(&mut hasher);
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Apply every gate of `program`, returning the final state and the
    /// `(local qubit, ro index)` readout map.
    fn evolve(
        &self,
        program: &NativeProgram,
        bindings: &ParameterBindings,
    ) -> HalResult<(Statevector, Vec<(usize, usize)>)> {
        // Dense indices in first-use order.
        let mut index: FxHashMap<QubitId, usize> = FxHashMap::default();
        for inst in &program.instructions {
            for q in &inst.qubits {
                let next = index.len();
                index.entry(*q).or_insert(next);
            }
        }
        if index.len() > self.max_qubits {
            return Err(HalError::Unsupported(format!(
                "program touches {} sites but the simulator supports {}",
                index.len(),
                self.max_qubits
            )));
        }

        let mut sv = Statevector::new(index.len());
        let mut readout: Vec<(usize, usize)> = vec![];

        for inst in &program.instructions {
            let local: Vec<usize> = inst.qubits.iter().map(|q| index[q]).collect();
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    if readout.iter().any(|(q, _)| local.contains(q)) {
                        return Err(HalError::Unsupported(format!(
                            "{} after measurement",
                            gate.name()
                        )));
                    }
                    apply_gate(&mut sv, gate, &local, bindings)?;
                }
                InstructionKind::Reset => {
                    if !local.is_empty() {
                        return Err(HalError::Unsupported("per-site reset".into()));
                    }
                    sv.reset_all();
                    readout.clear();
                }
                InstructionKind::Measure => {
                    for (q, c) in local.iter().zip(&inst.clbits) {
                        let c = c.0 as usize;
                        if c >= program.ro_size {
                            return Err(HalError::MalformedResult(format!(
                                "measurement into ro[{c}] outside BIT[{}]",
                                program.ro_size
                            )));
                        }
                        readout.push((*q, c));
                    }
                }
            }
        }
        Ok((sv, readout))
    }

    /// Exact distribution over output bitstrings, `ro[0]` first.
    pub fn readout_probabilities(
        &self,
        executable: &Executable,
        bindings: &ParameterBindings,
    ) -> HalResult<FxHashMap<String, f64>> {
        let program = executable.program();
        let (sv, readout) = self.evolve(program, bindings)?;

        let mut dist: FxHashMap<String, f64> = FxHashMap::default();
        for (outcome, p) in sv.probabilities().into_iter().enumerate() {
            if p < 1e-15 {
                continue;
            }
            let row = readout_row(outcome, &readout, program.ro_size);
            let key: String = row.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect();
            *dist.entry(key).or_insert(0.0) += p;
        }
        Ok(dist)
    }

    /// Evolve the program's state and sample `shots` output rows.
    #[instrument(skip(self, executable, bindings), fields(program = %executable.program().name))]
    fn simulate(
        &self,
        executable: &Executable,
        bindings: &ParameterBindings,
        shots: u32,
    ) -> HalResult<ShotBatch> {
        let start = Instant::now();
        let program = executable.program();
        let (sv, readout) = self.evolve(program, bindings)?;

        let sampler = Sampler::new(&sv);
        let mut rng = StdRng::seed_from_u64(self.request_seed(bindings));
        let rows = (0..shots)
            .map(|_| readout_row(sampler.sample(&mut rng), &readout, program.ro_size))
            .collect();

        debug!(
            sites = sv.num_qubits(),
            shots,
            elapsed = ?start.elapsed(),
            "simulation completed"
        );
        ShotBatch::new(program.ro_size, rows)
    }
}

fn readout_row(outcome: usize, readout: &[(usize, usize)], ro_size: usize) -> Vec<u8> {
    let mut row = vec![0u8; ro_size];
    for &(q, c) in readout {
        row[c] = ((outcome >> q) & 1) as u8;
    }
    row
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_gate(
    sv: &mut Statevector,
    gate: &Gate,
    qubits: &[usize],
    bindings: &ParameterBindings,
) -> HalResult<()> {
    let Gate::Standard(gate) = gate else {
        return Err(HalError::Unsupported(format!(
            "custom gate {}",
            gate.name()
        )));
    };
    if qubits.len() != gate.num_qubits() as usize {
        return Err(HalError::Unsupported(format!(
            "{} applied to {} sites",
            gate.name(),
            qubits.len()
        )));
    }
    if qubits.len() == 2 && qubits[0] == qubits[1] {
        return Err(HalError::Unsupported(format!(
            "{} applied twice to one site",
            gate.name()
        )));
    }
    match gate {
        StandardGate::H => sv.apply_h(qubits[0]),
        StandardGate::X => sv.apply_x(qubits[0]),
        StandardGate::Rx(theta) => sv.apply_rx(qubits[0], theta.evaluate(bindings)?),
        StandardGate::Rz(theta) => sv.apply_rz(qubits[0], theta.evaluate(bindings)?),
        StandardGate::CZ => sv.apply_cz(qubits[0], qubits[1]),
        StandardGate::CPhase(theta) => {
            sv.apply_cphase(qubits[0], qubits[1], theta.evaluate(bindings)?);
        }
        StandardGate::Rzz(theta) => sv.apply_rzz(qubits[0], qubits[1], theta.evaluate(bindings)?),
    }
    Ok(())
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent
    }

    #[instrument(skip(self, executable, bindings))]
    async fn run(
        &self,
        executable: &Executable,
        bindings: &ParameterBindings,
        shots: u32,
    ) -> HalResult<ShotBatch> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        self.simulate(executable, bindings, shots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfence_ir::{ClbitId, Instruction, ParameterExpression};

    fn program(instructions: Vec<Instruction>, ro_size: usize) -> Executable {
        let mut program = NativeProgram::new("test");
        program.ro_size = ro_size;
        program.instructions = instructions;
        Executable::new(program, "")
    }

    #[tokio::test]
    async fn test_x_then_measure() {
        let exe = program(
            vec![
                Instruction::reset_all(),
                Instruction::single_qubit_gate(StandardGate::X, QubitId(31)),
                Instruction::measure(QubitId(31), ClbitId(1)),
                Instruction::measure(QubitId(32), ClbitId(0)),
            ],
            2,
        );
        let batch = SimulatorBackend::new()
            .run(&exe, &ParameterBindings::default(), 10)
            .await
            .unwrap();
        assert_eq!(batch.shots(), 10);
        assert!(batch.iter().all(|row| row == [0, 1]));
    }

    #[tokio::test]
    async fn test_bound_parameter() {
        let exe = program(
            vec![
                Instruction::single_qubit_gate(
                    StandardGate::Rx(ParameterExpression::symbol("beta").scaled(2.0)),
                    QubitId(0),
                ),
                Instruction::measure(QubitId(0), ClbitId(0)),
            ],
            1,
        );
        let mut bindings = ParameterBindings::default();
        bindings.insert("beta".into(), std::f64::consts::FRAC_PI_2);

        let batch = SimulatorBackend::new().run(&exe, &bindings, 20).await.unwrap();
        assert!(batch.iter().all(|row| row == [1]));
    }

    #[tokio::test]
    async fn test_unbound_parameter_is_an_error() {
        let exe = program(
            vec![Instruction::single_qubit_gate(
                StandardGate::Rz(ParameterExpression::symbol("gamma")),
                QubitId(0),
            )],
            0,
        );
        let err = SimulatorBackend::new()
            .run(&exe, &ParameterBindings::default(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Ir(_)));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let exe = program(
            vec![
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
                Instruction::single_qubit_gate(StandardGate::H, QubitId(1)),
                Instruction::measure(QubitId(0), ClbitId(0)),
                Instruction::measure(QubitId(1), ClbitId(1)),
            ],
            2,
        );
        let backend = SimulatorBackend::new().with_seed(42);
        let bindings = ParameterBindings::default();
        let a = backend.run(&exe, &bindings, 64).await.unwrap();
        let b = backend.run(&exe, &bindings, 64).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let exe = program(vec![], 0);
        let err = SimulatorBackend::new()
            .run(&exe, &ParameterBindings::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidShots(_)));
    }

    #[tokio::test]
    async fn test_gate_arity_mismatch_is_an_error() {
        let bindings = ParameterBindings::default();
        let backend = SimulatorBackend::new();

        let short = program(vec![Instruction::gate(StandardGate::CZ, [QubitId(0)])], 0);
        let err = backend.run(&short, &bindings, 1).await.unwrap_err();
        assert!(matches!(err, HalError::Unsupported(_)));

        let repeated = program(
            vec![Instruction::gate(StandardGate::CZ, [QubitId(0), QubitId(0)])],
            0,
        );
        let err = backend.run(&repeated, &bindings, 1).await.unwrap_err();
        assert!(matches!(err, HalError::Unsupported(_)));

        let wide = program(
            vec![Instruction::gate(StandardGate::H, [QubitId(0), QubitId(1)])],
            0,
        );
        let err = backend.run(&wide, &bindings, 1).await.unwrap_err();
        assert!(matches!(err, HalError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_too_many_sites() {
        let exe = program(
            (0..3)
                .map(|q| Instruction::single_qubit_gate(StandardGate::H, QubitId(q)))
                .collect(),
            0,
        );
        let err = SimulatorBackend::new()
            .with_max_qubits(2)
            .run(&exe, &ParameterBindings::default(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Unsupported(_)));
    }
}
