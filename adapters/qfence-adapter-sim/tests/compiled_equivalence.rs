//! A compiled program must sample the same distribution as the portable
//! circuit it came from.

use qfence_adapter_sim::{BasisCompiler, SimulatorBackend, TextAssembler};
use qfence_hal::{Backend, Executable, ExecutableBuilder, NativeCompiler, NativeProgram};
use qfence_ir::{Circuit, ParameterBindings, QubitPair};
use qfence_isa::OperationCatalog;
use rustc_hash::FxHashMap;

fn circuit() -> Circuit {
    let mut c = Circuit::new("mixer");
    let sites: Vec<_> = [31u32, 32, 40]
        .into_iter()
        .map(|q| c.add_qubit(q).unwrap())
        .collect();
    let ro = c.add_creg(3);
    let beta = c.declare_parameter("beta").unwrap();
    let gamma = c.declare_parameter("gamma").unwrap();

    c.reset_all().unwrap();
    for &q in &sites {
        c.h(q).unwrap();
    }
    c.rzz(gamma.scaled(0.8), sites[0], sites[1]).unwrap();
    c.rzz(gamma.scaled(-0.3), sites[1], sites[2]).unwrap();
    c.cphase(0.6, sites[0], sites[1]).unwrap();
    c.x(sites[2]).unwrap();
    for &q in &sites {
        c.rx(beta.scaled(2.0), q).unwrap();
    }
    for (q, r) in sites.iter().zip(ro) {
        c.measure(*q, r).unwrap();
    }
    c
}

fn raw_executable(c: &Circuit) -> Executable {
    let mut program = NativeProgram::new(c.name());
    program.parameters = c.parameters().to_vec();
    program.ro_size = c.num_clbits();
    program.instructions = c.instructions().to_vec();
    Executable::new(program, "")
}

fn bindings() -> ParameterBindings {
    let mut b = ParameterBindings::default();
    b.insert("beta".into(), 0.37);
    b.insert("gamma".into(), 1.21);
    b
}

fn assert_close(a: &FxHashMap<String, f64>, b: &FxHashMap<String, f64>) {
    let keys: std::collections::BTreeSet<_> = a.keys().chain(b.keys()).collect();
    for key in keys {
        let (x, y) = (
            a.get(key).copied().unwrap_or(0.0),
            b.get(key).copied().unwrap_or(0.0),
        );
        assert!((x - y).abs() < 1e-9, "{key}: {x} vs {y}");
    }
}

fn check_entangler(operator: &str) {
    let catalog = OperationCatalog::new()
        .with_pair(QubitPair::new(31u32, 32u32).unwrap(), ["CZ", "CPHASE"])
        .with_pair(QubitPair::new(32u32, 40u32).unwrap(), ["CZ", "CPHASE"])
        .restrict(operator)
        .unwrap();

    let c = circuit();
    let program = BasisCompiler::new().compile(&c, &catalog).unwrap();
    assert!(
        program
            .instructions
            .iter()
            .filter_map(|i| i.as_gate())
            .all(|g| matches!(g.name(), "RX" | "RZ") || g.name() == operator)
    );
    let compiled = TextAssembler::new().assemble(program).unwrap();

    let sim = SimulatorBackend::new();
    let expected = sim.readout_probabilities(&raw_executable(&c), &bindings()).unwrap();
    let got = sim.readout_probabilities(&compiled, &bindings()).unwrap();
    assert_close(&expected, &got);
}

#[test]
fn test_cz_lowering_preserves_distribution() {
    check_entangler("CZ");
}

#[test]
fn test_cphase_lowering_preserves_distribution() {
    check_entangler("CPHASE");
}

#[tokio::test]
async fn test_sampled_frequencies_track_probabilities() {
    let c = circuit();
    let exe = raw_executable(&c);
    let sim = SimulatorBackend::new().with_seed(11);
    let probs = sim.readout_probabilities(&exe, &bindings()).unwrap();

    let shots = 20_000;
    let batch = sim.run(&exe, &bindings(), shots).await.unwrap();
    for (key, count) in batch.counts() {
        let freq = count as f64 / f64::from(shots);
        let p = probs.get(&key).copied().unwrap_or(0.0);
        assert!((freq - p).abs() < 0.02, "{key}: {freq} vs {p}");
    }
}
