//! Global and local fencing end to end on the reference collaborators.

use qfence_adapter_sim::{BasisCompiler, SimulatorBackend, TextAssembler};
use qfence_hal::{DeviceSnapshot, HalError};
use qfence_ir::{QubitId, QubitPair};
use qfence_isa::{Fence, parse_calibrations};
use qfence_landscape::{
    Experiment, FencingPolicy, LandscapeError, ParameterGrid, SweepDriver, WeightedGraph,
    build_circuit, prepare_executable,
};
use serde_json::json;

const CALIBRATIONS: &str = r#"
DEFCAL RX(%theta) 31:
    FENCE 31
    NONBLOCKING PULSE 31 "rf" drag(alpha: %theta)
    FENCE 31
DEFCAL CZ 31 32:
    FENCE
    NONBLOCKING PULSE 31 32 "cz" flat(duration: 1.6e-7, iq: 1.0)
    SHIFT-PHASE 31 "rf" 0.25
    FENCE
DEFCAL CZ 32 40:
    FENCE
    NONBLOCKING PULSE 32 40 "cz" flat(duration: 1.8e-7, iq: 1.0)
    FENCE
DEFCAL CPHASE(%theta) 31 32:
    FENCE
    NONBLOCKING PULSE 31 32 "cphase" flat(duration: 2e-7, iq: %theta)
    FENCE
"#;

fn snapshot() -> DeviceSnapshot {
    let isa = json!({
        "1Q": {
            "31": {"gates": [{"operator": "RX"}, {"operator": "RZ"}]},
            "32": {"gates": [{"operator": "RX"}, {"operator": "RZ"}]},
            "40": {"gates": [{"operator": "RX"}, {"operator": "RZ"}]},
            "41": {"gates": [{"operator": "RX"}], "dead": true}
        },
        "2Q": {
            "31-32": {"gates": [{"operator": "CZ"}, {"operator": "CPHASE"}]},
            "32-40": {"gates": [{"operator": "CZ"}]},
            "40-41": {"gates": [{"operator": "CZ"}], "dead": true}
        }
    });
    DeviceSnapshot::from_raw("chip", &isa, CALIBRATIONS).unwrap()
}

fn graph() -> WeightedGraph {
    WeightedGraph::build(
        [
            QubitPair::new(31u32, 32u32).unwrap(),
            QubitPair::new(32u32, 40u32).unwrap(),
        ],
        42,
    )
    .unwrap()
}

#[test]
fn test_global_policy_adds_no_overrides() {
    let snapshot = snapshot();
    let circuit = build_circuit(&graph()).unwrap();
    let exe = prepare_executable(
        &circuit,
        &snapshot,
        &BasisCompiler::new(),
        &TextAssembler::new(),
        "CZ",
        FencingPolicy::Global,
    )
    .unwrap();

    assert!(exe.program().calibrations.is_empty());
    assert!(!exe.text().contains("DEFCAL"));
    assert_eq!(exe.program().parameters, ["beta", "gamma"]);
    assert_eq!(exe.program().ro_size, 3);
    assert_eq!(exe.program().two_qubit_gate_count(), 4);
}

#[test]
fn test_local_policy_scopes_fences_to_operands() {
    let snapshot = snapshot();
    let circuit = build_circuit(&graph()).unwrap();
    let exe = prepare_executable(
        &circuit,
        &snapshot,
        &BasisCompiler::new(),
        &TextAssembler::new(),
        "CZ",
        FencingPolicy::Local,
    )
    .unwrap();

    let overrides = &exe.program().calibrations;
    assert_eq!(overrides.len(), 2);
    for definition in overrides.iter() {
        assert_eq!(definition.name, "CZ");
        for fence in definition.body.iter().filter_map(|i| i.as_fence()) {
            assert_eq!(fence, &Fence::Scoped(definition.operands.clone()));
        }
    }

    let cz = overrides.get("CZ", &[QubitId(31), QubitId(32)]).unwrap();
    let original = snapshot
        .calibrations()
        .get("CZ", &[QubitId(31), QubitId(32)])
        .unwrap();
    assert_eq!(cz.body.len(), original.body.len());
    assert_eq!(cz.body[1], original.body[1]);
    assert_eq!(cz.body[2], original.body[2]);

    assert!(exe.text().contains("DEFCAL CZ 31 32:"));
    assert!(exe.text().contains("    FENCE 31 32\n"));
    assert!(exe.text().contains("    FENCE 32 40\n"));

    // The printed fragment reads back as the same overrides.
    let text = exe.text();
    let fragment = &text[text.find("DEFCAL").unwrap()..text.find("RESET").unwrap()];
    let reparsed = parse_calibrations(fragment).unwrap();
    assert_eq!(&reparsed, overrides);

    // The device snapshot is untouched.
    assert_eq!(original.global_fence_count(), 2);
}

#[test]
fn test_operator_without_pairs_fails_compilation() {
    let snapshot = snapshot();
    let circuit = build_circuit(&graph()).unwrap();
    let err = prepare_executable(
        &circuit,
        &snapshot,
        &BasisCompiler::new(),
        &TextAssembler::new(),
        "CPHASE",
        FencingPolicy::Local,
    )
    .unwrap_err();
    assert!(matches!(err, LandscapeError::Hal(HalError::Compilation(_))));
}

#[tokio::test]
async fn test_policies_agree_on_an_untimed_simulator() {
    let snapshot = snapshot();
    let compiler = BasisCompiler::new();
    let assembler = TextAssembler::new();
    let experiment = Experiment {
        snapshot: &snapshot,
        compiler: &compiler,
        assembler: &assembler,
        operator: "CZ",
    };
    let driver = SweepDriver::new(SimulatorBackend::new().with_seed(5))
        .with_shots(1000)
        .with_concurrency(4);
    let grid = ParameterGrid::new(3).unwrap();

    let comparison = experiment
        .compare_policies(&driver, &graph(), &grid)
        .await
        .unwrap();

    assert_eq!(comparison.global, comparison.local);
    let diff = comparison.global.difference(&comparison.local).unwrap();
    assert!(diff.iter().all(|d| *d == 0.0));

    // β = 0 leaves the uniform superposition untouched by the mixer and the
    // interaction layer is diagonal, so every outcome is equally likely and
    // the expected score is zero.
    let origin = comparison.get(FencingPolicy::Global).get(0, 0).unwrap();
    assert!(origin.abs() < 0.25, "origin score {origin}");
}
