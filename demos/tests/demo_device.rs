use qfence_demos::{demo_calibration_program, demo_device};
use qfence_ir::{QubitId, QubitPair};
use qfence_isa::Fence;

fn pairs() -> Vec<QubitPair> {
    vec![
        QubitPair::new(0u32, 1u32).unwrap(),
        QubitPair::new(1u32, 2u32).unwrap(),
    ]
}

#[test]
fn test_demo_device_offers_both_operators() {
    let device = demo_device(&pairs()).unwrap();
    assert_eq!(device.catalog().restrict("CZ").unwrap().num_pairs(), 2);
    assert_eq!(device.catalog().restrict("CPHASE").unwrap().num_pairs(), 2);
    assert_eq!(device.calibrations().len(), 3 + 2 * 2);
}

#[test]
fn test_demo_calibrations_fence_globally() {
    let text = demo_calibration_program(&pairs());
    assert!(text.contains("DEFCAL CZ 0 1:\n    FENCE\n"));

    let device = demo_device(&pairs()).unwrap();
    let cz = device
        .calibrations()
        .get("CZ", &[QubitId(1), QubitId(2)])
        .unwrap();
    assert_eq!(cz.global_fence_count(), 2);

    let fragment = device.calibrations().rewrite("CZ").unwrap();
    assert_eq!(fragment.len(), 2);
    let scoped = fragment.get("CZ", &[QubitId(1), QubitId(2)]).unwrap();
    assert_eq!(scoped.global_fence_count(), 0);
    assert_eq!(
        scoped.body[0].as_fence(),
        Some(&Fence::Scoped(vec![QubitId(1), QubitId(2)]))
    );
}
