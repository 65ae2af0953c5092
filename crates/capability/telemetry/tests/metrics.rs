use dab_telemetry::{metrics, new_cycle_id, record_build_failure, record_unknown_unit};

#[test]
fn cycle_ids_are_unique() {
    let first = new_cycle_id();
    let second = new_cycle_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn counters_only_increase() {
    let before = metrics().snapshot();
    record_unknown_unit();
    record_build_failure();
    let after = metrics().snapshot();
    assert!(after.unknown_units >= before.unknown_units + 1);
    assert!(after.build_failures >= before.build_failures + 1);
}
