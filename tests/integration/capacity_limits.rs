use super::IntegrationHarness;
use jamtree::{CapacityPolicy, DeviceType, ErrorKind, ProvisionError, Provisioner};

#[test]
fn overflow_fails_without_creating_slots() {
    let harness = IntegrationHarness::new();
    for name in ["a.wav", "b.wav", "c.wav"] {
        harness.add_source(name, name.as_bytes());
    }
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::Fixed(2));

    let err = Provisioner::new(request).run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert!(matches!(
        err,
        ProvisionError::CapacityExceeded {
            eligible: 3,
            capacity: 2
        }
    ));
    let root = harness.card_root().join("JamManStereo");
    assert!(!root.join("Patch03").exists());
    assert!(!root.exists());
}

#[test]
fn exact_fit_succeeds() {
    let harness = IntegrationHarness::new();
    harness.add_source("a.wav", b"a");
    harness.add_source("b.wav", b"b");
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::Fixed(2));
    let summary = Provisioner::new(request).run().expect("run should fit");
    assert_eq!(summary.bindings.len(), 2);
    assert!(!summary.root.join("Patch03").exists());
}

#[test]
fn empty_source_demand_sized_creates_root_only() {
    let harness = IntegrationHarness::new();
    harness.add_source("notes.txt", b"not audio");
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    let summary = Provisioner::new(request).run().expect("empty run");
    assert!(summary.bindings.is_empty());
    assert!(summary.root.is_dir());
    assert_eq!(std::fs::read_dir(&summary.root).unwrap().count(), 0);
}
