use super::IntegrationHarness;
use anyhow::Result;
use jamtree::documents::{verify_card, VerifyOptions};
use jamtree::{CapacityPolicy, DeviceType, ExistingTreePolicy, NamingPolicy, Provisioner};
use std::fs;

fn options(canonical_name: &str) -> VerifyOptions {
    VerifyOptions {
        canonical_name: canonical_name.into(),
        check_hashes: true,
    }
}

#[test]
fn custom_canonical_name_verifies() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("kick.wav", b"kick");
    harness.add_source("snare.wav", b"snare");
    let mut request = harness.request(DeviceType::JamManSoloXT);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.naming = NamingPolicy::Canonicalize;
    request.canonical_name = "take.wav".into();
    Provisioner::new(request).run()?;

    let report = verify_card(&harness.card_root(), DeviceType::JamManSoloXT, &options("take.wav"))?;
    assert!(report.is_clean(), "{:?}", report.failures);
    assert_eq!(report.slots_checked, 2);

    let wrong = verify_card(&harness.card_root(), DeviceType::JamManSoloXT, &options("phrase.wav"))?;
    assert_eq!(wrong.failures.len(), 2);
    Ok(())
}

#[test]
fn hashes_follow_the_latest_run_per_slot() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("first.wav", b"first take");
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.naming = NamingPolicy::Canonicalize;
    request.existing_tree = Some(ExistingTreePolicy::Append);
    Provisioner::new(request.clone()).run()?;

    fs::remove_file(harness.source_dir().join("first.wav"))?;
    harness.add_source("second.wav", b"second take");
    Provisioner::new(request).run()?;

    let report = verify_card(&harness.card_root(), DeviceType::JamManStereo, &options("phrase.wav"))?;
    assert_eq!(report.rows, 2);
    assert_eq!(report.slots_checked, 1);
    assert!(report.is_clean(), "{:?}", report.failures);
    Ok(())
}

#[test]
fn tampered_file_is_reported() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("pad.wav", b"pad");
    let summary = Provisioner::new(harness.request(DeviceType::JamManStereo)).run()?;
    fs::write(summary.root.join("Patch01/PhraseA/pad.wav"), b"changed")?;

    let report = verify_card(&harness.card_root(), DeviceType::JamManStereo, &options("phrase.wav"))?;
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].starts_with("[mismatch]"));
    Ok(())
}
