use super::{read_lines, IntegrationHarness};
use anyhow::Result;
use jamtree::documents::read_manifest;
use jamtree::provisioning::EventType;
use jamtree::{CapacityPolicy, DeviceType, ErrorKind, ExistingTreePolicy, Provisioner};
use std::fs;

#[test]
fn repeated_append_runs_never_duplicate_header() -> Result<()> {
    let harness = IntegrationHarness::new();
    for name in ["one.wav", "two.wav", "three.wav"] {
        harness.add_source(name, name.as_bytes());
    }
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.existing_tree = Some(ExistingTreePolicy::Append);

    Provisioner::new(request.clone()).run()?;
    let summary = Provisioner::new(request).run()?;

    let lines = read_lines(&summary.manifest_path);
    assert_eq!(lines.len(), 2 * 3 + 1);
    assert_eq!(lines.iter().filter(|l| l.starts_with("songName,")).count(), 1);

    let rows = read_manifest(&summary.manifest_path)?;
    let slots: Vec<&str> = rows.iter().map(|r| r.slot_dir_name.as_str()).collect();
    assert_eq!(
        slots,
        vec!["Patch01", "Patch02", "Patch03", "Patch01", "Patch02", "Patch03"]
    );
    Ok(())
}

#[test]
fn descriptors_identical_across_runs() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("pad.wav", b"pad");
    let mut request = harness.request(DeviceType::JamManStereo);
    request.existing_tree = Some(ExistingTreePolicy::Append);

    let first = Provisioner::new(request.clone()).run()?;
    let patch = fs::read(first.root.join("Patch01/patch.xml"))?;
    let phrase = fs::read(first.root.join("Patch01/PhraseA/phrase.xml"))?;
    let second = Provisioner::new(request).run()?;
    assert_eq!(fs::read(second.root.join("Patch01/patch.xml"))?, patch);
    assert_eq!(fs::read(second.root.join("Patch01/PhraseA/phrase.xml"))?, phrase);
    assert_eq!(second.tree.created_slots, 0);
    Ok(())
}

#[test]
fn manifest_survives_overwrite() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("a.wav", b"a");
    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.existing_tree = Some(ExistingTreePolicy::Overwrite);

    Provisioner::new(request.clone()).run()?;
    let summary = Provisioner::new(request).run()?;
    assert_eq!(read_lines(&summary.manifest_path).len(), 3);
    Ok(())
}

#[test]
fn source_paths_recorded_absolute() -> Result<()> {
    let harness = IntegrationHarness::new();
    let source = harness.add_source("kick.wav", b"kick");
    let summary = Provisioner::new(harness.request(DeviceType::JamManStereo)).run()?;
    let rows = read_manifest(&summary.manifest_path)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        fs::canonicalize(&rows[0].source_path)?,
        fs::canonicalize(source)?
    );
    assert!(std::path::Path::new(&rows[0].source_path).is_absolute());
    Ok(())
}

#[test]
fn failure_midway_keeps_finished_slots_and_their_rows() -> Result<()> {
    let harness = IntegrationHarness::new();
    for name in ["a.wav", "b.wav", "c.wav"] {
        harness.add_source(name, name.as_bytes());
    }
    let root = harness.card_root().join("JamManStereo");
    // A directory where slot 2's file should land makes its copy fail.
    fs::create_dir_all(root.join("Patch02/PhraseA/b.wav"))?;

    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.existing_tree = Some(ExistingTreePolicy::Append);
    let provisioner = Provisioner::new(request.clone());
    let err = provisioner.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert_eq!(err.slot(), Some(2));

    let manifest = request.manifest_path();
    assert_eq!(read_lines(&manifest).len(), 2);
    let rows = read_manifest(&manifest)?;
    assert_eq!(rows[0].slot_dir_name, "Patch01");
    assert!(root.join("Patch01/PhraseA/a.wav").exists());
    assert!(root.join("Patch01/patch.xml").exists());
    assert!(root.join("Patch01/PhraseA/phrase.xml").exists());
    assert!(!root.join("Patch02/patch.xml").exists());
    assert!(!root.join("Patch03/PhraseA/c.wav").exists());

    let events = provisioner.events().list()?;
    let last = events.last().expect("run events recorded");
    assert_eq!(last.event_type, EventType::RunFailed);
    assert_eq!(last.details["slot"], 2);
    assert_eq!(last.details["kind"], "IoFailure");
    Ok(())
}
