use super::{read_lines, IntegrationHarness};
use anyhow::Result;
use jamtree::documents::MANIFEST_HEADER;
use jamtree::provisioning::EventType;
use jamtree::{CapacityPolicy, DeviceType, NamingPolicy, Provisioner};
use std::fs;

#[test]
fn two_files_demand_sized_preserve() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("kick.wav", b"kick-bytes");
    harness.add_source("snare.wav", b"snare-bytes");
    harness.add_source("readme.txt", b"ignored");

    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    let summary = Provisioner::new(request).run()?;

    let root = harness.card_root().join("JamManStereo");
    assert_eq!(summary.root, root);
    assert_eq!(fs::read(root.join("Patch01/PhraseA/kick.wav"))?, b"kick-bytes");
    assert_eq!(fs::read(root.join("Patch02/PhraseA/snare.wav"))?, b"snare-bytes");
    assert!(!root.join("Patch03").exists());

    let patch1 = fs::read_to_string(root.join("Patch01/patch.xml"))?;
    assert!(patch1.contains("<ID>patch-1</ID>"));
    assert!(patch1.contains("<PatchName>kick.wav</PatchName>"));
    let phrase2 = fs::read_to_string(root.join("Patch02/PhraseA/phrase.xml"))?;
    assert!(phrase2.contains("<ID>phrase-2</ID>"));

    let lines = read_lines(&summary.manifest_path);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], MANIFEST_HEADER.join(","));
    assert!(lines[1].starts_with("kick.wav,4,124.9213180542,StopInstantly,StudioKickAndHighHat,Patch01,"));
    assert!(lines[2].contains(",Patch02,"));
    assert!(lines[2].ends_with("snare.wav"));
    Ok(())
}

#[test]
fn fixed_layout_precreates_every_slot() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("loop.wav", b"loop");

    let summary = Provisioner::new(harness.request(DeviceType::JamManSoloXT)).run()?;
    let root = harness.card_root().join("JamManSoloXT");
    assert_eq!(summary.tree.created_slots, 99);
    assert!(root.join("Patch99/PhraseA").is_dir());
    assert!(!root.join("Patch99/patch.xml").exists());
    let patch = fs::read_to_string(root.join("Patch01/patch.xml"))?;
    assert!(patch.contains("device=\"JamManSoloXT\""));
    Ok(())
}

#[test]
fn canonical_naming_places_fixed_file_name() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("Verse Idea.WAV", b"verse");

    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    request.naming = NamingPolicy::Canonicalize;
    let summary = Provisioner::new(request).run()?;

    let placed = summary.root.join("Patch01/PhraseA/phrase.wav");
    assert_eq!(fs::read(placed)?, b"verse");
    let patch = fs::read_to_string(summary.root.join("Patch01/patch.xml"))?;
    assert!(patch.contains("<PatchName>Verse Idea.WAV</PatchName>"));
    Ok(())
}

#[test]
fn dry_run_plan_touches_nothing() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("b.wav", b"b");
    harness.add_source("a.wav", b"a");

    let plan = Provisioner::new(harness.request(DeviceType::JamManStereo)).plan()?;
    assert_eq!(plan.slot_count, 99);
    assert_eq!(plan.bindings.len(), 2);
    assert_eq!(plan.bindings[0].song_name(), "a.wav");
    assert!(!plan.root_exists);
    assert_eq!(fs::read_dir(harness.card_root())?.count(), 0);
    Ok(())
}

#[test]
fn run_events_are_logged() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("a.wav", b"a");
    harness.add_source("b.wav", b"b");

    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    let provisioner = Provisioner::new(request);
    let summary = provisioner.run()?;

    let events = provisioner.events().list()?;
    let kinds: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::RunStarted,
            EventType::TreeMaterialized,
            EventType::SlotProvisioned,
            EventType::SlotProvisioned,
            EventType::RunCompleted,
        ]
    );
    assert!(events.iter().all(|e| e.run_id == summary.run_id));
    Ok(())
}

#[test]
fn progress_callback_sees_each_slot_in_order() -> Result<()> {
    let harness = IntegrationHarness::new();
    for name in ["c.wav", "a.wav", "b.wav"] {
        harness.add_source(name, name.as_bytes());
    }
    let mut request = harness.request(DeviceType::JamManStereo);
    request.record_events = false;
    let mut seen = Vec::new();
    Provisioner::new(request).run_with_progress(|binding| seen.push(binding.slot_index))?;
    assert_eq!(seen, vec![1, 2, 3]);
    assert!(!harness.card_root().join("jamtree-events.jsonl").exists());
    Ok(())
}

#[test]
fn unwritable_event_log_does_not_stop_the_run() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.add_source("a.wav", b"a");
    fs::create_dir_all(harness.card_root().join("jamtree-events.jsonl"))?;

    let mut request = harness.request(DeviceType::JamManStereo);
    request.capacity = Some(CapacityPolicy::DemandSized);
    let summary = Provisioner::new(request).run()?;

    assert_eq!(read_lines(&summary.manifest_path).len(), 2);
    assert!(summary.root.join("Patch01/PhraseA/a.wav").exists());
    Ok(())
}
