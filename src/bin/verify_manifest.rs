use anyhow::{Context, Result};
use jamtree::device::{self, DeviceType};
use jamtree::documents::{verify_card, VerifyOptions};
use std::env;
use std::path::PathBuf;

const USAGE: &str =
    "Usage: verify_manifest <card-root> <device-type> [--hash] [--canonical-name <name>]";

fn main() -> Result<()> {
    let mut positional = Vec::new();
    let mut check_hashes = false;
    let mut canonical_name = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--hash" => check_hashes = true,
            "--canonical-name" => canonical_name = Some(args.next().context(USAGE)?),
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let card_root = positional.next().map(PathBuf::from).context(USAGE)?;
    let device: DeviceType = positional.next().context(USAGE)?.parse()?;
    let canonical_name = match canonical_name {
        Some(name) => name,
        None => device::load_or_default()?.placement.canonical_name,
    };

    let options = VerifyOptions {
        canonical_name,
        check_hashes,
    };
    let report = verify_card(&card_root, device, &options)?;

    if report.is_clean() {
        println!(
            "Manifest {} verified: {} slot(s) from {} rows match the card.",
            report.manifest_path.display(),
            report.slots_checked,
            report.rows
        );
        Ok(())
    } else {
        println!("Manifest verification failed:");
        for failure in &report.failures {
            println!("  - {}", failure);
        }
        anyhow::bail!(
            "Manifest verification failed ({} problems)",
            report.failures.len()
        )
    }
}
