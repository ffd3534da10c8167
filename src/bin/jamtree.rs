use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jamtree::device::{self, CapacityMode};
use jamtree::provisioning::{device_root, needs_policy, ProvisionRequest, Provisioner};
use jamtree::{AppConfig, ExistingTreePolicy};
use tracing_subscriber::EnvFilter;

/// Build a looper card's slot tree from a folder of audio files.
#[derive(Parser, Debug)]
#[command(name = "jamtree", version)]
struct Cli {
    /// Config file to load instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device model (JamManStereo or JamManSoloXT).
    #[arg(long)]
    device: Option<String>,

    /// Mounted card root.
    #[arg(long)]
    target: Option<PathBuf>,

    /// Folder of audio files to load.
    #[arg(long)]
    source: Option<PathBuf>,

    /// What to do if the device folder already exists: append or overwrite.
    #[arg(long)]
    policy: Option<String>,

    /// preserve (keep source names) or canonicalize (fixed name per slot).
    #[arg(long)]
    naming: Option<String>,

    /// Create one slot per source file instead of the device's fixed count.
    #[arg(long, conflicts_with = "slots")]
    demand_sized: bool,

    /// Fixed number of slots to create.
    #[arg(long)]
    slots: Option<usize>,

    /// Print the slot assignment without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Skip the run event log on the card.
    #[arg(long)]
    no_events: bool,

    /// Store the merged settings as the default config, then continue.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(device) = &self.device {
            config.device.device_type = device.clone();
        }
        if self.demand_sized {
            config.device.capacity = Some(CapacityMode::Demand);
            config.device.slots = None;
        }
        if let Some(slots) = self.slots {
            config.device.capacity = Some(CapacityMode::Fixed);
            config.device.slots = Some(slots);
        }
        if let Some(target) = &self.target {
            config.paths.target_root = Some(target.clone());
        }
        if let Some(source) = &self.source {
            config.paths.source_dir = Some(source.clone());
        }
        if let Some(policy) = &self.policy {
            config.paths.existing_tree = Some(policy.clone());
        }
        if let Some(naming) = &self.naming {
            config.placement.naming = naming.parse()?;
        }
        if self.no_events {
            config.events.enabled = false;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("JAMTREE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => device::load_from(path)?,
        None => device::load_or_default()?,
    };
    cli.apply(&mut config)?;
    if cli.save_config {
        let path = device::save(&config)?;
        println!("Saved configuration to {}", path.display());
    }
    let mut request = ProvisionRequest::from_config(&config)?;

    if cli.dry_run {
        return print_plan(Provisioner::new(request));
    }

    if needs_policy(&request) {
        request.existing_tree = Some(prompt_policy(&request)?);
    }

    let provisioner = Provisioner::new(request);
    let summary = provisioner.run_with_progress(|binding| {
        println!(
            "Processed file: {} -> {}",
            binding.song_name(),
            binding.destination_path.display()
        );
    })?;
    println!("{}", summary.describe());
    println!("CSV file, XML files, and directories updated successfully.");
    Ok(())
}

fn prompt_policy(request: &ProvisionRequest) -> Result<ExistingTreePolicy> {
    print!(
        "Directory '{}' already exists. Do you want to (A)ppend or (O)verwrite? ",
        device_root(request).display()
    );
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read policy answer")?;
    Ok(answer.parse()?)
}

fn print_plan(provisioner: Provisioner) -> Result<()> {
    let plan = provisioner.plan()?;
    println!(
        "{} -> {} ({} slot directories, {} files)",
        plan.layout.device,
        plan.root.display(),
        plan.slot_count,
        plan.bindings.len()
    );
    if plan.root_exists {
        println!("Device folder already exists; a policy will be required.");
    }
    for binding in &plan.bindings {
        println!(
            "  {} {} <- {}",
            binding.slot_dir_name,
            binding.placed_file_name(),
            binding.source_path.display()
        );
    }
    Ok(())
}
