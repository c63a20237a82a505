//! iconpack - inspect the icon catalog of a web root.
//!
//! Builds the catalog the same way a site does at runtime and prints the
//! result as JSON on stdout. Logs go to stderr.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iconpack_core::{IconPackManager, YamlPackDiscovery};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "iconpack")]
#[command(about = "Inspect icon pack definitions and the icons they provide")]
struct Args {
    /// Web root that pack paths and root-relative sources resolve against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Directory (relative to the root) searched for *.icons.yml files
    #[arg(long = "scan", value_name = "DIR")]
    scan_dirs: Vec<PathBuf>,

    /// Provider directory holding NAME.icons.yml
    #[arg(long = "provider", value_name = "NAME=DIR", value_parser = parse_provider)]
    providers: Vec<(String, PathBuf)>,

    /// Skip JSON schema validation of pack definitions
    #[arg(long)]
    no_validate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List packs that have icons, with their option labels
    Packs {
        /// Include pack descriptions in the labels
        #[arg(long)]
        describe: bool,
    },
    /// List icons, optionally restricted to some packs
    Icons {
        /// Pack id to include (repeatable)
        #[arg(long = "pack", value_name = "PACK_ID")]
        packs: Vec<String>,
    },
    /// Show one icon by its full id (pack_id:icon_id)
    Icon { full_id: String },
    /// Show the default settings of a pack
    Defaults { pack_id: String },
}

fn parse_provider(value: &str) -> std::result::Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got '{}'", value)),
    }
}

fn build_manager(args: &Args) -> Result<IconPackManager> {
    let mut builder = IconPackManager::builder(&args.root);

    if !args.scan_dirs.is_empty() || !args.providers.is_empty() {
        let mut discovery = YamlPackDiscovery::new();
        for dir in &args.scan_dirs {
            discovery = discovery.with_scan_dir(dir);
        }
        for (name, dir) in &args.providers {
            discovery = discovery.with_provider(name, dir);
        }
        builder = builder.with_source(discovery);
    }
    if args.no_validate {
        builder = builder.without_validation();
    }

    builder.build().context("Failed to set up the icon pack manager")
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let default_level = if args.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    debug!("Icon root: {}", args.root.display());

    let manager = build_manager(&args)?;
    let output = commands::run(&manager, &args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
