//! frost: freeze declared entry points into one shared distribution.

mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use permafrost_lib::consts::MANIFEST_FILE;

/// permafrost - freeze entry points into a consolidated distribution
#[derive(Parser)]
#[command(name = "frost")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Freeze every declared entry point and consolidate the output
  Build {
    /// Path to the project manifest
    #[arg(default_value = MANIFEST_FILE)]
    manifest: PathBuf,

    /// Skip automatic dependency discovery
    #[arg(long)]
    no_discovery: bool,

    /// Interpreter used for discovery and version detection
    #[arg(long, default_value = "python3")]
    python: String,
  },

  /// Show what dependency discovery would add, without building
  Discover {
    /// Path to the project manifest
    #[arg(default_value = MANIFEST_FILE)]
    manifest: PathBuf,

    /// Interpreter used for discovery
    #[arg(long, default_value = "python3")]
    python: String,

    /// Print the resolved fragment as JSON
    #[arg(long)]
    json: bool,
  },

  /// Remove the build base directory
  Clean {
    /// Path to the project manifest
    #[arg(default_value = MANIFEST_FILE)]
    manifest: PathBuf,
  },

  /// Show the manifest and resolved build directories
  Info {
    /// Path to the project manifest
    #[arg(default_value = MANIFEST_FILE)]
    manifest: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("info")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt().with_env_filter(filter).without_time().init();

  match cli.command {
    Commands::Build {
      manifest,
      no_discovery,
      python,
    } => cmd::cmd_build(&manifest, !no_discovery, &python),
    Commands::Discover { manifest, python, json } => cmd::cmd_discover(&manifest, &python, json),
    Commands::Clean { manifest } => cmd::cmd_clean(&manifest),
    Commands::Info { manifest } => cmd::cmd_info(&manifest),
  }
}
