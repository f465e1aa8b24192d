//! Bundle Validator CLI
//!
//! Validates a bundle envelope and prints the outcome records as JSON.
//! Exits non-zero when any outcome is an error.

use std::io::Read;
use std::path::PathBuf;

use bundle_validator::{
    BundleEnvelope, BundleValidator, OutputFormat, ResourceValidator, ValidatorConfig,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundle-validator")]
#[command(about = "Validate a bundle of data files against bundled JSON schemas")]
struct Cli {
    /// Bundle envelope JSON file, or `-` for stdin
    bundle: PathBuf,

    /// Print only errors
    #[arg(long)]
    only_errors: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory resource paths are relative to
    #[arg(long)]
    resources_dir: Option<PathBuf>,

    /// Never fetch meta-schemas over the network
    #[arg(long)]
    offline: bool,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = ValidatorConfig::load_from(cli.config.as_deref())?;
    if let Some(dir) = cli.resources_dir {
        config.resources.root = dir;
    }
    if cli.offline {
        config.fetch.enabled = false;
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }
    if cli.only_errors {
        config.output.only_errors = true;
    }

    let envelope = if cli.bundle.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        BundleEnvelope::from_reader(raw.as_bytes())?
    } else {
        BundleEnvelope::from_path(&cli.bundle)?
    };

    let validator = BundleValidator::from_envelope(
        envelope,
        config.fetch.fetcher()?,
        ResourceValidator::from_rules(config.resources.clone()),
    );
    let report = validator.run()?;

    println!("{}", report.to_json(config.output.only_errors, config.output.format)?);

    Ok(report.exit_code())
}
