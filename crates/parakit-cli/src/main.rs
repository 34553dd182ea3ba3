mod commands;
mod input;
mod shutdown;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use parakit_core::config::DEFAULT_CONFIG_FILE;
use parakit_core::{Config, GameTitle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parakit")]
#[command(about = "Touhou game state extractor")]
struct Args {
    /// Sequence duration ("150f", "2.5s") and/or "exact"
    #[arg(value_name = "DURATION|exact")]
    positional: Vec<String>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Analyzer to feed snapshots to
    #[arg(short, long)]
    analyzer: Option<String>,

    /// Target game (td, ddc, lolk or th13..th15)
    #[arg(short, long)]
    title: Option<String>,

    /// Schema override file
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Print per-run values after a single snapshot
    #[arg(short, long)]
    untracked: bool,

    /// Print the active schema as TOML (or write it to the given file) and exit
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    dump_schema: Option<PathBuf>,

    /// Directory for analyzer output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Wait for the game to start instead of failing
    #[arg(short, long)]
    wait: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("parakit=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };
    apply_overrides(&mut config, &args)?;

    let schema = config.schema()?;

    if let Some(output) = &args.dump_schema {
        let output = (output.as_os_str() != "-").then_some(output.as_path());
        return commands::schema::dump(&schema, output);
    }

    info!("ParaKit {} ({})", env!("CARGO_PKG_VERSION"), schema.title);
    commands::extract::run(&config, &schema, &args.output_dir, args.wait)
}

/// Command line values take precedence over the config file.
fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    for arg in &args.positional {
        if arg.eq_ignore_ascii_case("exact") {
            config.sequence.exact = true;
        } else {
            config.sequence.duration = arg.clone();
        }
    }
    if let Some(analyzer) = &args.analyzer {
        config.extraction.analyzer = analyzer.clone();
    }
    if let Some(title) = &args.title {
        config.target.title = GameTitle::from_str(title)
            .map_err(|_| parakit_core::Error::UnknownTitle(title.clone()))?;
    }
    if let Some(schema) = &args.schema {
        config.target.schema = schema.to_string_lossy().to_string();
    }
    if args.untracked {
        config.single.show_untracked = true;
    }
    Ok(())
}
