//! CLI entry point for atdeps.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// atdeps — generate the Andor SDK binding module from the installed headers.
#[derive(Parser, Debug)]
#[command(name = "atdeps", version, about)]
struct Cli {
    /// Path to the atdeps.toml configuration file.
    #[arg(default_value = "atdeps.toml")]
    config: PathBuf,

    /// Write the module to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr, keeping stdout a clean module stream.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("atdeps=info")),
        )
        .init();

    let cli = Cli::parse();
    atdeps::run(&cli.config, cli.output.as_deref())?;
    Ok(())
}
