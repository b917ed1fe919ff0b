//! atdeps — capability-probing binding generator for the Andor camera SDK.
//!
//! Probes the installed SDK headers via libclang and emits a binding module
//! (type aliases, structure offsets, conditionally-available constants) as
//! text. The same binary runs unmodified against different SDK releases and
//! machine architectures: every width, signedness, value, and availability
//! fact is read back from a translation unit compiled against the real
//! headers at generation time.
//!
//! # Quick start
//!
//! Stream the module for the config in the current directory to stdout:
//!
//! ```no_run
//! use std::path::Path;
//!
//! atdeps::run(Path::new("atdeps.toml"), None).unwrap();
//! ```
//!
//! Or get the module text without writing it anywhere:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let module = atdeps::generate(Path::new("atdeps.toml")).unwrap();
//! ```

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub mod catalog;
pub mod config;
pub mod emit;
pub mod model;
pub mod probe;

/// Run the full pipeline: load config, probe the SDK headers, and stream
/// the emitted module to `output` (or to stdout when `None`).
///
/// `config_path` is the path to an `atdeps.toml` configuration file.
/// Nothing is written unless probing succeeded in full, so a failed run
/// never leaves a partial module behind.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let text = generate(config_path)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("writing output to {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "wrote binding module");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .context("writing binding module to stdout")?;
        }
    }
    Ok(())
}

/// Parse an `atdeps.toml` config file, probe the referenced SDK headers,
/// and return the generated module text without writing it anywhere.
pub fn generate(config_path: &Path) -> Result<String> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let module = probe::probe(&cfg, base_dir)?;

    let mut buf = Vec::new();
    emit::render(&module, &mut buf).context("rendering binding module")?;
    String::from_utf8(buf).context("emitted module is not UTF-8")
}
