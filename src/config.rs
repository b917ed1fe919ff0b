//! Configuration types for `atdeps.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub output: OutputConfig,
    pub sdk: SdkConfig,
    #[serde(default)]
    pub offset: Vec<OffsetConfig>,
    #[serde(default)]
    pub size: Vec<SizeConfig>,
}

/// Settings for the emitted module.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Absolute path of the vendor shared library, declared as `_DLL`.
    pub library: String,
}

/// Where the SDK headers live and how to compile against them.
#[derive(Debug, Deserialize)]
pub struct SdkConfig {
    /// Headers included by the probe translation unit, in order.
    pub headers: Vec<PathBuf>,
    /// Extra clang arguments (e.g. `-I/usr/local/include`).
    #[serde(default)]
    pub clang_args: Vec<String>,
    /// Probe host-OS extension constants on matching platforms.
    #[serde(default = "default_true")]
    pub platform_extensions: bool,
}

fn default_true() -> bool {
    true
}

impl SdkConfig {
    /// Header paths resolved against the config file's directory.
    pub fn header_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.headers
            .iter()
            .map(|h| {
                if h.is_absolute() {
                    h.clone()
                } else {
                    base_dir.join(h)
                }
            })
            .collect()
    }
}

/// A requested structure-field offset declaration.
#[derive(Debug, Deserialize)]
pub struct OffsetConfig {
    /// Identifier emitted as `_offsetof_<ident>`.
    pub ident: String,
    /// C spelling of the structure type.
    pub record: String,
    /// Field name within the structure.
    pub field: String,
}

/// A requested structure-size declaration, emitted as `_sizeof_<ident>`.
#[derive(Debug, Deserialize)]
pub struct SizeConfig {
    pub ident: String,
    pub record: String,
}

/// Load and parse an `atdeps.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
