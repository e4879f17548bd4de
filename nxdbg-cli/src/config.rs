//! Configuration file loading.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use nxdbg::{Config, DEFAULT_PORT, MAX_RECV_LIMIT};
use serde::{Deserialize, Serialize};

/// Contents of `nxdbg.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Stub TCP port.
    pub(crate) port: u16,
    /// Client tuning.
    pub(crate) client: Config,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client: Config::default(),
        }
    }
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub(crate) fn load(path: &Path) -> Result<CliConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse(&text).with_context(|| format!("invalid config {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no config at {}; using defaults", path.display());
            Ok(CliConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn parse(text: &str) -> Result<CliConfig> {
    let cfg: CliConfig = toml::from_str(text)?;
    ensure!(
        cfg.client.recv_limit <= MAX_RECV_LIMIT,
        "recv_limit {} exceeds the maximum of {MAX_RECV_LIMIT}",
        cfg.client.recv_limit
    );
    Ok(cfg)
}

/// The default configuration as TOML.
pub(crate) fn render_default() -> Result<String> {
    Ok(toml::to_string_pretty(&CliConfig::default())?)
}
