//! Server configuration.
//!
//! Values are resolved from, in increasing precedence: built-in defaults, an
//! optional YAML file, environment variables and command-line flags.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::device::DeviceKind;
use crate::labels::LabelMap;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_LENGTH: usize = 128;

#[derive(Parser, Debug, Default)]
#[command(
    name = "review-classifier-server",
    about = "Serve a BERT sequence classifier over HTTP"
)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "REVIEW_CLASSIFIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding config.json, the tokenizer and the weights.
    #[arg(long, env = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:8000.
    #[arg(long, env = "LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Tokens per encoding; longer input is truncated.
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Compute device; `auto` picks the best accelerator compiled in.
    #[arg(long, value_enum)]
    pub device: Option<DeviceKind>,
}

/// Contents of the YAML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model_dir: Option<PathBuf>,
    pub listen_addr: Option<String>,
    pub max_length: Option<usize>,
    pub labels: Option<LabelMap>,
    pub device: Option<DeviceKind>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub model_dir: PathBuf,
    pub listen_addr: String,
    pub max_length: usize,
    pub labels: LabelMap,
    pub device: DeviceKind,
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration from file");
                load_file(path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(file, cli)
    }

    fn merge(file: FileConfig, cli: Cli) -> anyhow::Result<Self> {
        let model_dir = cli.model_dir.or(file.model_dir).ok_or_else(|| {
            anyhow::anyhow!("model directory is not configured; pass --model-dir or set MODEL_DIR")
        })?;
        let max_length = cli
            .max_length
            .or(file.max_length)
            .unwrap_or(DEFAULT_MAX_LENGTH);
        anyhow::ensure!(max_length > 0, "max_length must be at least 1");
        let labels = file.labels.unwrap_or_default();
        anyhow::ensure!(!labels.is_empty(), "labels must map at least one class");

        Ok(Self {
            model_dir,
            listen_addr: cli
                .listen_addr
                .or(file.listen_addr)
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            max_length,
            labels,
            device: cli.device.or(file.device).unwrap_or_default(),
        })
    }
}

/// Load a [`FileConfig`] from a YAML file at `path`.
pub fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    let config: FileConfig = serde_yaml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {}", e))?;
    Ok(config)
}
