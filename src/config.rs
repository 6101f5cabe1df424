use antr_sequencer::{SequencerConfig, SessionConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a `--config` file can set. Missing sections keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub sequencer: SequencerConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .sequencer
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        Ok(config)
    }

    /// CLI seed, then config seed, then a fresh one.
    pub fn resolve_seed(&mut self, cli_seed: Option<u64>) -> u64 {
        let seed = cli_seed
            .or(self.session.seed)
            .unwrap_or_else(rand::random);
        self.session.seed = Some(seed);
        seed
    }
}
