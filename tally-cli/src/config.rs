use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tally_finance::{DEFAULT_MASTER_URL, FetchPolicy, MasterSource};
use tally_ingest::TextBackend;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub master: MasterSection,
    pub extract: ExtractSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterSection {
    /// CSV export URL of the keyword sheet
    pub url: String,
    /// Local keyword CSV; takes precedence over `url` when set
    pub path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    pub text_backend: TextBackend,
    pub chain_balances: bool,
}

impl Default for MasterSection {
    fn default() -> Self {
        let policy = FetchPolicy::default();
        Self {
            url: DEFAULT_MASTER_URL.to_string(),
            path: None,
            timeout_secs: policy.timeout.as_secs(),
            attempts: policy.attempts,
        }
    }
}

impl MasterSection {
    /// `--master` wins over the config file
    pub fn source(&self, flag: Option<&str>) -> MasterSource {
        match (flag, &self.path) {
            (Some(s), _) => MasterSource::parse(s),
            (None, Some(p)) => MasterSource::Path(p.clone()),
            (None, None) => MasterSource::parse(&self.url),
        }
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            attempts: self.attempts.max(1),
            ..FetchPolicy::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
