use anagram_indexer::{
    clamp_max_workers, default_max_workers, parse_max_workers, BuildConfig, MAX_WORKERS_ENV,
};
use anagram_protocol::{Framing, DEFAULT_BIND, DEFAULT_MAX_LINE_BYTES};
use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DICT_ENV: &str = "ANAGRAM_DICT";
pub const BIND_ENV: &str = "ANAGRAM_BIND";
pub const IDLE_TIMEOUT_ENV: &str = "ANAGRAM_IDLE_TIMEOUT_MS";

const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";
const DEFAULT_IDLE_TIMEOUT_MS: u64 = 5 * 60 * 1000; // 5 minutes

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub dictionary: PathBuf,
    pub max_workers: usize,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    /// 0 disables the timeout.
    pub idle_timeout_ms: u64,
    pub max_line_bytes: usize,
    pub framing: Framing,
    pub exclude_query: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary: PathBuf::from(DEFAULT_DICTIONARY),
            max_workers: default_max_workers(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            framing: Framing::None,
            exclude_query: false,
        }
    }
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_ms > 0).then(|| Duration::from_millis(self.idle_timeout_ms))
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Defaults, then the TOML file if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml_str(&raw)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.max_workers = clamp_max_workers(config.max_workers);
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dict) = non_empty(lookup(DICT_ENV)) {
            self.dictionary = PathBuf::from(dict);
        }
        if let Some(raw) = non_empty(lookup(MAX_WORKERS_ENV)) {
            self.max_workers = parse_max_workers(Some(&raw), self.max_workers);
        }
        if let Some(bind) = non_empty(lookup(BIND_ENV)) {
            self.server.bind = bind;
        }
        if let Some(ms) = non_empty(lookup(IDLE_TIMEOUT_ENV)).and_then(|v| v.parse::<u64>().ok())
        {
            self.server.idle_timeout_ms = ms;
        }
    }

    pub fn build_config(&self) -> BuildConfig {
        BuildConfig::new(&self.dictionary).with_max_workers(self.max_workers)
    }
}
