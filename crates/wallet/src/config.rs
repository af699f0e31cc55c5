use std::collections::HashMap;
use std::fs;
use std::path::Path;

use logwallet_consensus::{chain_params, ChainParams, Network};
use logwallet_log::{Format, Level, LogConfig};

use crate::WalletError;

pub const CONF_FILE_NAME: &str = "wallet.conf";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletConfig {
    pub network: Network,
    /// Flush the record store after every derived key.
    pub flush_on_derive: bool,
    pub log_level: Level,
    pub log_format: Format,
    pub log_timestamps: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        let log = LogConfig::default();
        Self {
            network: Network::Mainnet,
            flush_on_derive: true,
            log_level: log.level,
            log_format: log.format,
            log_timestamps: log.timestamps,
        }
    }
}

impl WalletConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(WalletError::Config(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, WalletError> {
        let entries = parse_conf(contents);
        let mut config = Self::default();

        if let Some(value) = last_value(&entries, "network") {
            config.network = Network::parse(value)
                .ok_or_else(|| WalletError::Config(format!("invalid network '{value}'")))?;
        }
        if let Some(value) = last_value(&entries, "flushonderive") {
            config.flush_on_derive = parse_conf_bool(value).ok_or_else(|| {
                WalletError::Config(format!("invalid flushonderive value '{value}'"))
            })?;
        }
        if let Some(value) = last_value(&entries, "loglevel") {
            config.log_level = Level::parse(value)
                .ok_or_else(|| WalletError::Config(format!("invalid loglevel '{value}'")))?;
        }
        if let Some(value) = last_value(&entries, "logformat") {
            config.log_format = Format::parse(value)
                .ok_or_else(|| WalletError::Config(format!("invalid logformat '{value}'")))?;
        }
        if let Some(value) = last_value(&entries, "logtimestamps") {
            config.log_timestamps = parse_conf_bool(value).ok_or_else(|| {
                WalletError::Config(format!("invalid logtimestamps value '{value}'"))
            })?;
        }
        Ok(config)
    }

    pub fn chain_params(&self) -> ChainParams {
        chain_params(self.network)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            format: self.log_format,
            timestamps: self.log_timestamps,
        }
    }

    /// Applies the logging settings to the process-wide logger. Call once at
    /// startup, before opening a wallet.
    pub fn init_logging(&self) {
        logwallet_log::init(self.log_config());
    }
}

fn parse_conf(contents: &str) -> HashMap<String, Vec<String>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for raw_line in contents.lines() {
        let mut line = raw_line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(idx) = line.find(['#', ';']) {
            line = &line[..idx];
        }
        line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, "1"),
        };
        if key.is_empty() {
            continue;
        }
        out.entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }
    out
}

fn last_value<'a>(entries: &'a HashMap<String, Vec<String>>, key: &str) -> Option<&'a str> {
    entries
        .get(key)
        .and_then(|values| values.last())
        .map(String::as_str)
}

fn parse_conf_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Some(true);
    }
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
