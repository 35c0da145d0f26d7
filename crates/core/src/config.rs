use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, Result};

pub const DEFAULT_OUTPUT_PREFIX: &str = "output/";
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:7071";
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub storage_connection: String,
    pub container: String,
    pub input_prefix: String,
    pub output_prefix: String,
    pub fetch_concurrency: usize,
    pub malformed_input: MalformedInputPolicy,
    pub http_addr: String,
    pub schedule_every: Option<Duration>,
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MalformedInputPolicy {
    #[default]
    Abort,
    Skip,
}

impl FromStr for MalformedInputPolicy {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(DigestError::Config(format!(
                "unknown malformed_input policy: {other} (expected abort or skip)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    pub timestamp: String,
    pub severity: String,
    pub source: String,
    pub message: String,
    pub stack_trace: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: "timestamp [UTC]".to_string(),
            severity: "severityLevel".to_string(),
            source: "cloud_RoleName".to_string(),
            message: "message".to_string(),
            stack_trace: "details".to_string(),
        }
    }
}

impl Config {
    pub fn load_with(cli: ConfigOverrides) -> Result<Self> {
        let mut merged = ConfigOverrides::default();
        if let Some(file_overrides) = load_file_overrides(&config_file_path())? {
            merged.merge(file_overrides);
        }
        merged.merge(load_env_overrides()?);
        merged.merge(cli);
        Self::resolve(merged)
    }

    pub fn from_env() -> Result<Self> {
        Self::resolve(load_env_overrides()?)
    }

    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let storage_connection = required(
            overrides.storage_connection,
            "storage_connection",
            "LOGDIGEST_STORAGE_CONNECTION",
        )?;
        let container = required(overrides.container, "container", "LOGDIGEST_CONTAINER")?;

        let fetch_concurrency = overrides
            .fetch_concurrency
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if fetch_concurrency == 0 {
            return Err(DigestError::Config(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }

        let malformed_input = overrides
            .malformed_input
            .as_deref()
            .map(MalformedInputPolicy::from_str)
            .transpose()?
            .unwrap_or_default();

        let schedule_every = match overrides.schedule_every {
            Some(v) => Some(humantime::parse_duration(&v).map_err(|e| {
                DigestError::Config(format!("bad schedule_every: {e} (value={v})"))
            })?),
            None => None,
        };

        let mut columns = ColumnMapping::default();
        if let Some(c) = overrides.columns {
            apply_column_overrides(&mut columns, c);
        }

        Ok(Self {
            storage_connection,
            container,
            input_prefix: overrides.input_prefix.unwrap_or_default(),
            output_prefix: overrides
                .output_prefix
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            fetch_concurrency,
            malformed_input,
            http_addr: overrides
                .http_addr
                .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            schedule_every,
            columns,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigOverrides {
    pub storage_connection: Option<String>,
    pub container: Option<String>,
    pub input_prefix: Option<String>,
    pub output_prefix: Option<String>,
    pub fetch_concurrency: Option<usize>,
    pub malformed_input: Option<String>,
    pub http_addr: Option<String>,
    pub schedule_every: Option<String>,
    pub columns: Option<ColumnOverrides>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ColumnOverrides {
    pub timestamp: Option<String>,
    pub severity: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    pub stack_trace: Option<String>,
}

impl ConfigOverrides {
    pub fn merge(&mut self, other: ConfigOverrides) {
        if other.storage_connection.is_some() {
            self.storage_connection = other.storage_connection;
        }
        if other.container.is_some() {
            self.container = other.container;
        }
        if other.input_prefix.is_some() {
            self.input_prefix = other.input_prefix;
        }
        if other.output_prefix.is_some() {
            self.output_prefix = other.output_prefix;
        }
        if other.fetch_concurrency.is_some() {
            self.fetch_concurrency = other.fetch_concurrency;
        }
        if other.malformed_input.is_some() {
            self.malformed_input = other.malformed_input;
        }
        if other.http_addr.is_some() {
            self.http_addr = other.http_addr;
        }
        if other.schedule_every.is_some() {
            self.schedule_every = other.schedule_every;
        }
        if let Some(c) = other.columns {
            let base = self.columns.get_or_insert_with(ColumnOverrides::default);
            if c.timestamp.is_some() {
                base.timestamp = c.timestamp;
            }
            if c.severity.is_some() {
                base.severity = c.severity;
            }
            if c.source.is_some() {
                base.source = c.source;
            }
            if c.message.is_some() {
                base.message = c.message;
            }
            if c.stack_trace.is_some() {
                base.stack_trace = c.stack_trace;
            }
        }
    }
}

fn required(value: Option<String>, key: &str, env_key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DigestError::ConfigurationMissing(format!(
            "{key} is required (set {env_key} or `{key}` in the config file)"
        ))),
    }
}

fn apply_column_overrides(columns: &mut ColumnMapping, overrides: ColumnOverrides) {
    if let Some(v) = overrides.timestamp {
        columns.timestamp = v;
    }
    if let Some(v) = overrides.severity {
        columns.severity = v;
    }
    if let Some(v) = overrides.source {
        columns.source = v;
    }
    if let Some(v) = overrides.message {
        columns.message = v;
    }
    if let Some(v) = overrides.stack_trace {
        columns.stack_trace = v;
    }
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGDIGEST_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("logdigest/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| DigestError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| DigestError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let fetch_concurrency = match env::var("LOGDIGEST_FETCH_CONCURRENCY") {
        Ok(v) => Some(v.trim().parse::<usize>().map_err(|e| {
            DigestError::Config(format!("bad LOGDIGEST_FETCH_CONCURRENCY in environment: {e}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        storage_connection: env::var("LOGDIGEST_STORAGE_CONNECTION").ok(),
        container: env::var("LOGDIGEST_CONTAINER").ok(),
        input_prefix: env::var("LOGDIGEST_INPUT_PREFIX").ok(),
        output_prefix: env::var("LOGDIGEST_OUTPUT_PREFIX").ok(),
        fetch_concurrency,
        malformed_input: env::var("LOGDIGEST_MALFORMED_INPUT").ok(),
        http_addr: env::var("LOGDIGEST_HTTP_ADDR").ok(),
        schedule_every: env::var("LOGDIGEST_SCHEDULE_EVERY").ok(),
        columns: None,
    })
}
