use std::fmt;
use std::path::PathBuf;

use logdigest_core::error::{DigestError, Result};

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Azure(AzureConnection),
    Local(PathBuf),
    Memory,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AzureConnection {
    pub account: Option<String>,
    pub access_key: Option<String>,
    pub endpoint: Option<String>,
    pub use_emulator: bool,
}

impl fmt::Debug for AzureConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConnection")
            .field("account", &self.account)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("use_emulator", &self.use_emulator)
            .finish()
    }
}

pub fn parse_backend(raw: &str) -> Result<Backend> {
    let raw = raw.trim();
    if raw == "memory://" || raw == "memory" {
        return Ok(Backend::Memory);
    }
    if let Some(path) = raw.strip_prefix("file://") {
        if path.is_empty() {
            return Err(DigestError::Config(
                "file:// storage connection needs a directory".to_string(),
            ));
        }
        return Ok(Backend::Local(PathBuf::from(path)));
    }
    parse_azure_connection_string(raw).map(Backend::Azure)
}

pub fn parse_azure_connection_string(raw: &str) -> Result<AzureConnection> {
    let mut conn = AzureConnection {
        account: None,
        access_key: None,
        endpoint: None,
        use_emulator: false,
    };
    let mut protocol = "https".to_string();
    let mut suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();

    for entry in raw.split(';') {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(DigestError::Config(
                "connection string entries must use Key=Value syntax".to_string(),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(DigestError::Config(
                "connection string key cannot be empty".to_string(),
            ));
        }
        let value = value.trim().to_string();
        match key.to_ascii_lowercase().as_str() {
            "accountname" => conn.account = Some(value),
            "accountkey" => conn.access_key = Some(value),
            "blobendpoint" => conn.endpoint = Some(value),
            "defaultendpointsprotocol" => protocol = value,
            "endpointsuffix" => suffix = value,
            "usedevelopmentstorage" => conn.use_emulator = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    if conn.use_emulator {
        return Ok(conn);
    }

    let Some(account) = conn.account.as_deref() else {
        return Err(DigestError::Config(
            "connection string is missing AccountName".to_string(),
        ));
    };
    if conn.access_key.is_none() {
        return Err(DigestError::Config(
            "connection string is missing AccountKey".to_string(),
        ));
    }
    if conn.endpoint.is_none() && suffix != DEFAULT_ENDPOINT_SUFFIX {
        conn.endpoint = Some(format!("{protocol}://{account}.blob.{suffix}"));
    }
    Ok(conn)
}
