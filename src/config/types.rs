use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::defaults::{
    default_config_document, DEFAULT_TIMEOUT_SECS, MIN_RATE_SECS, MIN_TIMEOUT_SECS,
};

/// Configuration problems reported to the host at init time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config document must be a JSON object")]
    NotAnObject,
    #[error("missing mandatory configuration item '{0}'")]
    MissingItem(String),
    #[error("configuration item '{item}' is invalid: {reason}")]
    InvalidItem { item: String, reason: String },
    #[error("config file error: {0}")]
    File(String),
}

impl ConfigError {
    pub(crate) fn invalid(item: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidItem {
            item: item.to_string(),
            reason: reason.into(),
        }
    }
}

/// PKCS#12 client certificate bundle handed to the transport as an opaque option
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    pub path: PathBuf,
    pub password: String,
}

impl CertificateBundle {
    /// Both-or-neither: a bundle exists only when path and password are non-empty
    pub fn from_parts(path: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (path, password) {
            (Some(path), Some(password)) if !path.is_empty() && !password.is_empty() => {
                Some(Self {
                    path: PathBuf::from(path),
                    password: password.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for CertificateBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateBundle")
            .field("path", &self.path)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Immutable probe configuration snapshot
///
/// Built only through validation (`ProbeConfig::new` or a config document), so a
/// running instance never observes a half-valid configuration. Reconfiguration
/// replaces the whole snapshot.
#[derive(Clone, PartialEq)]
pub struct ProbeConfig {
    url: String,
    asset_name: String,
    rate_secs: u64,
    pki_file: String,
    pki_passwd: String,
    timeout_secs: u64,
}

impl ProbeConfig {
    pub fn new(
        url: impl Into<String>,
        asset_name: impl Into<String>,
        rate_secs: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            url: url.into().trim().to_string(),
            asset_name: asset_name.into().trim().to_string(),
            rate_secs,
            pki_file: String::new(),
            pki_passwd: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Attach certificate settings; an incomplete pair is kept but never applied
    pub fn with_certificate(mut self, pki_file: impl Into<String>, pki_passwd: impl Into<String>) -> Self {
        self.pki_file = pki_file.into();
        self.pki_passwd = pki_passwd.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Result<Self, ConfigError> {
        self.timeout_secs = timeout_secs;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingItem("url".to_string()));
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ConfigError::invalid("url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if self.asset_name.is_empty() {
            return Err(ConfigError::MissingItem("assetName".to_string()));
        }
        if self.rate_secs < MIN_RATE_SECS {
            return Err(ConfigError::invalid(
                "rate",
                format!("must be at least {} second(s)", MIN_RATE_SECS),
            ));
        }
        if self.timeout_secs < MIN_TIMEOUT_SECS {
            return Err(ConfigError::invalid(
                "timeout",
                format!("must be at least {} second(s)", MIN_TIMEOUT_SECS),
            ));
        }
        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn rate_secs(&self) -> u64 {
        self.rate_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.rate_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pki_file(&self) -> &str {
        &self.pki_file
    }

    pub fn pki_passwd(&self) -> &str {
        &self.pki_passwd
    }

    pub fn client_certificate(&self) -> Option<CertificateBundle> {
        CertificateBundle::from_parts(Some(self.pki_file.as_str()), Some(self.pki_passwd.as_str()))
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("url", &self.url)
            .field("asset_name", &self.asset_name)
            .field("rate_secs", &self.rate_secs)
            .field("pki_file", &self.pki_file)
            .field(
                "pki_passwd",
                &if self.pki_passwd.is_empty() { "" } else { "[REDACTED]" },
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// On-disk TOML configuration used by the command-line runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub asset_name: Option<String>,
    pub rate: Option<u64>,
    pub pki_file: Option<String>,
    pub pki_passwd: Option<String>,
    pub timeout: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::File(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::File(e.to_string()))
    }

    /// Values present in `other` win over values in `self`
    pub fn overlay(self, other: FileConfig) -> FileConfig {
        FileConfig {
            url: other.url.or(self.url),
            asset_name: other.asset_name.or(self.asset_name),
            rate: other.rate.or(self.rate),
            pki_file: other.pki_file.or(self.pki_file),
            pki_passwd: other.pki_passwd.or(self.pki_passwd),
            timeout: other.timeout.or(self.timeout),
        }
    }

    /// Render as a host-style config document: the default document with a
    /// `value` set on every item this file provides
    pub fn to_document(&self) -> serde_json::Value {
        let mut document = default_config_document();
        let values = [
            ("url", self.url.clone().map(serde_json::Value::from)),
            ("assetName", self.asset_name.clone().map(serde_json::Value::from)),
            ("rate", self.rate.map(serde_json::Value::from)),
            ("pkiFile", self.pki_file.clone().map(serde_json::Value::from)),
            ("pkiPasswd", self.pki_passwd.clone().map(serde_json::Value::from)),
            ("timeout", self.timeout.map(serde_json::Value::from)),
        ];

        for (item, value) in values {
            if let (Some(value), Some(entry)) = (value, document.get_mut(item)) {
                if let Some(entry) = entry.as_object_mut() {
                    entry.insert("value".to_string(), value);
                }
            }
        }
        document
    }
}
