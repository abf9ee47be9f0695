//! Host config document parsing
//!
//! The host hands over a JSON object keyed by item name. Each item is an object
//! whose `value` wins over its `default`; bare scalars are accepted as values.
//! Integer items may arrive as numbers or numeric strings.

use serde_json::{Map, Value};

use super::defaults::{DEFAULT_RATE_SECS, DEFAULT_TIMEOUT_SECS};
use super::types::{ConfigError, ProbeConfig};

pub fn parse_config_document(document: &Value) -> Result<ProbeConfig, ConfigError> {
    let items = document.as_object().ok_or(ConfigError::NotAnObject)?;

    let url = string_item(items, "url")?;
    if url.trim().is_empty() {
        return Err(ConfigError::MissingItem("url".to_string()));
    }
    let asset_name = string_item(items, "assetName")?;
    if asset_name.trim().is_empty() {
        return Err(ConfigError::MissingItem("assetName".to_string()));
    }
    let rate_secs = integer_item(items, "rate", DEFAULT_RATE_SECS)?;
    let timeout_secs = integer_item(items, "timeout", DEFAULT_TIMEOUT_SECS)?;
    let pki_file = string_item(items, "pkiFile")?;
    let pki_passwd = string_item(items, "pkiPasswd")?;

    ProbeConfig::new(url, asset_name, rate_secs)?
        .with_certificate(pki_file, pki_passwd)
        .with_timeout_secs(timeout_secs)
}

fn item_value<'a>(items: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match items.get(name)? {
        Value::Object(item) => item.get("value").or_else(|| item.get("default")),
        Value::Null => None,
        scalar => Some(scalar),
    }
}

fn string_item(items: &Map<String, Value>, name: &str) -> Result<String, ConfigError> {
    match item_value(items, name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ConfigError::invalid(
            name,
            format!("expected a string, got {}", other),
        )),
    }
}

fn integer_item(items: &Map<String, Value>, name: &str, default: u64) -> Result<u64, ConfigError> {
    let parsed = match item_value(items, name) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(default),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(n) if n >= 0 => Ok(n as u64),
        Some(n) => Err(ConfigError::invalid(name, format!("{} is negative", n))),
        None => Err(ConfigError::invalid(name, "expected an integer")),
    }
}
