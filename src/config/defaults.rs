// Default configuration document advertised through plugin_info()
//
// Every item carries the metadata the host framework renders (description,
// type, order, displayName) next to its `default`. Hosts answer with the same
// shape plus a `value` per item.

use serde_json::{json, Value};

pub const DEFAULT_URL: &str = "https://www.univie.ac.at/";
pub const DEFAULT_ASSET_NAME: &str = "http-status";
pub const DEFAULT_RATE_SECS: u64 = 10;
pub const MIN_RATE_SECS: u64 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MIN_TIMEOUT_SECS: u64 = 1;

pub fn default_config_document() -> Value {
    json!({
        "plugin": {
            "description": "HTTP Status check",
            "type": "string",
            "default": "http-status",
            "readonly": "true"
        },
        "url": {
            "description": "URL to probe",
            "type": "string",
            "default": DEFAULT_URL,
            "order": "1",
            "displayName": "URL",
            "mandatory": "true"
        },
        "assetName": {
            "description": "Asset Name",
            "type": "string",
            "default": DEFAULT_ASSET_NAME,
            "order": "2",
            "displayName": "Asset Name",
            "mandatory": "true"
        },
        "rate": {
            "description": "Rate at which to send requests in seconds",
            "type": "integer",
            "default": DEFAULT_RATE_SECS.to_string(),
            "minimum": MIN_RATE_SECS.to_string(),
            "order": "3",
            "displayName": "Request Interval"
        },
        "pkiFile": {
            "description": "Path to the p12 certificate file. (OPTIONAL)",
            "type": "string",
            "default": "",
            "order": "4",
            "displayName": "Certificate P12 file"
        },
        "pkiPasswd": {
            "description": "Password for the certificate (OPTIONAL)",
            "type": "password",
            "default": "",
            "order": "5",
            "displayName": "Cert Password"
        },
        "timeout": {
            "description": "Request timeout in seconds",
            "type": "integer",
            "default": DEFAULT_TIMEOUT_SECS.to_string(),
            "minimum": MIN_TIMEOUT_SECS.to_string(),
            "order": "6",
            "displayName": "Request Timeout"
        }
    })
}
