use crate::common::create_temp_dir;
use httpstatus::config::{parse_config_document, ConfigError, FileConfig};

#[test]
fn test_toml_file_loads_and_converts_to_document() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("httpstatus.toml");
    std::fs::write(
        &path,
        r#"
url = "https://example.test/"
asset_name = "probe1"
rate = 2
pki_file = "/etc/certs/client.p12"
pki_passwd = "s3cret"
"#,
    )
    .unwrap();

    let file_config = FileConfig::load(&path).unwrap();
    assert_eq!(file_config.rate, Some(2));
    assert_eq!(file_config.timeout, None);

    let document = file_config.to_document();
    assert_eq!(document["url"]["value"], "https://example.test/");
    assert_eq!(document["rate"]["value"], 2);
    assert!(document["timeout"].get("value").is_none());

    let config = parse_config_document(&document).unwrap();
    assert_eq!(config.asset_name(), "probe1");
    assert_eq!(config.rate_secs(), 2);
    assert!(config.client_certificate().is_some());
}

#[test]
fn test_overlay_prefers_later_values() {
    let file = FileConfig {
        url: Some("https://file.example.test/".to_string()),
        asset_name: Some("from-file".to_string()),
        rate: Some(30),
        ..Default::default()
    };
    let flags = FileConfig {
        rate: Some(5),
        ..Default::default()
    };

    let merged = file.overlay(flags);

    assert_eq!(merged.url.as_deref(), Some("https://file.example.test/"));
    assert_eq!(merged.asset_name.as_deref(), Some("from-file"));
    assert_eq!(merged.rate, Some(5));
}

#[test]
fn test_empty_file_config_falls_back_to_defaults() {
    let config = parse_config_document(&FileConfig::default().to_document()).unwrap();

    assert_eq!(config.asset_name(), "http-status");
    assert_eq!(config.rate_secs(), 10);
}

#[test]
fn test_malformed_or_missing_file_is_reported() {
    assert!(matches!(
        FileConfig::from_toml_str("rate = \"soon\""),
        Err(ConfigError::File(_))
    ));

    let temp_dir = create_temp_dir();
    assert!(matches!(
        FileConfig::load(&temp_dir.path().join("absent.toml")),
        Err(ConfigError::File(_))
    ));
}
