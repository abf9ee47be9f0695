use httpstatus::config::{default_config_document, parse_config_document, ConfigError, ProbeConfig};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_default_document_parses_to_defaults() {
    let config = parse_config_document(&default_config_document()).unwrap();

    assert_eq!(config.url(), "https://www.univie.ac.at/");
    assert_eq!(config.asset_name(), "http-status");
    assert_eq!(config.rate_secs(), 10);
    assert_eq!(config.interval(), Duration::from_secs(10));
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert!(config.client_certificate().is_none());
}

#[test]
fn test_value_wins_over_default() {
    let mut document = default_config_document();
    document["url"]["value"] = json!("https://example.test/health");
    document["assetName"]["value"] = json!("probe1");
    document["rate"]["value"] = json!("3");
    document["timeout"]["value"] = json!(5);

    let config = parse_config_document(&document).unwrap();

    assert_eq!(config.url(), "https://example.test/health");
    assert_eq!(config.asset_name(), "probe1");
    assert_eq!(config.rate_secs(), 3);
    assert_eq!(config.timeout(), Duration::from_secs(5));
}

#[test]
fn test_bare_values_are_accepted() {
    let config = parse_config_document(&json!({
        "url": "http://localhost:8080/",
        "assetName": "local",
        "rate": 1
    }))
    .unwrap();

    assert_eq!(config.url(), "http://localhost:8080/");
    assert_eq!(config.rate_secs(), 1);
}

#[test]
fn test_certificate_requires_both_parts() {
    let base = json!({
        "url": {"value": "https://example.test/"},
        "assetName": {"value": "probe1"},
        "pkiFile": {"value": "/etc/certs/client.p12"},
        "pkiPasswd": {"value": ""}
    });
    let config = parse_config_document(&base).unwrap();
    assert_eq!(config.pki_file(), "/etc/certs/client.p12");
    assert!(config.client_certificate().is_none());

    let mut both = base.clone();
    both["pkiPasswd"]["value"] = json!("s3cret");
    let bundle = parse_config_document(&both)
        .unwrap()
        .client_certificate()
        .unwrap();
    assert_eq!(bundle.path, PathBuf::from("/etc/certs/client.p12"));
    assert_eq!(bundle.password, "s3cret");
}

#[test]
fn test_mandatory_items_are_enforced() {
    let no_url = json!({"assetName": {"value": "probe1"}});
    assert!(matches!(
        parse_config_document(&no_url),
        Err(ConfigError::MissingItem(item)) if item == "url"
    ));

    let blank_asset = json!({"url": {"value": "https://example.test/"}, "assetName": {"value": "  "}});
    assert!(matches!(
        parse_config_document(&blank_asset),
        Err(ConfigError::MissingItem(item)) if item == "assetName"
    ));
}

#[test]
fn test_invalid_items_are_rejected() {
    let cases = vec![
        json!({"url": "https://example.test/", "assetName": "a", "rate": "0"}),
        json!({"url": "https://example.test/", "assetName": "a", "rate": -4}),
        json!({"url": "https://example.test/", "assetName": "a", "rate": "ten"}),
        json!({"url": "https://example.test/", "assetName": "a", "rate": 1.5}),
        json!({"url": "https://example.test/", "assetName": "a", "timeout": "0"}),
        json!({"url": "ftp://example.test/", "assetName": "a"}),
        json!({"url": "example.test", "assetName": "a"}),
        json!({"url": 42, "assetName": "a"}),
    ];

    for document in cases {
        assert!(
            matches!(parse_config_document(&document), Err(ConfigError::InvalidItem { .. })),
            "expected InvalidItem for {}",
            document
        );
    }
}

#[test]
fn test_document_must_be_an_object() {
    assert!(matches!(
        parse_config_document(&json!(["url"])),
        Err(ConfigError::NotAnObject)
    ));
}

#[test]
fn test_debug_output_hides_password() {
    let config = ProbeConfig::new("https://example.test/", "probe1", 1)
        .unwrap()
        .with_certificate("/etc/certs/client.p12", "s3cret");

    let rendered = format!("{:?}", config);

    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("[REDACTED]"));
    assert!(!format!("{:?}", config.client_certificate().unwrap()).contains("s3cret"));
}
