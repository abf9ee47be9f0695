use crate::common::StubTransport;
use httpstatus::core::probe::{ProbeExecutor, SENTINEL_STATUS};
use std::path::PathBuf;
use std::time::Duration;

const URL: &str = "https://example.test/";

#[tokio::test]
async fn test_success_reports_status_and_elapsed_seconds() {
    let transport = StubTransport::responding(200, Duration::from_millis(50)).shared();
    let executor = ProbeExecutor::new(transport.clone());

    let outcome = executor.execute(URL, None, None).await;

    assert_eq!(outcome.status_code, 200);
    assert!((outcome.elapsed_seconds - 0.05).abs() < 1e-9);
    assert_eq!(outcome.error_message, "");
    assert!(!outcome.is_failure());
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.requests()[0].url, URL);
}

#[tokio::test]
async fn test_http_error_status_is_data_not_failure() {
    let transport = StubTransport::responding(503, Duration::from_millis(120)).shared();
    let executor = ProbeExecutor::new(transport);

    let outcome = executor.execute(URL, None, None).await;

    assert_eq!(outcome.status_code, 503);
    assert!(outcome.error_message.is_empty());
}

#[tokio::test]
async fn test_transport_failure_becomes_sentinel_outcome() {
    let transport = StubTransport::failing("Request failed: Connection refused").shared();
    let executor = ProbeExecutor::new(transport);

    let outcome = executor.execute(URL, None, None).await;

    assert_eq!(outcome.status_code, SENTINEL_STATUS);
    assert_eq!(outcome.elapsed_seconds, 0.0);
    assert_eq!(outcome.error_message, "Request failed: Connection refused");
    assert!(outcome.is_failure());
}

#[tokio::test]
async fn test_blank_failure_text_is_replaced() {
    let transport = StubTransport::failing("   ").shared();
    let executor = ProbeExecutor::new(transport);

    let outcome = executor.execute(URL, None, None).await;

    assert_eq!(outcome.status_code, SENTINEL_STATUS);
    assert!(!outcome.error_message.trim().is_empty());
}

#[tokio::test]
async fn test_certificate_applied_when_path_and_password_given() {
    let transport = StubTransport::responding(200, Duration::from_millis(10)).shared();
    let executor = ProbeExecutor::new(transport.clone()).with_timeout(Duration::from_secs(7));

    executor
        .execute(URL, Some("/etc/certs/client.p12"), Some("s3cret"))
        .await;

    let request = &transport.requests()[0];
    let bundle = request
        .client_certificate
        .as_ref()
        .expect("certificate should be attached");
    assert_eq!(bundle.path, PathBuf::from("/etc/certs/client.p12"));
    assert_eq!(bundle.password, "s3cret");
    assert_eq!(request.timeout, Duration::from_secs(7));
}

#[tokio::test]
async fn test_incomplete_certificate_pair_is_skipped() {
    let cases: Vec<(Option<&str>, Option<&str>)> = vec![
        (Some("/etc/certs/client.p12"), Some("")),
        (Some("/etc/certs/client.p12"), None),
        (Some(""), Some("s3cret")),
        (None, Some("s3cret")),
        (Some(""), Some("")),
        (None, None),
    ];

    for (path, password) in cases {
        let transport = StubTransport::responding(200, Duration::from_millis(10)).shared();
        let executor = ProbeExecutor::new(transport.clone());

        let outcome = executor.execute(URL, path, password).await;

        assert_eq!(outcome.status_code, 200, "plain request for {:?}/{:?}", path, password);
        assert!(
            transport.requests()[0].client_certificate.is_none(),
            "no certificate expected for {:?}/{:?}",
            path,
            password
        );
    }
}

#[test]
fn test_build_request_uses_default_timeout() {
    let transport = StubTransport::responding(200, Duration::ZERO).shared();
    let executor = ProbeExecutor::new(transport);

    let request = executor.build_request(URL, None, None);

    assert_eq!(request.url, URL);
    assert_eq!(request.timeout, Duration::from_secs(30));
    assert!(request.client_certificate.is_none());
}
