//! HTTP transport seam for the probe executor
//!
//! The executor only needs "GET this URL, tell me status and total time". The
//! trait keeps the isahc client swappable so tests can stub slow, failing or
//! certificate-inspecting transports.

use crate::config::CertificateBundle;
use crate::core::probe::types::PluginError;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "isahc-transport")]
use isahc::config::{ClientCertificate, Configurable};
#[cfg(feature = "isahc-transport")]
use isahc::{AsyncReadResponseExt, HttpClient, Request, ResponseExt};
#[cfg(feature = "isahc-transport")]
use std::time::Instant;

/// One GET request as the transport sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub url: String,
    /// Present only when both path and password were supplied
    pub client_certificate: Option<CertificateBundle>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportResponse {
    pub status_code: u16,
    pub total_time: Duration,
}

#[async_trait::async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Execute the GET request
    /// Returns Err with a human readable description on any transport failure
    async fn get(&self, request: ProbeRequest) -> Result<TransportResponse, String>;
}

/// Production transport built on isahc (libcurl)
#[cfg(feature = "isahc-transport")]
pub struct IsahcTransport {
    client: HttpClient,
}

#[cfg(feature = "isahc-transport")]
impl IsahcTransport {
    pub fn new() -> Result<Self, PluginError> {
        let client = HttpClient::builder()
            .metrics(true)
            .build()
            .map_err(|e| PluginError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "isahc-transport")]
#[async_trait::async_trait]
impl ProbeTransport for IsahcTransport {
    async fn get(&self, request: ProbeRequest) -> Result<TransportResponse, String> {
        let start = Instant::now();

        let mut builder = Request::get(&request.url).timeout(request.timeout);
        if let Some(bundle) = &request.client_certificate {
            builder = builder.ssl_client_certificate(ClientCertificate::p12_file(
                bundle.path.clone(),
                Some(bundle.password.clone()),
            ));
        }
        let http_request = builder
            .body(())
            .map_err(|e| format!("Request creation failed: {}", e))?;

        let mut response = self
            .client
            .send_async(http_request)
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        let status_code = response.status().as_u16();

        // Drain the body so the total time covers the full transfer
        let _ = response.text().await.unwrap_or_default();

        let total_time = response
            .metrics()
            .map(|metrics| metrics.total_time())
            .filter(|total| !total.is_zero())
            .unwrap_or_else(|| start.elapsed());

        Ok(TransportResponse {
            status_code,
            total_time,
        })
    }
}

/// Stand-in when no HTTP client is compiled in; every probe reports a failure
#[cfg(not(feature = "isahc-transport"))]
#[derive(Default)]
pub struct UnavailableTransport;

#[cfg(not(feature = "isahc-transport"))]
#[async_trait::async_trait]
impl ProbeTransport for UnavailableTransport {
    async fn get(&self, _request: ProbeRequest) -> Result<TransportResponse, String> {
        Err("HTTP transport unavailable: built without the isahc-transport feature".to_string())
    }
}

pub fn default_transport() -> Result<Arc<dyn ProbeTransport>, PluginError> {
    #[cfg(feature = "isahc-transport")]
    let transport: Arc<dyn ProbeTransport> = Arc::new(IsahcTransport::new()?);
    #[cfg(not(feature = "isahc-transport"))]
    let transport: Arc<dyn ProbeTransport> = Arc::new(UnavailableTransport);

    Ok(transport)
}
